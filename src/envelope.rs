//! JSON telemetry envelope.
//!
//! ```json
//! {"id":"ESP32_334455","payload":"9333C77732","date":"2025-11-06","time":"14:03:27"}
//! ```
//!
//! `date` and `time` are the sample's local wall-clock representation.
//! The device carries no TZ database, so "local" is the epoch timestamp
//! shifted by the configured fixed UTC offset (0 unless provisioned).

use core::fmt::Write;

use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::adapters::device_id::DeviceIdString;
use crate::codec::{self, HexPayload, TelemetrySample};
use crate::error::PublishError;

pub type DateString = heapless::String<10>;
pub type TimeString = heapless::String<8>;

/// One wire envelope. Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryEnvelope {
    pub id: DeviceIdString,
    pub payload: HexPayload,
    pub date: DateString,
    pub time: TimeString,
}

impl TelemetryEnvelope {
    /// Encode `sample` and stamp it with its local date and time.
    pub fn new(id: &DeviceIdString, sample: &TelemetrySample, offset: FixedOffset) -> Self {
        let (date, time) = local_date_time(sample.timestamp_secs, offset);
        Self {
            id: id.clone(),
            payload: codec::encode(sample).to_hex(),
            date,
            time,
        }
    }

    /// Compact JSON, as sent on the wire.
    pub fn to_json(&self) -> Result<Vec<u8>, PublishError> {
        serde_json::to_vec(self).map_err(|_| PublishError::Encode)
    }
}

/// Build a fixed offset from seconds east of UTC, falling back to UTC for
/// values outside ±24h.
pub fn utc_offset(secs: i32) -> FixedOffset {
    FixedOffset::east_opt(secs).unwrap_or_else(|| Utc.fix())
}

/// Split an epoch timestamp into `YYYY-MM-DD` and `HH:MM:SS`.
pub fn local_date_time(timestamp_secs: i64, offset: FixedOffset) -> (DateString, TimeString) {
    let local = DateTime::from_timestamp(timestamp_secs, 0)
        .unwrap_or_default()
        .with_timezone(&offset);

    let mut date = DateString::new();
    let _ = write!(date, "{:04}-{:02}-{:02}", local.year(), local.month(), local.day());
    let mut time = TimeString::new();
    let _ = write!(time, "{:02}:{:02}:{:02}", local.hour(), local.minute(), local.second());
    (date, time)
}
