//! Consumer-side envelope decoding.
//!
//! Turns one message received on `tc-bn/telemetry/+` back into a typed
//! record. Only the scaled-uint16 payload layout is understood.

use serde_json::Value;

use crate::codec;
use crate::error::IngestError;

#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    pub device_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub battery: u8,
    pub date: String,
    pub time: String,
}

fn required<'a>(obj: &'a serde_json::Map<String, Value>, name: &'static str) -> Result<&'a str, IngestError> {
    obj.get(name)
        .and_then(Value::as_str)
        .ok_or(IngestError::MissingField(name))
}

/// Parse and decode one JSON envelope.
pub fn process_message(message: &[u8]) -> Result<TelemetryRecord, IngestError> {
    let value: Value = serde_json::from_slice(message).map_err(|_| IngestError::InvalidJson)?;
    let obj = value.as_object().ok_or(IngestError::InvalidJson)?;

    let id = required(obj, "id")?;
    let payload = required(obj, "payload")?;
    let date = required(obj, "date")?;
    let time = required(obj, "time")?;

    let payload = payload.trim().to_ascii_uppercase();
    let decoded = codec::decode_hex(&payload)?;

    Ok(TelemetryRecord {
        device_id: id.into(),
        latitude: decoded.latitude,
        longitude: decoded.longitude,
        battery: decoded.battery_percent,
        date: date.into(),
        time: time.into(),
    })
}
