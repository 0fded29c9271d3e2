//! Five-byte telemetry payload codec.
//!
//! Wire format (big-endian, 40 bits total):
//! ```text
//! ┌──────────────┬──────────────┬─────────┐
//! │ lat_u16 (2B) │ lon_u16 (2B) │ bat (1B)│
//! └──────────────┴──────────────┴─────────┘
//! ```
//!
//! WGS84 latitude `[-90, +90]` and longitude `[-180, +180]` are scaled
//! linearly onto `[0, 65535]`:
//!
//! ```text
//! lat_u16 = round((latitude  +  90) / 180 * 65535)
//! lon_u16 = round((longitude + 180) / 360 * 65535)
//! ```
//!
//! Decoding is the algebraic inverse, so a round trip is exact up to the
//! quantization step: [`LAT_STEP_DEG`] for latitude and [`LON_STEP_DEG`] for
//! longitude. Battery percentage survives unchanged.
//!
//! On the wire the record travels as 10 uppercase hex digits. This is the
//! only layout the ingestion service understands. There is no version field,
//! so an older integral/fractional-byte payload of the same length is not
//! detected: it decodes as this layout and yields wrong coordinates.

use crate::error::CodecError;

/// Encoded record size in bytes.
pub const RECORD_LEN: usize = 5;

/// Length of the hex text form.
pub const HEX_LEN: usize = RECORD_LEN * 2;

/// Latitude quantization step in degrees (180 / 65535).
pub const LAT_STEP_DEG: f64 = 180.0 / 65535.0;

/// Longitude quantization step in degrees (360 / 65535).
pub const LON_STEP_DEG: f64 = 360.0 / 65535.0;

const U16_SCALE: f64 = 65535.0;

/// Hex text form of an [`EncodedRecord`].
pub type HexPayload = heapless::String<HEX_LEN>;

/// One location + battery reading, stamped with epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    pub latitude: f32,
    pub longitude: f32,
    pub battery_percent: i16,
    pub timestamp_secs: i64,
}

/// The decoded content of a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodedRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub battery_percent: u8,
}

/// Exactly five bytes: `lat_be(2) | lon_be(2) | battery(1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedRecord([u8; RECORD_LEN]);

impl EncodedRecord {
    pub const fn from_bytes(bytes: [u8; RECORD_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; RECORD_LEN] {
        &self.0
    }

    pub fn lat_u16(&self) -> u16 {
        u16::from_be_bytes([self.0[0], self.0[1]])
    }

    pub fn lon_u16(&self) -> u16 {
        u16::from_be_bytes([self.0[2], self.0[3]])
    }

    pub fn battery(&self) -> u8 {
        self.0[4]
    }

    /// Render as 10 uppercase, zero-padded hex digits.
    pub fn to_hex(&self) -> HexPayload {
        const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
        let mut out = HexPayload::new();
        for b in self.0 {
            // Capacity is exactly HEX_LEN, so these pushes cannot fail.
            let _ = out.push(DIGITS[(b >> 4) as usize] as char);
            let _ = out.push(DIGITS[(b & 0x0F) as usize] as char);
        }
        out
    }
}

/// Scale `value` from `[-offset, span - offset]` onto `[0, 65535]`.
fn scale_to_u16(value: f64, offset: f64, span: f64) -> u16 {
    let scaled = ((value + offset) / span * U16_SCALE).round();
    scaled.clamp(0.0, U16_SCALE) as u16
}

/// Encode a sample into its five-byte record. Total and deterministic:
/// out-of-range inputs clamp instead of wrapping.
pub fn encode(sample: &TelemetrySample) -> EncodedRecord {
    let lat = scale_to_u16(f64::from(sample.latitude), 90.0, 180.0).to_be_bytes();
    let lon = scale_to_u16(f64::from(sample.longitude), 180.0, 360.0).to_be_bytes();
    let battery = sample.battery_percent.clamp(0, 255) as u8;
    EncodedRecord([lat[0], lat[1], lon[0], lon[1], battery])
}

/// Exact inverse of [`encode`] up to quantization.
pub fn decode(record: &EncodedRecord) -> DecodedRecord {
    DecodedRecord {
        latitude: f64::from(record.lat_u16()) / U16_SCALE * 180.0 - 90.0,
        longitude: f64::from(record.lon_u16()) / U16_SCALE * 360.0 - 180.0,
        battery_percent: record.battery(),
    }
}

fn hex_nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'A'..=b'F' => Some(c - b'A' + 10),
        b'a'..=b'f' => Some(c - b'a' + 10),
        _ => None,
    }
}

/// Parse the 10-digit hex text form. Anything else is
/// [`CodecError::MalformedPayload`].
pub fn parse_hex(text: &str) -> Result<EncodedRecord, CodecError> {
    let raw = text.as_bytes();
    if raw.len() != HEX_LEN {
        return Err(CodecError::MalformedPayload);
    }
    let mut bytes = [0u8; RECORD_LEN];
    for (i, pair) in raw.chunks_exact(2).enumerate() {
        let hi = hex_nibble(pair[0]).ok_or(CodecError::MalformedPayload)?;
        let lo = hex_nibble(pair[1]).ok_or(CodecError::MalformedPayload)?;
        bytes[i] = (hi << 4) | lo;
    }
    Ok(EncodedRecord(bytes))
}

/// Parse and decode in one step (what the ingestion side runs).
pub fn decode_hex(text: &str) -> Result<DecodedRecord, CodecError> {
    parse_hex(text).map(|r| decode(&r))
}
