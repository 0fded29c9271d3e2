//! Device identity derived from the ESP32 factory MAC address.
//!
//! Produces a stable device ID of the form `ESP32_XXYYZZ`: the low 24 bits
//! of the 48-bit MAC (its last three bytes) in uppercase hex. The ID is:
//! - Deterministic across reboots (factory-burned eFuse MAC)
//! - The `id` field of every telemetry envelope
//! - The last level of the MQTT topic `tc-bn/telemetry/<id>`

use core::fmt::Write;

use crate::error::IdentityError;

/// Fixed-size device ID string: "ESP32_XXYYZZ" (12 chars).
pub type DeviceIdString = heapless::String<16>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Topic prefix shared by the device and the ingestion subscriber.
pub const TOPIC_PREFIX: &str = "tc-bn/telemetry/";

/// Wildcard filter the ingestion service subscribes to.
pub const TELEMETRY_TOPIC_FILTER: &str = "tc-bn/telemetry/+";

/// MQTT topic for one device.
pub type TopicString = heapless::String<64>;

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> Result<MacAddress, IdentityError> {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: `mac` is a valid 6-byte buffer for the duration of the call.
    let ret = unsafe { esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr()) };
    if ret != esp_idf_svc::sys::ESP_OK as i32 {
        return Err(IdentityError::Unavailable(ret));
    }
    Ok(mac)
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> Result<MacAddress, IdentityError> {
    Ok([0x24, 0x6F, 0x28, 0x9A, 0x3C, 0x51])
}

/// Derive the device ID from the low 24 bits of the MAC.
/// Format: `ESP32_XXYYZZ` (e.g., `ESP32_334455`).
pub fn device_id(mac: &MacAddress) -> DeviceIdString {
    let addr = mac
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
    let mut id = DeviceIdString::new();
    let _ = write!(id, "ESP32_{:06X}", addr & 0x00FF_FFFF);
    id
}

/// MQTT topic the device publishes to: `tc-bn/telemetry/<id>`.
pub fn telemetry_topic(id: &str) -> TopicString {
    let mut topic = TopicString::new();
    let _ = write!(topic, "{TOPIC_PREFIX}{id}");
    topic
}

/// Whether `topic` is matched by [`TELEMETRY_TOPIC_FILTER`]
/// (exactly one non-empty level after the prefix).
pub fn topic_matches_filter(topic: &str) -> bool {
    topic
        .strip_prefix(TOPIC_PREFIX)
        .is_some_and(|level| !level.is_empty() && !level.contains('/'))
}
