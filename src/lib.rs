//! GPS tracker telemetry uplink.
//!
//! Samples location and battery on a fixed cadence, packs them into a
//! 5-byte record, wraps it in a JSON envelope and publishes it over either
//! a persistent MQTT session or one HTTP POST per sample. All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod codec;
pub mod config;
pub mod connectivity;
pub mod envelope;
pub mod error;
pub mod gate;
pub mod ingest;
pub mod telemetry;
pub mod transport;

mod esp_link_shims;
