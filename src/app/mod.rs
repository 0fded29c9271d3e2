//! Application boundary.
//!
//! The uplink core (connectivity, transports, telemetry loop) touches the
//! platform only through the **port traits** in [`ports`], so the whole
//! core runs and is tested on the host.

pub mod ports;
