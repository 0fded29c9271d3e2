//! Port traits — the hexagonal boundary between the uplink core and the
//! outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ConnectivityManager / TelemetryLoop
//! ```
//!
//! Driven adapters (radio, timers, SNTP, sensors, MQTT/HTTP clients)
//! implement these traits. The core consumes them via generics, so it
//! never touches ESP-IDF directly and runs unchanged on the host.
//!
//! Ports used from the network event context take `&self` and must not
//! block: they are invoked from ESP-IDF event-loop callbacks.

use core::time::Duration;

use crate::error::{LinkError, PublishError, SensorError};
use crate::transport::session::SessionEvents;

// ───────────────────────────────────────────────────────────────
// Radio port (network event context)
// ───────────────────────────────────────────────────────────────

/// Station-mode radio driver.
pub trait RadioPort: Send + Sync {
    /// Initialise netif + WiFi driver and apply STA configuration.
    fn init(&self) -> Result<(), LinkError>;

    /// Start the radio. Completion arrives later as a radio-start event.
    fn start(&self) -> Result<(), LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Association retry timer (network event context)
// ───────────────────────────────────────────────────────────────

/// One-shot timer that triggers an association attempt when it fires.
///
/// Re-arming replaces any pending expiry.
pub trait RetryTimer: Send + Sync {
    fn arm(&self, delay: Duration) -> Result<(), LinkError>;
}

// ───────────────────────────────────────────────────────────────
// Time sync port (network event context)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget background time synchronisation.
pub trait TimeSyncPort: Send + Sync {
    /// Start syncing. Calling it again while running is a no-op.
    fn start(&self) -> Result<(), LinkError>;

    /// Stop syncing and release the client.
    fn stop(&self);
}

// ───────────────────────────────────────────────────────────────
// Wall clock (telemetry context)
// ───────────────────────────────────────────────────────────────

/// 2020-01-01T00:00:00Z. Anything earlier means SNTP has not synced yet.
pub const EPOCH_2020: i64 = 1_577_836_800;

pub trait WallClock {
    /// Seconds since the Unix epoch.
    fn now_secs(&self) -> i64;

    fn is_synced(&self) -> bool {
        self.now_secs() >= EPOCH_2020
    }
}

// ───────────────────────────────────────────────────────────────
// Sensor port (telemetry context)
// ───────────────────────────────────────────────────────────────

/// GPS + battery gauge.
pub trait LocationSensor {
    /// `(latitude, longitude)` in degrees.
    fn read_location(&mut self) -> Result<(f32, f32), SensorError>;

    /// Battery charge, 0–100 %.
    fn read_battery(&mut self) -> Result<i16, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Restart port (boot path)
// ───────────────────────────────────────────────────────────────

pub trait RestartPort {
    /// Reset the chip. Device implementations do not return.
    fn restart(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Transport channels
// ───────────────────────────────────────────────────────────────

/// Broker client behind the persistent publisher.
pub trait MqttBackend: Send {
    /// Create and start the client. Session transitions are reported
    /// through `events` from the client's own task.
    fn open(&mut self, url: &str, events: SessionEvents) -> Result<(), LinkError>;

    /// Whether [`open`](Self::open) has already succeeded. An opened
    /// client reconnects by itself.
    fn is_open(&self) -> bool;

    /// Queue one QoS 0, non-retained message.
    fn enqueue(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError>;
}

/// Status line of a completed HTTP exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_length: u64,
}

/// Connectionless request client: every call is a fresh connection.
pub trait HttpBackend: Send + Sync {
    fn post_json(&self, url: &str, body: &[u8]) -> Result<HttpResponse, PublishError>;
}
