//! One-shot establishment gate.
//!
//! Bridges the network event context, which learns that the uplink is
//! usable, to the synchronous boot path, which must not start sampling
//! before then.
//!
//! ```text
//!  WiFi / MQTT event ──release()──▶ ┌──────────────┐
//!                                   │  Signal<()>  │──▶ wait(timeout) ──▶ TelemetryLoop
//!  async-io-mini Timer ──expiry───▶ └──────────────┘          │
//!                                                            └─ Err(Timeout) ──▶ restart
//! ```
//!
//! `release()` never blocks and only the first call signals; later calls
//! (e.g. MQTT reconnects) are ignored.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use futures_lite::future;
use log::{error, info};

use crate::app::ports::RestartPort;
use crate::error::GateError;

/// Startup deadline for the first establishment signal.
pub const ESTABLISH_TIMEOUT: Duration = Duration::from_secs(300);

pub struct EstablishmentGate {
    released: AtomicBool,
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for EstablishmentGate {
    fn default() -> Self {
        Self::new()
    }
}

impl EstablishmentGate {
    pub const fn new() -> Self {
        Self {
            released: AtomicBool::new(false),
            signal: Signal::new(),
        }
    }

    /// Release the gate. Returns `true` only for the call that released it.
    pub fn release(&self) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            return false;
        }
        info!("Gate: network established");
        self.signal.signal(());
        true
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Block the calling thread until released or `timeout` elapses.
    pub fn wait(&self, timeout: Duration) -> Result<(), GateError> {
        if self.is_released() {
            return Ok(());
        }
        future::block_on(future::or(
            async {
                self.signal.wait().await;
                Ok::<(), GateError>(())
            },
            async {
                async_io_mini::Timer::after(timeout).await;
                Err(GateError::Timeout)
            },
        ))
    }
}

/// Wait for establishment; on timeout invoke `restart` exactly once.
///
/// On the device `restart` does not return; simulation and test
/// implementations do, in which case the timeout is returned to the caller.
pub fn await_establishment(
    gate: &EstablishmentGate,
    timeout: Duration,
    restart: &mut impl RestartPort,
) -> Result<(), GateError> {
    match gate.wait(timeout) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Gate: network timeout after {}s, restarting", timeout.as_secs());
            restart.restart();
            Err(e)
        }
    }
}
