//! Wall clock and SNTP adapters.
//!
//! - **`target_os = "espidf"`**: [`SntpSync`] wraps `EspSntp`; the sync
//!   callback logs the freshly set time.
//! - **all other targets**: [`SimTimeSync`] only tracks whether it runs.
//!
//! [`SystemClock`] reads `SystemTime`, which newlib backs with the RTC on
//! the device and the OS clock on the host.

use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::DateTime;

use crate::app::ports::WallClock;

#[cfg(target_os = "espidf")]
pub use device::SntpSync;
#[cfg(not(target_os = "espidf"))]
pub use sim::SimTimeSync;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now_secs(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs() as i64)
    }
}

/// `DD-MM-YYYY HH:MM:SS.micros` for the sync notification log.
pub fn format_sync_time(since_epoch: Duration) -> String {
    DateTime::from_timestamp(since_epoch.as_secs() as i64, since_epoch.subsec_nanos())
        .unwrap_or_default()
        .format("%d-%m-%Y %H:%M:%S%.6f")
        .to_string()
}

#[cfg(target_os = "espidf")]
mod device {
    use std::sync::Mutex;

    use esp_idf_svc::sntp::{EspSntp, SntpConf};
    use log::info;

    use super::format_sync_time;
    use crate::app::ports::TimeSyncPort;
    use crate::config::HostString;
    use crate::error::LinkError;
    use crate::transport::POISONED;

    pub struct SntpSync {
        server: HostString,
        client: Mutex<Option<EspSntp<'static>>>,
    }

    impl SntpSync {
        pub fn new(server: HostString) -> Self {
            Self {
                server,
                client: Mutex::new(None),
            }
        }
    }

    impl TimeSyncPort for SntpSync {
        fn start(&self) -> Result<(), LinkError> {
            let mut client = self.client.lock().map_err(|_| LinkError::Driver(POISONED))?;
            if client.is_some() {
                return Ok(());
            }
            let mut conf = SntpConf::default();
            conf.servers[0] = self.server.as_str();
            let sntp = EspSntp::new_with_callback(&conf, |synced| {
                info!("SNTP: time synced {}", format_sync_time(synced));
            })
            .map_err(|e| LinkError::Driver(e.code()))?;
            info!("SNTP: polling {}", self.server);
            *client = Some(sntp);
            Ok(())
        }

        fn stop(&self) {
            if let Ok(mut client) = self.client.lock() {
                if client.take().is_some() {
                    info!("SNTP: stopped");
                }
            }
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod sim {
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    use log::info;

    use crate::app::ports::TimeSyncPort;
    use crate::error::LinkError;

    #[derive(Debug, Default)]
    pub struct SimTimeSync {
        running: AtomicBool,
        starts: AtomicU32,
    }

    impl SimTimeSync {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn is_running(&self) -> bool {
            self.running.load(Ordering::Acquire)
        }

        /// Number of times a client was actually started.
        pub fn starts(&self) -> u32 {
            self.starts.load(Ordering::Acquire)
        }
    }

    impl TimeSyncPort for SimTimeSync {
        fn start(&self) -> Result<(), LinkError> {
            if !self.running.swap(true, Ordering::AcqRel) {
                self.starts.fetch_add(1, Ordering::AcqRel);
                info!("SNTP(sim): started");
            }
            Ok(())
        }

        fn stop(&self) {
            if self.running.swap(false, Ordering::AcqRel) {
                info!("SNTP(sim): stopped");
            }
        }
    }
}
