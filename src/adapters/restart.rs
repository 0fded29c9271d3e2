//! Chip restart.

use log::error;

use crate::app::ports::RestartPort;

#[derive(Debug, Default)]
pub struct ChipRestart;

impl RestartPort for ChipRestart {
    #[cfg(target_os = "espidf")]
    fn restart(&mut self) {
        error!("Restarting");
        unsafe { esp_idf_svc::sys::esp_restart() }
    }

    #[cfg(not(target_os = "espidf"))]
    fn restart(&mut self) {
        error!("Restart requested, exiting simulation");
        std::process::exit(1);
    }
}
