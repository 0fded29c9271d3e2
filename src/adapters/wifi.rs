//! WiFi station adapters.
//!
//! Implements [`RadioPort`] and [`RetryTimer`] and routes the raw
//! WiFi/IP event stream into [`NetEvent`]s for the connectivity manager.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `EspWifi` for driver setup, a task-timer
//!   that calls `esp_wifi_connect()` on expiry, and default event-loop
//!   handlers registered through `esp-idf-sys`.
//! - **all other targets**: simulation stubs for host-side tests.

#[cfg(target_os = "espidf")]
pub use device::{ConnectTimer, NetEventSubscription, StationRadio, subscribe_net_events};
#[cfg(not(target_os = "espidf"))]
pub use sim::{SimConnectTimer, SimRadio};

#[cfg(target_os = "espidf")]
mod device {
    use core::ffi::c_void;
    use core::net::Ipv4Addr;
    use core::time::Duration;
    use std::sync::Mutex;

    use esp_idf_svc::sys::{self, EspError, esp};
    use esp_idf_svc::timer::{EspTaskTimerService, EspTimer};
    use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};
    use log::{info, warn};

    use crate::app::ports::{RadioPort, RetryTimer};
    use crate::config::UplinkConfig;
    use crate::connectivity::NetEvent;
    use crate::error::LinkError;
    use crate::transport::POISONED;

    fn driver(e: EspError) -> LinkError {
        LinkError::Driver(e.code())
    }

    // ── Radio ─────────────────────────────────────────────────

    pub struct StationRadio {
        wifi: Mutex<EspWifi<'static>>,
        ssid: heapless::String<32>,
        password: heapless::String<64>,
    }

    impl StationRadio {
        pub fn new(wifi: EspWifi<'static>, config: &UplinkConfig) -> Self {
            Self {
                wifi: Mutex::new(wifi),
                ssid: config.wifi_ssid.clone(),
                password: config.wifi_password.clone(),
            }
        }
    }

    impl RadioPort for StationRadio {
        fn init(&self) -> Result<(), LinkError> {
            let conf = ClientConfiguration {
                ssid: self.ssid.as_str().try_into().map_err(|_| LinkError::InvalidState)?,
                password: self
                    .password
                    .as_str()
                    .try_into()
                    .map_err(|_| LinkError::InvalidState)?,
                auth_method: if self.password.is_empty() {
                    AuthMethod::None
                } else {
                    AuthMethod::WPA2Personal
                },
                ..Default::default()
            };
            self.wifi
                .lock()
                .map_err(|_| LinkError::Driver(POISONED))?
                .set_configuration(&Configuration::Client(conf))
                .map_err(driver)?;
            info!("WiFi: station configured for '{}'", self.ssid);
            Ok(())
        }

        fn start(&self) -> Result<(), LinkError> {
            self.wifi
                .lock()
                .map_err(|_| LinkError::Driver(POISONED))?
                .start()
                .map_err(driver)
        }
    }

    // ── Association timer ─────────────────────────────────────

    pub struct ConnectTimer {
        timer: Mutex<EspTimer<'static>>,
    }

    impl ConnectTimer {
        pub fn new(service: &EspTaskTimerService) -> Result<Self, EspError> {
            let timer = service.timer(|| {
                let err = unsafe { sys::esp_wifi_connect() };
                if err != sys::ESP_OK as i32 {
                    warn!("WiFi: esp_wifi_connect failed (0x{:x})", err);
                }
            })?;
            Ok(Self {
                timer: Mutex::new(timer),
            })
        }
    }

    impl RetryTimer for ConnectTimer {
        fn arm(&self, delay: Duration) -> Result<(), LinkError> {
            let timer = self.timer.lock().map_err(|_| LinkError::Driver(POISONED))?;
            timer.cancel().map_err(driver)?;
            timer.after(delay).map_err(driver)
        }
    }

    // ── Event routing ─────────────────────────────────────────

    type Dispatch = Box<dyn Fn(NetEvent) + Send + Sync>;

    /// Keeps the WiFi/IP handlers registered; unregisters on drop.
    pub struct NetEventSubscription {
        wifi: sys::esp_event_handler_instance_t,
        ip: sys::esp_event_handler_instance_t,
        _dispatch: Box<Dispatch>,
    }

    // SAFETY: the instance handles are opaque tokens only passed back to
    // the event loop for unregistration.
    unsafe impl Send for NetEventSubscription {}

    impl Drop for NetEventSubscription {
        fn drop(&mut self) {
            unsafe {
                sys::esp_event_handler_instance_unregister(
                    sys::WIFI_EVENT,
                    sys::ESP_EVENT_ANY_ID,
                    self.wifi,
                );
                sys::esp_event_handler_instance_unregister(
                    sys::IP_EVENT,
                    sys::ip_event_t_IP_EVENT_STA_GOT_IP as i32,
                    self.ip,
                );
            }
        }
    }

    /// Register `on_event` on the default event loop for station start,
    /// disconnect and got-ip events. Handlers run on the event task.
    pub fn subscribe_net_events<F>(on_event: F) -> Result<NetEventSubscription, LinkError>
    where
        F: Fn(NetEvent) + Send + Sync + 'static,
    {
        let dispatch: Box<Dispatch> = Box::new(Box::new(on_event));
        let arg = &*dispatch as *const Dispatch as *mut c_void;

        let mut wifi: sys::esp_event_handler_instance_t = core::ptr::null_mut();
        let mut ip: sys::esp_event_handler_instance_t = core::ptr::null_mut();
        esp!(unsafe {
            sys::esp_event_handler_instance_register(
                sys::WIFI_EVENT,
                sys::ESP_EVENT_ANY_ID,
                Some(on_net_event),
                arg,
                &mut wifi,
            )
        })
        .map_err(driver)?;
        esp!(unsafe {
            sys::esp_event_handler_instance_register(
                sys::IP_EVENT,
                sys::ip_event_t_IP_EVENT_STA_GOT_IP as i32,
                Some(on_net_event),
                arg,
                &mut ip,
            )
        })
        .map_err(driver)?;

        Ok(NetEventSubscription {
            wifi,
            ip,
            _dispatch: dispatch,
        })
    }

    unsafe extern "C" fn on_net_event(
        arg: *mut c_void,
        base: sys::esp_event_base_t,
        id: i32,
        data: *mut c_void,
    ) {
        // SAFETY: `arg` points at the `Dispatch` owned by a live
        // `NetEventSubscription`; `data` matches the event id per ESP-IDF.
        let dispatch = unsafe { &*(arg as *const Dispatch) };
        if let Some(event) = unsafe { translate(base, id, data) } {
            dispatch(event);
        }
    }

    unsafe fn translate(base: sys::esp_event_base_t, id: i32, data: *mut c_void) -> Option<NetEvent> {
        let id = id as u32;
        if base == unsafe { sys::WIFI_EVENT } {
            match id {
                sys::wifi_event_t_WIFI_EVENT_STA_START => Some(NetEvent::RadioStarted),
                sys::wifi_event_t_WIFI_EVENT_STA_DISCONNECTED => {
                    let info = unsafe { &*(data as *const sys::wifi_event_sta_disconnected_t) };
                    Some(NetEvent::Disconnected {
                        reason: u16::from(info.reason),
                    })
                }
                _ => None,
            }
        } else if base == unsafe { sys::IP_EVENT } && id == sys::ip_event_t_IP_EVENT_STA_GOT_IP {
            let got = unsafe { &*(data as *const sys::ip_event_got_ip_t) };
            Some(NetEvent::GotAddress {
                ip: Ipv4Addr::from(got.ip_info.ip.addr.to_le_bytes()),
            })
        } else {
            None
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::time::Duration;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use log::info;

    use crate::app::ports::{RadioPort, RetryTimer};
    use crate::error::LinkError;
    use crate::transport::POISONED;

    /// Host radio: records calls, never fails.
    #[derive(Debug, Default)]
    pub struct SimRadio {
        inits: AtomicU32,
        starts: AtomicU32,
    }

    impl SimRadio {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn starts(&self) -> u32 {
            self.starts.load(Ordering::Relaxed)
        }
    }

    impl RadioPort for SimRadio {
        fn init(&self) -> Result<(), LinkError> {
            self.inits.fetch_add(1, Ordering::Relaxed);
            info!("WiFi(sim): driver initialised");
            Ok(())
        }

        fn start(&self) -> Result<(), LinkError> {
            self.starts.fetch_add(1, Ordering::Relaxed);
            info!("WiFi(sim): radio started");
            Ok(())
        }
    }

    /// Host association timer: remembers every armed delay.
    #[derive(Debug, Default)]
    pub struct SimConnectTimer {
        armed: Mutex<Vec<Duration>>,
    }

    impl SimConnectTimer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn armed(&self) -> Vec<Duration> {
            self.armed.lock().map(|a| a.clone()).unwrap_or_default()
        }
    }

    impl RetryTimer for SimConnectTimer {
        fn arm(&self, delay: Duration) -> Result<(), LinkError> {
            info!("WiFi(sim): connect attempt in {}s", delay.as_secs());
            self.armed
                .lock()
                .map_err(|_| LinkError::Driver(POISONED))?
                .push(delay);
            Ok(())
        }
    }

}
