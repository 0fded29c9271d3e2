//! Uplink configuration.
//!
//! Resolved once at build time from `TC_*` environment variables, falling
//! back to the defaults below. Immutable after boot. `TC_TRANSPORT` takes
//! `mqtt`/`persistent` or `http`/`connectionless`.
//!
//! | Variable                  | Field              | Default                     |
//! |---------------------------|--------------------|-----------------------------|
//! | `TC_TRANSPORT`            | `transport`        | `mqtt`                      |
//! | `TC_MQTT_BROKER_URL`      | `broker_url`       | `mqtt://broker.hivemq.com`  |
//! | `TC_HTTP_SERVER_URL`      | `endpoint_url`     | `http://httpbin.org/post`   |
//! | `TC_PAYLOAD_GPS_INTERVAL` | `interval_secs`    | `10`                        |
//! | `TC_SNTP_SERVER`          | `sntp_server`      | `pool.ntp.org`              |
//! | `TC_WIFI_STA_SSID`        | `wifi_ssid`        | `myssid`                    |
//! | `TC_WIFI_STA_PASSWORD`    | `wifi_password`    | `mypassword`                |
//! | `TC_UTC_OFFSET_SECS`      | `utc_offset_secs`  | `0`                         |

use core::fmt;
use core::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::adapters::utils::is_printable_ascii;
use crate::error::ConfigError;
use crate::gate::ESTABLISH_TIMEOUT;

pub type UrlString = heapless::String<128>;
pub type HostString = heapless::String<64>;
pub type SsidString = heapless::String<32>;
pub type PasswordString = heapless::String<64>;

/// Which publish channel the firmware was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportKind {
    /// Long-lived MQTT session.
    Persistent,
    /// One HTTP POST per sample.
    Connectionless,
}

impl TransportKind {
    /// Parse the `TC_TRANSPORT` value, case-insensitively.
    ///
    /// `mqtt`/`persistent` and `http`/`connectionless` are accepted; any
    /// other spelling is an error rather than a silent fallback.
    pub fn from_env_value(value: &str) -> Result<Self, ConfigError> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("mqtt") || value.eq_ignore_ascii_case("persistent") {
            Ok(Self::Persistent)
        } else if value.eq_ignore_ascii_case("http") || value.eq_ignore_ascii_case("connectionless")
        {
            Ok(Self::Connectionless)
        } else {
            Err(ConfigError::InvalidTransport)
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persistent => write!(f, "MQTT"),
            Self::Connectionless => write!(f, "HTTP"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UplinkConfig {
    pub transport: TransportKind,
    pub broker_url: UrlString,
    pub endpoint_url: UrlString,
    /// Seconds between samples.
    pub interval_secs: u32,
    /// Deadline for the first establishment signal before restarting.
    pub establish_timeout_secs: u32,
    pub sntp_server: HostString,
    pub wifi_ssid: SsidString,
    pub wifi_password: PasswordString,
    /// Seconds east of UTC used for the envelope's local date/time.
    pub utc_offset_secs: i32,
}

const DEFAULT_BROKER_URL: &str = "mqtt://broker.hivemq.com";
const DEFAULT_ENDPOINT_URL: &str = "http://httpbin.org/post";
const DEFAULT_INTERVAL_SECS: u32 = 10;
const DEFAULT_SNTP_SERVER: &str = "pool.ntp.org";

impl UplinkConfig {
    /// Resolve the build-time `TC_*` variables and validate the result.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::from_values(
            option_env!("TC_TRANSPORT"),
            option_env!("TC_MQTT_BROKER_URL"),
            option_env!("TC_HTTP_SERVER_URL"),
            option_env!("TC_PAYLOAD_GPS_INTERVAL"),
            option_env!("TC_SNTP_SERVER"),
            option_env!("TC_WIFI_STA_SSID"),
            option_env!("TC_WIFI_STA_PASSWORD"),
            option_env!("TC_UTC_OFFSET_SECS"),
        )?;
        config.validate()?;
        Ok(config)
    }

    /// Build from raw variable values; `None` or unparsable numbers take the
    /// default. An unknown transport or a string longer than its field is an
    /// error, never truncated.
    #[allow(clippy::too_many_arguments)]
    pub fn from_values(
        transport: Option<&str>,
        broker_url: Option<&str>,
        endpoint_url: Option<&str>,
        interval_secs: Option<&str>,
        sntp_server: Option<&str>,
        wifi_ssid: Option<&str>,
        wifi_password: Option<&str>,
        utc_offset_secs: Option<&str>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            transport: transport
                .map_or(Ok(TransportKind::Persistent), TransportKind::from_env_value)?,
            broker_url: bounded(broker_url.unwrap_or(DEFAULT_BROKER_URL), ConfigError::InvalidUrl)?,
            endpoint_url: bounded(
                endpoint_url.unwrap_or(DEFAULT_ENDPOINT_URL),
                ConfigError::InvalidUrl,
            )?,
            interval_secs: interval_secs
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(DEFAULT_INTERVAL_SECS),
            establish_timeout_secs: ESTABLISH_TIMEOUT.as_secs() as u32,
            sntp_server: bounded(
                sntp_server.unwrap_or(DEFAULT_SNTP_SERVER),
                ConfigError::InvalidSntpServer,
            )?,
            wifi_ssid: bounded(wifi_ssid.unwrap_or("myssid"), ConfigError::InvalidSsid)?,
            wifi_password: bounded(
                wifi_password.unwrap_or("mypassword"),
                ConfigError::InvalidPassword,
            )?,
            utc_offset_secs: utc_offset_secs
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(0),
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.interval_secs))
    }

    pub fn establish_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.establish_timeout_secs))
    }

    /// URL of whichever channel is selected.
    pub fn active_url(&self) -> &str {
        match self.transport {
            TransportKind::Persistent => &self.broker_url,
            TransportKind::Connectionless => &self.endpoint_url,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_ssid(&self.wifi_ssid)?;
        validate_password(&self.wifi_password)?;
        if self.wifi_password.is_empty() {
            info!("WiFi: connecting to open network '{}'", self.wifi_ssid);
        }
        validate_url(self.transport, self.active_url())?;
        if self.interval_secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        Ok(())
    }
}

fn validate_ssid(ssid: &str) -> Result<(), ConfigError> {
    if ssid.is_empty() || ssid.len() > 32 {
        return Err(ConfigError::InvalidSsid);
    }
    if !is_printable_ascii(ssid) {
        return Err(ConfigError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConfigError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConfigError::InvalidPassword);
    }
    Ok(())
}

/// Copy `value` into a fixed-capacity field, failing with `err` if it does not fit.
fn bounded<const N: usize>(
    value: &str,
    err: ConfigError,
) -> Result<heapless::String<N>, ConfigError> {
    heapless::String::try_from(value).map_err(|()| err)
}

fn validate_url(kind: TransportKind, url: &str) -> Result<(), ConfigError> {
    let schemes: &[&str] = match kind {
        TransportKind::Persistent => &["mqtt://", "mqtts://", "ws://", "wss://"],
        TransportKind::Connectionless => &["http://", "https://"],
    };
    match schemes.iter().find(|s| url.starts_with(**s)) {
        Some(scheme) if url.len() > scheme.len() && is_printable_ascii(url) => Ok(()),
        _ => Err(ConfigError::InvalidUrl),
    }
}
