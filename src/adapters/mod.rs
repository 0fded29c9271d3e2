//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                | Connects to                  |
//! |-------------|---------------------------|------------------------------|
//! | `device_id` | —                         | eFuse factory MAC            |
//! | `wifi`      | RadioPort, RetryTimer     | ESP-IDF WiFi STA, esp_timer  |
//! | `time`      | TimeSyncPort, WallClock   | SNTP client, system clock    |
//! | `mqtt`      | MqttBackend               | ESP-MQTT client              |
//! | `http`      | HttpBackend               | ESP HTTP client              |
//! | `sensors`   | LocationSensor            | Simulated GPS + battery      |
//! | `restart`   | RestartPort               | `esp_restart()`              |

pub mod device_id;
pub mod http;
pub mod mqtt;
pub mod restart;
pub mod sensors;
pub mod time;
pub(crate) mod utils;
pub mod wifi;
