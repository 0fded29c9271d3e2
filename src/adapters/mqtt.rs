//! Broker client adapters behind the persistent publisher.
//!
//! - **`target_os = "espidf"`**: [`EspMqttBackend`] wraps `EspMqttClient`.
//!   Its callback runs on the client's task and maps connect/disconnect
//!   onto [`SessionEvents`]. Once created the client reconnects by itself.
//! - **all other targets**: [`SimBroker`] acknowledges the session on open
//!   and records every message.

use crate::transport::session::SessionEvents;

#[cfg(target_os = "espidf")]
pub use device::EspMqttBackend;
#[cfg(not(target_os = "espidf"))]
pub use sim::SimBroker;

#[cfg(target_os = "espidf")]
mod device {
    use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};
    use log::{debug, info, warn};

    use super::SessionEvents;
    use crate::adapters::device_id::DeviceIdString;
    use crate::app::ports::MqttBackend;
    use crate::error::{LinkError, PublishError};

    pub struct EspMqttBackend {
        client_id: DeviceIdString,
        client: Option<EspMqttClient<'static>>,
    }

    impl EspMqttBackend {
        pub fn new(client_id: &DeviceIdString) -> Self {
            Self {
                client_id: client_id.clone(),
                client: None,
            }
        }
    }

    impl MqttBackend for EspMqttBackend {
        fn open(&mut self, url: &str, events: SessionEvents) -> Result<(), LinkError> {
            let conf = MqttClientConfiguration {
                client_id: Some(self.client_id.as_str()),
                ..Default::default()
            };
            let client = EspMqttClient::new_cb(url, &conf, move |event| match event.payload() {
                EventPayload::Connected(_) => events.connected(),
                EventPayload::Disconnected => events.disconnected(),
                EventPayload::Published(id) => debug!("MQTT: published msg_id={}", id),
                EventPayload::Error(e) => warn!("MQTT: client error {:?}", e),
                _ => {}
            })
            .map_err(|e| LinkError::Driver(e.code()))?;
            info!("MQTT: client started as {}", self.client_id);
            self.client = Some(client);
            Ok(())
        }

        fn is_open(&self) -> bool {
            self.client.is_some()
        }

        fn enqueue(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
            let client = self.client.as_mut().ok_or(PublishError::NotReady)?;
            let msg_id = client
                .enqueue(topic, QoS::AtMostOnce, false, payload)
                .map_err(|e| PublishError::Transport(e.code()))?;
            debug!("MQTT: queued msg_id={}", msg_id);
            Ok(())
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod sim {
    use log::info;

    use super::SessionEvents;
    use crate::app::ports::MqttBackend;
    use crate::error::{LinkError, PublishError};

    #[derive(Default)]
    pub struct SimBroker {
        events: Option<SessionEvents>,
        published: Vec<(String, Vec<u8>)>,
    }

    impl SimBroker {
        pub fn new() -> Self {
            Self::default()
        }

        /// Broker-side handle to drive session transitions in tests.
        pub fn session(&self) -> Option<SessionEvents> {
            self.events.clone()
        }

        pub fn published(&self) -> &[(String, Vec<u8>)] {
            &self.published
        }
    }

    impl MqttBackend for SimBroker {
        fn open(&mut self, url: &str, events: SessionEvents) -> Result<(), LinkError> {
            info!("MQTT(sim): connected to {}", url);
            events.connected();
            self.events = Some(events);
            Ok(())
        }

        fn is_open(&self) -> bool {
            self.events.is_some()
        }

        fn enqueue(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
            self.published.push((topic.to_owned(), payload.to_vec()));
            Ok(())
        }
    }
}
