//! Long-lived broker session publisher.

use std::sync::{Arc, Mutex, TryLockError};

use log::{debug, info, warn};

use super::session::{SessionCell, SessionEvents, SessionState};
use super::{POISONED, Transport};
use crate::adapters::device_id::{DeviceIdString, TopicString, telemetry_topic};
use crate::app::ports::MqttBackend;
use crate::config::{TransportKind, UrlString};
use crate::connectivity::LinkCell;
use crate::envelope::TelemetryEnvelope;
use crate::error::{LinkError, PublishError};
use crate::gate::EstablishmentGate;

pub struct PersistentPublisher<B> {
    url: UrlString,
    topic: TopicString,
    link: Arc<LinkCell>,
    session: Arc<SessionCell>,
    gate: Arc<EstablishmentGate>,
    client: Mutex<B>,
}

impl<B: MqttBackend> PersistentPublisher<B> {
    pub fn new(
        url: UrlString,
        device_id: &DeviceIdString,
        link: Arc<LinkCell>,
        gate: Arc<EstablishmentGate>,
        client: B,
    ) -> Self {
        Self {
            url,
            topic: telemetry_topic(device_id),
            link,
            session: Arc::new(SessionCell::new()),
            gate,
            client: Mutex::new(client),
        }
    }

    pub fn session_state(&self) -> SessionState {
        self.session.get()
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl<B: MqttBackend> Transport for PersistentPublisher<B> {
    fn kind(&self) -> TransportKind {
        TransportKind::Persistent
    }

    fn prepare(&self) -> Result<(), LinkError> {
        if !self.session.initialize() {
            return Err(LinkError::InvalidState);
        }
        info!("MQTT: client configured for {}", self.url);
        Ok(())
    }

    fn establish(&self) -> Result<(), LinkError> {
        if !self.link.is_connected() || self.session.get() != SessionState::Initialized {
            return Err(LinkError::InvalidState);
        }
        // Runs on the network event task; never wait behind a publish.
        let mut client = match self.client.try_lock() {
            Ok(client) => client,
            Err(TryLockError::WouldBlock) => {
                debug!("MQTT: client busy publishing, reconnect is automatic");
                return Ok(());
            }
            Err(TryLockError::Poisoned(_)) => return Err(LinkError::Driver(POISONED)),
        };
        if client.is_open() {
            debug!("MQTT: client already running, reconnect is automatic");
            return Ok(());
        }
        info!("MQTT: connecting to {}", self.url);
        client.open(
            &self.url,
            SessionEvents::new(self.session.clone(), self.gate.clone()),
        )
    }

    fn suspend(&self) {
        if self.session.deactivate() {
            warn!("MQTT: link down, session suspended");
        }
    }

    fn is_ready(&self) -> bool {
        self.session.is_active()
    }

    fn publish(&self, envelope: &TelemetryEnvelope) -> Result<(), PublishError> {
        if !self.is_ready() {
            return Err(PublishError::NotReady);
        }
        let json = envelope.to_json()?;
        info!(
            "MQTT: sending to {} {}",
            self.topic,
            String::from_utf8_lossy(&json)
        );
        self.client
            .lock()
            .map_err(|_| PublishError::Transport(POISONED))?
            .enqueue(&self.topic, &json)
    }
}
