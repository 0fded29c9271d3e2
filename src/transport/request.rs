//! Connectionless publisher: one fresh HTTP POST per sample.

use std::sync::Arc;

use log::{info, warn};

use super::Transport;
use crate::app::ports::HttpBackend;
use crate::config::{TransportKind, UrlString};
use crate::connectivity::LinkCell;
use crate::envelope::TelemetryEnvelope;
use crate::error::{LinkError, PublishError};
use crate::gate::EstablishmentGate;

pub struct RequestPublisher<B> {
    url: UrlString,
    link: Arc<LinkCell>,
    gate: Arc<EstablishmentGate>,
    client: B,
}

impl<B: HttpBackend> RequestPublisher<B> {
    pub fn new(
        url: UrlString,
        link: Arc<LinkCell>,
        gate: Arc<EstablishmentGate>,
        client: B,
    ) -> Self {
        Self {
            url,
            link,
            gate,
            client,
        }
    }
}

impl<B: HttpBackend> Transport for RequestPublisher<B> {
    fn kind(&self) -> TransportKind {
        TransportKind::Connectionless
    }

    fn establish(&self) -> Result<(), LinkError> {
        if !self.link.is_connected() {
            return Err(LinkError::InvalidState);
        }
        self.gate.release();
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.link.is_connected()
    }

    fn publish(&self, envelope: &TelemetryEnvelope) -> Result<(), PublishError> {
        if !self.is_ready() {
            return Err(PublishError::NotReady);
        }
        let json = envelope.to_json()?;
        info!(
            "HTTP: sending to {} {}",
            self.url,
            String::from_utf8_lossy(&json)
        );
        let response = self.client.post_json(&self.url, &json)?;
        info!(
            "HTTP POST Status = {}, content_length = {}",
            response.status, response.content_length
        );
        if !(200..300).contains(&response.status) {
            warn!("HTTP: endpoint rejected sample (status {})", response.status);
            return Err(PublishError::Rejected(response.status));
        }
        Ok(())
    }
}
