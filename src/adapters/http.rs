//! Request clients behind the connectionless publisher.
//!
//! Every POST opens a fresh connection and closes it when done.

#[cfg(target_os = "espidf")]
pub use device::EspHttpBackend;
#[cfg(not(target_os = "espidf"))]
pub use sim::SimEndpoint;

#[cfg(target_os = "espidf")]
mod device {
    use esp_idf_svc::http::Method;
    use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
    use esp_idf_svc::sys::{self, EspError};

    use crate::app::ports::{HttpBackend, HttpResponse};
    use crate::error::PublishError;

    fn transport(e: EspError) -> PublishError {
        PublishError::Transport(e.code())
    }

    #[derive(Debug, Default)]
    pub struct EspHttpBackend;

    impl HttpBackend for EspHttpBackend {
        fn post_json(&self, url: &str, body: &[u8]) -> Result<HttpResponse, PublishError> {
            let mut conn = EspHttpConnection::new(&Configuration {
                crt_bundle_attach: Some(sys::esp_crt_bundle_attach),
                ..Default::default()
            })
            .map_err(transport)?;

            let len = body.len().to_string();
            let headers = [("Content-Type", "application/json"), ("Content-Length", len.as_str())];
            conn.initiate_request(Method::Post, url, &headers)
                .map_err(transport)?;

            let mut sent = 0;
            while sent < body.len() {
                sent += conn.write(&body[sent..]).map_err(transport)?;
            }

            conn.initiate_response().map_err(transport)?;
            let content_length = conn
                .header("Content-Length")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            Ok(HttpResponse {
                status: conn.status(),
                content_length,
            })
        }
    }
}

#[cfg(not(target_os = "espidf"))]
mod sim {
    use std::sync::Mutex;

    use log::info;

    use crate::app::ports::{HttpBackend, HttpResponse};
    use crate::error::PublishError;
    use crate::transport::POISONED;

    /// Answers every POST with a fixed status and records the bodies.
    #[derive(Debug)]
    pub struct SimEndpoint {
        status: u16,
        bodies: Mutex<Vec<Vec<u8>>>,
    }

    impl SimEndpoint {
        pub fn answering(status: u16) -> Self {
            Self {
                status,
                bodies: Mutex::new(Vec::new()),
            }
        }

        pub fn bodies(&self) -> Vec<Vec<u8>> {
            self.bodies.lock().map(|b| b.clone()).unwrap_or_default()
        }
    }

    impl HttpBackend for SimEndpoint {
        fn post_json(&self, url: &str, body: &[u8]) -> Result<HttpResponse, PublishError> {
            info!("HTTP(sim): POST {} ({} bytes)", url, body.len());
            self.bodies
                .lock()
                .map_err(|_| PublishError::Transport(POISONED))?
                .push(body.to_vec());
            Ok(HttpResponse {
                status: self.status,
                content_length: body.len() as u64,
            })
        }
    }
}
