//! Publish channels.
//!
//! Exactly one [`Transport`] is built at boot, chosen by
//! [`TransportKind`]; the connectivity manager and the telemetry loop are
//! generic over it.
//!
//! | Strategy             | Readiness                         | Gate released on      |
//! |----------------------|-----------------------------------|-----------------------|
//! | [`PersistentPublisher`] | broker session is active       | first session ack     |
//! | [`RequestPublisher`]    | link is connected              | first address         |

pub mod persistent;
pub mod request;
pub mod session;

pub use persistent::PersistentPublisher;
pub use request::RequestPublisher;

use crate::config::TransportKind;
use crate::envelope::TelemetryEnvelope;
use crate::error::{LinkError, PublishError};

/// Status reported when a channel mutex was poisoned by a panicking holder.
pub(crate) const POISONED: i32 = -1;

pub trait Transport: Send + Sync {
    fn kind(&self) -> TransportKind;

    /// One-time setup while the radio is being initialised.
    fn prepare(&self) -> Result<(), LinkError> {
        Ok(())
    }

    /// The link obtained an address. Must not block.
    fn establish(&self) -> Result<(), LinkError>;

    /// The link was lost. Must not block.
    fn suspend(&self) {}

    /// Whether [`publish`](Self::publish) would currently be attempted.
    fn is_ready(&self) -> bool;

    /// Send one envelope. Not-ready and failed sends drop the message;
    /// there is no queue and no retry.
    fn publish(&self, envelope: &TelemetryEnvelope) -> Result<(), PublishError>;
}
