//! MQTT session state shared between the broker client task, the
//! connectivity manager and the telemetry loop.

use core::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use log::info;

use crate::gate::EstablishmentGate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Uninit = 0,
    Initialized = 1,
    SessionActive = 2,
}

impl SessionState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Initialized,
            2 => Self::SessionActive,
            _ => Self::Uninit,
        }
    }
}

#[derive(Debug)]
pub struct SessionCell(AtomicU8);

impl Default for SessionCell {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCell {
    pub const fn new() -> Self {
        Self(AtomicU8::new(SessionState::Uninit as u8))
    }

    pub fn get(&self) -> SessionState {
        SessionState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn is_active(&self) -> bool {
        self.get() == SessionState::SessionActive
    }

    /// `Uninit -> Initialized`. Returns `false` if already initialised.
    pub(crate) fn initialize(&self) -> bool {
        self.transition(SessionState::Uninit, SessionState::Initialized)
    }

    /// `Initialized -> SessionActive`.
    pub(crate) fn activate(&self) -> bool {
        self.transition(SessionState::Initialized, SessionState::SessionActive)
    }

    /// `SessionActive -> Initialized`. No effect in any other state.
    pub(crate) fn deactivate(&self) -> bool {
        self.transition(SessionState::SessionActive, SessionState::Initialized)
    }

    fn transition(&self, from: SessionState, to: SessionState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Handle given to the broker client so its callbacks can report session
/// transitions. Cheap to clone.
#[derive(Clone)]
pub struct SessionEvents {
    session: Arc<SessionCell>,
    gate: Arc<EstablishmentGate>,
}

impl SessionEvents {
    pub fn new(session: Arc<SessionCell>, gate: Arc<EstablishmentGate>) -> Self {
        Self { session, gate }
    }

    /// The broker acknowledged the session.
    pub fn connected(&self) {
        if self.session.activate() {
            info!("MQTT: session active");
        }
        if self.session.is_active() {
            self.gate.release();
        }
    }

    /// The broker session dropped; the client keeps reconnecting on its own.
    pub fn disconnected(&self) {
        if self.session.deactivate() {
            info!("MQTT: session lost");
        }
    }
}
