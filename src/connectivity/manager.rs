//! Link bring-up, association retry and disconnect recovery.
//!
//! ```text
//!  start()            RadioStarted            GotAddress
//! Uninitialized ──▶ Initialized ──────────▶ Connecting ──────────▶ Connected
//!                                  ▲   │ Disconnected                │
//!                                  │   └─ retries+1, re-arm ─┐       │
//!                                  │                         │       │
//!                                  └──── re-arm ◀────────────┘◀──────┘ Disconnected
//!                                                             (suspend transport)
//! ```
//!
//! Every handler runs on the network event context and only flips
//! atomics, arms a one-shot timer, or kicks off non-blocking background
//! work. The association attempt itself happens when the timer fires.

use core::net::Ipv4Addr;
use std::sync::Arc;

use log::{error, info, warn};

use super::link::{LinkCell, LinkState, RetryCounter, retry_delay};
use crate::app::ports::{RadioPort, RetryTimer, TimeSyncPort};
use crate::error::LinkError;
use crate::transport::Transport;

/// Events delivered by the radio and IP stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetEvent {
    /// The station interface finished starting.
    RadioStarted,
    /// Association failed, or an established association was lost.
    Disconnected { reason: u16 },
    /// DHCP handed out an address.
    GotAddress { ip: Ipv4Addr },
}

pub struct ConnectivityManager<R, T, S, X> {
    link: Arc<LinkCell>,
    retries: RetryCounter,
    radio: R,
    timer: T,
    time_sync: S,
    transport: Arc<X>,
}

impl<R, T, S, X> ConnectivityManager<R, T, S, X>
where
    R: RadioPort,
    T: RetryTimer,
    S: TimeSyncPort,
    X: Transport,
{
    /// `link` must be the same cell the transport reads.
    pub fn new(link: Arc<LinkCell>, radio: R, timer: T, time_sync: S, transport: Arc<X>) -> Self {
        Self {
            link,
            retries: RetryCounter::new(),
            radio,
            timer,
            time_sync,
            transport,
        }
    }

    pub fn link_state(&self) -> LinkState {
        self.link.get()
    }

    pub fn retry_count(&self) -> u32 {
        self.retries.get()
    }

    /// Bring the radio up. Legal once; afterwards [`LinkError::InvalidState`].
    pub fn start(&self) -> Result<(), LinkError> {
        let state = self.link.get();
        info!("WiFi: start requested (state={:?})", state);
        if state != LinkState::Uninitialized {
            return Err(LinkError::InvalidState);
        }

        self.radio.init()?;
        self.link.set(LinkState::Initialized);

        if let Err(e) = self.transport.prepare() {
            warn!("{}: prepare failed: {}", self.transport.kind(), e);
        }

        self.radio.start()
    }

    /// Dispatch one network event. Never blocks.
    pub fn handle(&self, event: NetEvent) {
        match event {
            NetEvent::RadioStarted => self.on_radio_started(),
            NetEvent::Disconnected { reason } => self.on_disconnected(reason),
            NetEvent::GotAddress { ip } => self.on_got_address(ip),
        }
    }

    fn on_radio_started(&self) {
        self.arm_retry();
        self.link.set(LinkState::Connecting);
    }

    fn on_disconnected(&self, reason: u16) {
        let was = self.link.get();
        self.link.set(LinkState::Connecting);
        if was == LinkState::Connected {
            warn!("WiFi: link lost, suspending {}", self.transport.kind());
            self.transport.suspend();
        }

        let attempts = self.retries.increment();
        info!(
            "WiFi: association failed, reason {}, retry {}",
            reason, attempts
        );
        self.arm_retry();
    }

    fn on_got_address(&self, ip: Ipv4Addr) {
        info!("WiFi: got ip {}", ip);
        self.retries.reset();
        self.link.set(LinkState::Connected);

        if let Err(e) = self.time_sync.start() {
            warn!("SNTP: start failed: {}", e);
        }
        if let Err(e) = self.transport.establish() {
            error!("{}: establish failed: {}", self.transport.kind(), e);
        }
    }

    fn arm_retry(&self) {
        let delay = retry_delay(self.retries.get());
        if let Err(e) = self.timer.arm(delay) {
            error!("WiFi: failed to arm connect timer ({}s): {}", delay.as_secs(), e);
        }
    }
}
