//! Shared link state and association retry counter.
//!
//! Written only by the network event context, read by the telemetry task
//! and the transports. Both are plain atomics so a reader always sees the
//! latest transition without taking a lock.

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use core::time::Duration;

/// Radio link lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkState {
    Uninitialized = 0,
    Initialized = 1,
    Connecting = 2,
    Connected = 3,
}

impl LinkState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Initialized,
            2 => Self::Connecting,
            3 => Self::Connected,
            _ => Self::Uninitialized,
        }
    }
}

/// Atomic cell holding the current [`LinkState`].
#[derive(Debug)]
pub struct LinkCell(AtomicU8);

impl Default for LinkCell {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkCell {
    pub const fn new() -> Self {
        Self(AtomicU8::new(LinkState::Uninitialized as u8))
    }

    pub fn get(&self) -> LinkState {
        LinkState::from_u8(self.0.load(Ordering::Acquire))
    }

    pub fn is_connected(&self) -> bool {
        self.get() == LinkState::Connected
    }

    /// Only the connectivity manager drives transitions.
    pub(crate) fn set(&self, state: LinkState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Consecutive association failures since the last successful address
/// acquisition.
#[derive(Debug, Default)]
pub struct RetryCounter(AtomicU32);

impl RetryCounter {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }

    /// Record one more failure and return the new count.
    pub(crate) fn increment(&self) -> u32 {
        self.0.fetch_add(1, Ordering::AcqRel).saturating_add(1)
    }

    pub(crate) fn reset(&self) {
        self.0.store(0, Ordering::Release);
    }
}

/// Seconds added per failed attempt.
pub const RETRY_STEP_SECS: u64 = 2;

/// Delay before the next association attempt: `attempts * 2` seconds.
///
/// Grows linearly and without a cap.
pub fn retry_delay(attempts: u32) -> Duration {
    Duration::from_secs(u64::from(attempts) * RETRY_STEP_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_delay_is_linear() {
        let delays: Vec<u64> = (0..4).map(|n| retry_delay(n).as_secs()).collect();
        assert_eq!(delays, [0, 2, 4, 6]);
        assert_eq!(retry_delay(30), Duration::from_secs(60));
    }

    #[test]
    fn retry_delay_does_not_overflow() {
        assert_eq!(retry_delay(u32::MAX).as_secs(), u64::from(u32::MAX) * 2);
    }

    #[test]
    fn link_cell_round_trips_states() {
        let cell = LinkCell::new();
        assert_eq!(cell.get(), LinkState::Uninitialized);
        for s in [
            LinkState::Initialized,
            LinkState::Connecting,
            LinkState::Connected,
        ] {
            cell.set(s);
            assert_eq!(cell.get(), s);
        }
        assert!(cell.is_connected());
    }

    #[test]
    fn counter_increments_and_resets() {
        let c = RetryCounter::new();
        assert_eq!(c.increment(), 1);
        assert_eq!(c.increment(), 2);
        assert_eq!(c.get(), 2);
        c.reset();
        assert_eq!(c.get(), 0);
    }
}
