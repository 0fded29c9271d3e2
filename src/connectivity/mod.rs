//! Station link management.

pub mod link;
pub mod manager;

pub use link::{LinkCell, LinkState, RetryCounter, retry_delay};
pub use manager::{ConnectivityManager, NetEvent};
