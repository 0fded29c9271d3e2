//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the uplink end to end
//! (connectivity manager → transport → telemetry loop) against the host
//! simulation adapters. No real radio required.

mod mock_net;
mod mqtt_uplink_tests;
mod http_uplink_tests;
mod startup_tests;
