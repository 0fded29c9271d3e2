//! Connectionless (HTTP) uplink scenarios.

use std::net::Ipv4Addr;

use tctracker::connectivity::NetEvent;
use tctracker::error::PublishError;
use tctracker::telemetry::TickOutcome;

use crate::mock_net::{ScriptedSensor, http_uplink};

const IP: NetEvent = NetEvent::GotAddress {
    ip: Ipv4Addr::new(10, 0, 0, 9),
};

#[test]
fn address_releases_gate_and_posts() {
    let (up, endpoint) = http_uplink(200);
    up.manager.start().unwrap();
    up.manager.handle(NetEvent::RadioStarted);
    assert!(!up.gate.is_released());
    up.manager.handle(IP);
    assert!(up.gate.is_released());

    let mut telemetry = up.telemetry(ScriptedSensor::steady(13.5, 100.5, 50));
    assert_eq!(telemetry.tick(), TickOutcome::Published);
    let bodies = endpoint.bodies();
    assert_eq!(bodies.len(), 1);
    assert!(String::from_utf8_lossy(&bodies[0]).contains(r#""payload":"9333C77732""#));
}

#[test]
fn no_link_no_request() {
    let (up, endpoint) = http_uplink(200);
    up.manager.start().unwrap();
    up.manager.handle(NetEvent::RadioStarted);
    let mut telemetry = up.telemetry(ScriptedSensor::steady(13.5, 100.5, 50));
    assert_eq!(telemetry.tick(), TickOutcome::Dropped(PublishError::NotReady));
    assert!(endpoint.bodies().is_empty());
}

#[test]
fn server_error_is_reported_and_not_retried() {
    let (up, endpoint) = http_uplink(500);
    up.manager.start().unwrap();
    up.manager.handle(NetEvent::RadioStarted);
    up.manager.handle(IP);
    let mut telemetry = up.telemetry(ScriptedSensor::steady(13.5, 100.5, 50));
    assert_eq!(
        telemetry.tick(),
        TickOutcome::Dropped(PublishError::Rejected(500))
    );
    assert_eq!(endpoint.bodies().len(), 1);
}

#[test]
fn reconnect_resumes_posting() {
    let (up, endpoint) = http_uplink(201);
    up.manager.start().unwrap();
    up.manager.handle(NetEvent::RadioStarted);
    up.manager.handle(IP);
    let mut telemetry = up.telemetry(ScriptedSensor::steady(13.5, 100.5, 50));

    up.manager.handle(NetEvent::Disconnected { reason: 200 });
    assert_eq!(telemetry.tick(), TickOutcome::Dropped(PublishError::NotReady));
    up.manager.handle(IP);
    assert_eq!(telemetry.tick(), TickOutcome::Published);
    assert_eq!(endpoint.bodies().len(), 1);
}
