//! Persistent (MQTT) uplink scenarios.

use std::net::Ipv4Addr;

use tctracker::connectivity::{LinkState, NetEvent};
use tctracker::error::{PublishError, SensorError};
use tctracker::ingest;
use tctracker::telemetry::TickOutcome;
use tctracker::transport::Transport;
use tctracker::transport::session::SessionState;

use crate::mock_net::{ScriptedSensor, mqtt_uplink};

const IP: NetEvent = NetEvent::GotAddress {
    ip: Ipv4Addr::new(10, 0, 0, 7),
};

#[test]
fn boot_to_first_publish() {
    let (up, broker) = mqtt_uplink();
    up.manager.start().unwrap();
    assert_eq!(up.transport.session_state(), SessionState::Initialized);

    up.manager.handle(NetEvent::RadioStarted);
    assert!(!up.gate.is_released());
    up.manager.handle(IP);
    assert!(up.gate.is_released());
    assert!(up.sync.0.is_running());

    let mut telemetry = up.telemetry(ScriptedSensor::steady(13.5, 100.5, 50));
    assert_eq!(telemetry.tick(), TickOutcome::Published);

    let sent = broker.published();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "tc-bn/telemetry/ESP32_334455");
    assert_eq!(
        String::from_utf8(sent[0].1.clone()).unwrap(),
        r#"{"id":"ESP32_334455","payload":"9333C77732","date":"2025-11-06","time":"14:03:27"}"#
    );
}

#[test]
fn published_envelope_round_trips_through_ingest() {
    let (up, broker) = mqtt_uplink();
    up.manager.start().unwrap();
    up.manager.handle(NetEvent::RadioStarted);
    up.manager.handle(IP);

    let mut telemetry = up.telemetry(ScriptedSensor::steady(13.62, 100.91, 77));
    telemetry.tick();

    let record = ingest::process_message(&broker.published()[0].1).unwrap();
    assert_eq!(record.device_id, "ESP32_334455");
    assert_eq!(record.battery, 77);
    assert!((record.latitude - 13.62).abs() < 0.002);
    assert!((record.longitude - 100.91).abs() < 0.003);
}

#[test]
fn link_loss_drops_samples_until_session_returns() {
    let (up, broker) = mqtt_uplink();
    up.manager.start().unwrap();
    up.manager.handle(NetEvent::RadioStarted);
    up.manager.handle(IP);
    let mut telemetry = up.telemetry(ScriptedSensor::steady(13.5, 100.5, 50));
    assert_eq!(telemetry.tick(), TickOutcome::Published);

    // Access point goes away.
    up.manager.handle(NetEvent::Disconnected { reason: 8 });
    assert_eq!(up.manager.link_state(), LinkState::Connecting);
    assert_eq!(up.transport.session_state(), SessionState::Initialized);
    assert_eq!(telemetry.tick(), TickOutcome::Dropped(PublishError::NotReady));

    // Link back, but the broker has not re-acknowledged the session yet.
    up.manager.handle(IP);
    assert_eq!(telemetry.tick(), TickOutcome::Dropped(PublishError::NotReady));

    // Client reconnects on its own.
    broker.session().connected();
    assert!(up.transport.is_ready());
    assert_eq!(telemetry.tick(), TickOutcome::Published);
    assert_eq!(broker.published().len(), 2);
}

#[test]
fn broker_drop_without_link_loss() {
    let (up, broker) = mqtt_uplink();
    up.manager.start().unwrap();
    up.manager.handle(NetEvent::RadioStarted);
    up.manager.handle(IP);
    let mut telemetry = up.telemetry(ScriptedSensor::steady(13.5, 100.5, 50));

    broker.session().disconnected();
    assert_eq!(up.manager.link_state(), LinkState::Connected);
    assert_eq!(telemetry.tick(), TickOutcome::Dropped(PublishError::NotReady));
    broker.session().connected();
    assert_eq!(telemetry.tick(), TickOutcome::Published);
}

#[test]
fn sensor_failure_sends_nothing_and_loop_continues() {
    let (up, broker) = mqtt_uplink();
    up.manager.start().unwrap();
    up.manager.handle(NetEvent::RadioStarted);
    up.manager.handle(IP);

    let mut telemetry = up.telemetry(ScriptedSensor::new(vec![
        Err(SensorError::LocationUnavailable),
        Ok((13.5, 100.5, 50)),
    ]));
    assert_eq!(
        telemetry.tick(),
        TickOutcome::SensorFailed(SensorError::LocationUnavailable)
    );
    assert!(broker.published().is_empty());
    assert_eq!(telemetry.tick(), TickOutcome::Published);
}
