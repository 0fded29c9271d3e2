//! Radio bring-up, association backoff and the startup deadline.

use std::net::Ipv4Addr;
use std::time::Duration;

use tctracker::connectivity::{LinkState, NetEvent};
use tctracker::error::{GateError, LinkError};
use tctracker::gate::await_establishment;

use crate::mock_net::{CountingRestart, http_uplink, mqtt_uplink};

#[test]
fn start_is_only_legal_once() {
    let (up, _) = mqtt_uplink();
    up.manager.start().unwrap();
    assert_eq!(up.manager.start(), Err(LinkError::InvalidState));
}

#[test]
fn association_backoff_sequence() {
    let (up, _) = http_uplink(200);
    up.manager.start().unwrap();
    up.manager.handle(NetEvent::RadioStarted);
    for _ in 0..3 {
        up.manager.handle(NetEvent::Disconnected { reason: 201 });
    }
    assert_eq!(up.armed_secs(), [0, 2, 4, 6]);
    assert_eq!(up.manager.link_state(), LinkState::Connecting);

    up.manager.handle(NetEvent::GotAddress {
        ip: Ipv4Addr::new(10, 0, 0, 2),
    });
    assert_eq!(up.manager.retry_count(), 0);
}

#[test]
fn no_establishment_restarts_exactly_once() {
    let (up, _) = mqtt_uplink();
    up.manager.start().unwrap();
    up.manager.handle(NetEvent::RadioStarted);

    let mut restart = CountingRestart::default();
    let res = await_establishment(&up.gate, Duration::from_millis(50), &mut restart);
    assert_eq!(res, Err(GateError::Timeout));
    assert_eq!(restart.0, 1);
}

#[test]
fn establishment_from_event_thread_unblocks_boot() {
    let (up, _) = mqtt_uplink();
    up.manager.start().unwrap();

    let manager = up.manager.clone();
    let events = std::thread::spawn(move || {
        manager.handle(NetEvent::RadioStarted);
        std::thread::sleep(Duration::from_millis(20));
        manager.handle(NetEvent::Disconnected { reason: 201 });
        manager.handle(NetEvent::GotAddress {
            ip: Ipv4Addr::new(10, 0, 0, 3),
        });
    });

    let mut restart = CountingRestart::default();
    assert_eq!(
        await_establishment(&up.gate, Duration::from_secs(5), &mut restart),
        Ok(())
    );
    assert_eq!(restart.0, 0);
    events.join().unwrap();
}

#[test]
fn time_sync_started_once_per_address() {
    let (up, _) = http_uplink(200);
    up.manager.start().unwrap();
    up.manager.handle(NetEvent::RadioStarted);
    up.manager.handle(NetEvent::GotAddress {
        ip: Ipv4Addr::new(10, 0, 0, 4),
    });
    up.manager.handle(NetEvent::Disconnected { reason: 8 });
    up.manager.handle(NetEvent::GotAddress {
        ip: Ipv4Addr::new(10, 0, 0, 4),
    });
    assert!(up.sync.0.is_running());
    assert_eq!(up.sync.0.starts(), 1);
}
