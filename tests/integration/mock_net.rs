//! Shared mocks and harness builders for the uplink integration tests.
//!
//! The simulation adapters are moved into the manager or the publisher, so
//! each is wrapped in a thin `Arc` handle that tests keep a clone of.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tctracker::adapters::device_id::{self, DeviceIdString};
use tctracker::adapters::http::SimEndpoint;
use tctracker::adapters::mqtt::SimBroker;
use tctracker::adapters::time::SimTimeSync;
use tctracker::adapters::wifi::{SimConnectTimer, SimRadio};
use tctracker::app::ports::{
    HttpBackend, HttpResponse, LocationSensor, MqttBackend, RestartPort, RetryTimer, TimeSyncPort,
    WallClock,
};
use tctracker::config::UrlString;
use tctracker::connectivity::{ConnectivityManager, LinkCell};
use tctracker::envelope::utc_offset;
use tctracker::error::{LinkError, PublishError, SensorError};
use tctracker::gate::EstablishmentGate;
use tctracker::telemetry::TelemetryLoop;
use tctracker::transport::session::SessionEvents;
use tctracker::transport::{PersistentPublisher, RequestPublisher, Transport};

// ── Shared handles ────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct SharedTimer(pub Arc<SimConnectTimer>);

impl RetryTimer for SharedTimer {
    fn arm(&self, delay: Duration) -> Result<(), LinkError> {
        self.0.arm(delay)
    }
}

#[derive(Clone, Default)]
pub struct SharedSync(pub Arc<SimTimeSync>);

impl TimeSyncPort for SharedSync {
    fn start(&self) -> Result<(), LinkError> {
        self.0.start()
    }
    fn stop(&self) {
        self.0.stop();
    }
}

#[derive(Clone, Default)]
pub struct SharedBroker(pub Arc<Mutex<SimBroker>>);

#[allow(dead_code)]
impl SharedBroker {
    pub fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.0.lock().unwrap().published().to_vec()
    }

    pub fn session(&self) -> SessionEvents {
        self.0.lock().unwrap().session().expect("client was never opened")
    }
}

impl MqttBackend for SharedBroker {
    fn open(&mut self, url: &str, events: SessionEvents) -> Result<(), LinkError> {
        self.0.lock().unwrap().open(url, events)
    }
    fn is_open(&self) -> bool {
        self.0.lock().unwrap().is_open()
    }
    fn enqueue(&mut self, topic: &str, payload: &[u8]) -> Result<(), PublishError> {
        self.0.lock().unwrap().enqueue(topic, payload)
    }
}

#[derive(Clone)]
pub struct SharedEndpoint(pub Arc<SimEndpoint>);

impl HttpBackend for SharedEndpoint {
    fn post_json(&self, url: &str, body: &[u8]) -> Result<HttpResponse, PublishError> {
        self.0.post_json(url, body)
    }
}

// ── Sensor / clock / restart ──────────────────────────────────

/// Replays a fixed script of readings, then repeats the last one.
pub struct ScriptedSensor {
    script: Vec<Result<(f32, f32, i16), SensorError>>,
    cursor: usize,
    current: Result<(f32, f32, i16), SensorError>,
}

#[allow(dead_code)]
impl ScriptedSensor {
    pub fn new(script: Vec<Result<(f32, f32, i16), SensorError>>) -> Self {
        Self {
            script,
            cursor: 0,
            current: Err(SensorError::LocationUnavailable),
        }
    }

    pub fn steady(lat: f32, lon: f32, battery: i16) -> Self {
        Self::new(vec![Ok((lat, lon, battery))])
    }
}

impl LocationSensor for ScriptedSensor {
    fn read_location(&mut self) -> Result<(f32, f32), SensorError> {
        let idx = self.cursor.min(self.script.len() - 1);
        self.cursor += 1;
        self.current = self.script[idx];
        self.current.map(|(lat, lon, _)| (lat, lon))
    }

    fn read_battery(&mut self) -> Result<i16, SensorError> {
        self.current.map(|(_, _, b)| b)
    }
}

/// 2025-11-06 14:03:27 UTC.
pub const NOW: i64 = 1_762_437_807;

pub struct FixedClock(pub i64);

impl WallClock for FixedClock {
    fn now_secs(&self) -> i64 {
        self.0
    }
}

#[derive(Default)]
pub struct CountingRestart(pub u32);

impl RestartPort for CountingRestart {
    fn restart(&mut self) {
        self.0 += 1;
    }
}

// ── Harness ───────────────────────────────────────────────────

pub type Manager<X> = ConnectivityManager<SimRadio, SharedTimer, SharedSync, X>;

pub struct Uplink<X> {
    pub id: DeviceIdString,
    pub gate: Arc<EstablishmentGate>,
    pub timer: SharedTimer,
    pub sync: SharedSync,
    pub transport: Arc<X>,
    pub manager: Arc<Manager<X>>,
}

#[allow(dead_code)]
impl<X: Transport> Uplink<X> {
    pub fn telemetry(&self, sensor: ScriptedSensor) -> TelemetryLoop<ScriptedSensor, FixedClock, X> {
        TelemetryLoop::new(
            self.id.clone(),
            sensor,
            FixedClock(NOW),
            self.transport.clone(),
            utc_offset(0),
        )
    }

    pub fn armed_secs(&self) -> Vec<u64> {
        self.timer.0.armed().iter().map(Duration::as_secs).collect()
    }
}

fn device() -> DeviceIdString {
    device_id::device_id(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55])
}

fn build<X: Transport>(
    link: Arc<LinkCell>,
    gate: Arc<EstablishmentGate>,
    transport: X,
) -> Uplink<X> {
    let timer = SharedTimer::default();
    let sync = SharedSync::default();
    let transport = Arc::new(transport);
    let manager = Arc::new(ConnectivityManager::new(
        link,
        SimRadio::new(),
        timer.clone(),
        sync.clone(),
        transport.clone(),
    ));
    Uplink {
        id: device(),
        gate,
        timer,
        sync,
        transport,
        manager,
    }
}

#[allow(dead_code)]
pub fn mqtt_uplink() -> (Uplink<PersistentPublisher<SharedBroker>>, SharedBroker) {
    let link = Arc::new(LinkCell::new());
    let gate = Arc::new(EstablishmentGate::new());
    let broker = SharedBroker::default();
    let publisher = PersistentPublisher::new(
        UrlString::try_from("mqtt://broker.test").unwrap(),
        &device(),
        link.clone(),
        gate.clone(),
        broker.clone(),
    );
    (build(link, gate, publisher), broker)
}

#[allow(dead_code)]
pub fn http_uplink(status: u16) -> (Uplink<RequestPublisher<SharedEndpoint>>, Arc<SimEndpoint>) {
    let link = Arc::new(LinkCell::new());
    let gate = Arc::new(EstablishmentGate::new());
    let endpoint = Arc::new(SimEndpoint::answering(status));
    let publisher = RequestPublisher::new(
        UrlString::try_from("http://ingest.test/post").unwrap(),
        link.clone(),
        gate.clone(),
        SharedEndpoint(endpoint.clone()),
    );
    (build(link, gate, publisher), endpoint)
}
