//! Tracker firmware entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  StationRadio   ConnectTimer   SntpSync   SystemClock          │
//! │  EspMqttBackend / EspHttpBackend   SimulatedGps   ChipRestart  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ConnectivityManager ──▶ Transport ──▶ EstablishmentGate       │
//! │                              ▲                                 │
//! │                        TelemetryLoop                           │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Boot: identity → config → transport → radio start → wait for the
//! establishment gate (restart after the deadline) → sample forever.

use std::sync::Arc;

use anyhow::Result;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::timer::EspTaskTimerService;
use esp_idf_svc::wifi::EspWifi;
use log::info;

use tctracker::adapters::device_id::{self, DeviceIdString, MacAddress};
use tctracker::adapters::http::EspHttpBackend;
use tctracker::adapters::mqtt::EspMqttBackend;
use tctracker::adapters::restart::ChipRestart;
use tctracker::adapters::sensors::SimulatedGps;
use tctracker::adapters::time::{SntpSync, SystemClock};
use tctracker::adapters::wifi::{ConnectTimer, StationRadio, subscribe_net_events};
use tctracker::config::{TransportKind, UplinkConfig};
use tctracker::connectivity::{ConnectivityManager, LinkCell};
use tctracker::envelope::utc_offset;
use tctracker::error::Error;
use tctracker::gate::{EstablishmentGate, await_establishment};
use tctracker::telemetry::TelemetryLoop;
use tctracker::transport::{PersistentPublisher, RequestPublisher, Transport};

/// Everything the uplink needs besides the transport itself.
struct Platform {
    id: DeviceIdString,
    mac: MacAddress,
    config: UplinkConfig,
    link: Arc<LinkCell>,
    gate: Arc<EstablishmentGate>,
    radio: StationRadio,
    timer: ConnectTimer,
    sntp: SntpSync,
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    info!("tctracker v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    // ── 2. Identity (fatal on failure) ────────────────────────
    let mac = device_id::read_mac().map_err(Error::from)?;
    let id = device_id::device_id(&mac);
    info!("Device ID: {}", id);

    // ── 3. Configuration ──────────────────────────────────────
    let config = UplinkConfig::from_env().map_err(Error::from)?;
    info!(
        "Config: {} -> {}, every {}s",
        config.transport,
        config.active_url(),
        config.interval_secs
    );

    // ── 4. Platform adapters ──────────────────────────────────
    let wifi = EspWifi::new(peripherals.modem, sysloop, Some(nvs))?;
    let timer_service = EspTaskTimerService::new()?;
    let platform = Platform {
        radio: StationRadio::new(wifi, &config),
        timer: ConnectTimer::new(&timer_service)?,
        sntp: SntpSync::new(config.sntp_server.clone()),
        link: Arc::new(LinkCell::new()),
        gate: Arc::new(EstablishmentGate::new()),
        id,
        mac,
        config,
    };

    // ── 5. Transport selection ────────────────────────────────
    let kind = platform.config.transport;
    match kind {
        TransportKind::Persistent => {
            let publisher = PersistentPublisher::new(
                platform.config.broker_url.clone(),
                &platform.id,
                platform.link.clone(),
                platform.gate.clone(),
                EspMqttBackend::new(&platform.id),
            );
            run(platform, publisher)
        }
        TransportKind::Connectionless => {
            let publisher = RequestPublisher::new(
                platform.config.endpoint_url.clone(),
                platform.link.clone(),
                platform.gate.clone(),
                EspHttpBackend,
            );
            run(platform, publisher)
        }
    }
}

fn run<X: Transport + 'static>(platform: Platform, transport: X) -> Result<()> {
    let Platform {
        id,
        mac,
        config,
        link,
        gate,
        radio,
        timer,
        sntp,
    } = platform;

    let transport = Arc::new(transport);
    let manager = Arc::new(ConnectivityManager::new(
        link,
        radio,
        timer,
        sntp,
        transport.clone(),
    ));

    // Handlers must be in place before the radio reports it started.
    let events = manager.clone();
    let _subscription = subscribe_net_events(move |event| events.handle(event)).map_err(Error::from)?;
    manager.start().map_err(Error::from)?;

    // ── 6. Establishment gate ─────────────────────────────────
    await_establishment(&gate, config.establish_timeout(), &mut ChipRestart).map_err(Error::from)?;
    info!("{} uplink established", transport.kind());

    // ── 7. Telemetry loop ─────────────────────────────────────
    TelemetryLoop::new(
        id,
        SimulatedGps::new(&mac),
        SystemClock,
        transport,
        utc_offset(config.utc_offset_secs),
    )
    .run(config.interval());

    Ok(())
}
