//! Periodic sample → encode → publish loop.
//!
//! Wakeups are scheduled on absolute deadlines (`previous + interval`), so
//! the time spent sampling and publishing does not push the cadence.
//! A failed or skipped tick never stops the loop.

use core::time::Duration;
use std::sync::Arc;
use std::time::Instant;

use chrono::FixedOffset;
use futures_lite::future;
use log::{info, warn};

use crate::adapters::device_id::DeviceIdString;
use crate::app::ports::{LocationSensor, WallClock};
use crate::codec::TelemetrySample;
use crate::envelope::TelemetryEnvelope;
use crate::error::{PublishError, SensorError};
use crate::transport::Transport;

/// Fixed-rate deadline generator.
#[derive(Debug, Clone, Copy)]
pub struct Cadence {
    next_wake: Instant,
    interval: Duration,
}

impl Cadence {
    pub fn starting_at(start: Instant, interval: Duration) -> Self {
        Self {
            next_wake: start,
            interval,
        }
    }

    /// Move to, and return, the next deadline.
    pub fn advance(&mut self) -> Instant {
        self.next_wake += self.interval;
        self.next_wake
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// What happened on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Published,
    /// Sensor read failed; nothing was sent.
    SensorFailed(SensorError),
    /// Sample was built but the transport dropped it.
    Dropped(PublishError),
}

pub struct TelemetryLoop<S, C, X> {
    device_id: DeviceIdString,
    sensor: S,
    clock: C,
    transport: Arc<X>,
    offset: FixedOffset,
}

impl<S, C, X> TelemetryLoop<S, C, X>
where
    S: LocationSensor,
    C: WallClock,
    X: Transport,
{
    pub fn new(
        device_id: DeviceIdString,
        sensor: S,
        clock: C,
        transport: Arc<X>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            device_id,
            sensor,
            clock,
            transport,
            offset,
        }
    }

    /// Read location, battery and wall-clock time.
    pub fn sample(&mut self) -> Result<TelemetrySample, SensorError> {
        let (latitude, longitude) = self.sensor.read_location()?;
        let battery_percent = self.sensor.read_battery()?;
        Ok(TelemetrySample {
            latitude,
            longitude,
            battery_percent,
            timestamp_secs: self.clock.now_secs(),
        })
    }

    /// One sample/publish cycle.
    pub fn tick(&mut self) -> TickOutcome {
        let sample = match self.sample() {
            Ok(s) => s,
            Err(e) => {
                warn!("TELEM | sample skipped: {}", e);
                return TickOutcome::SensorFailed(e);
            }
        };

        info!(
            "TELEM | lat={:.6} lon={:.6} bat={}% ts={}",
            sample.latitude, sample.longitude, sample.battery_percent, sample.timestamp_secs
        );
        if !self.clock.is_synced() {
            warn!("TELEM | wall clock not synced, timestamp is unreliable");
        }

        let envelope = TelemetryEnvelope::new(&self.device_id, &sample, self.offset);
        match self.transport.publish(&envelope) {
            Ok(()) => TickOutcome::Published,
            Err(e) => {
                warn!("TELEM | {} dropped sample: {}", self.transport.kind(), e);
                TickOutcome::Dropped(e)
            }
        }
    }

    /// Tick forever at `interval`. Never returns.
    pub fn run(mut self, interval: Duration) {
        info!(
            "TELEM | {} loop started, every {}s",
            self.transport.kind(),
            interval.as_secs()
        );
        let mut cadence = Cadence::starting_at(Instant::now(), interval);
        future::block_on(async {
            loop {
                self.tick();
                async_io_mini::Timer::at(cadence.advance()).await;
            }
        });
    }
}
