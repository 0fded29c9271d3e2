//! Simulated GPS and battery gauge.
//!
//! The board has no GPS receiver fitted yet, so both the device and the
//! host build use this source. Readings are uniform random values around
//! the deployment area, seeded from the MAC so each unit produces its own
//! repeatable sequence.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::device_id::MacAddress;
use crate::app::ports::LocationSensor;
use crate::error::SensorError;

pub const LAT_RANGE: (f32, f32) = (13.40, 13.90);
pub const LON_RANGE: (f32, f32) = (100.20, 101.0);
/// Half-open, in percent.
pub const BATTERY_RANGE: (i16, i16) = (10, 100);

pub struct SimulatedGps {
    rng: SmallRng,
}

impl SimulatedGps {
    pub fn new(mac: &MacAddress) -> Self {
        let seed = mac.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b));
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl LocationSensor for SimulatedGps {
    fn read_location(&mut self) -> Result<(f32, f32), SensorError> {
        let lat = self.rng.gen_range(LAT_RANGE.0..=LAT_RANGE.1);
        let lon = self.rng.gen_range(LON_RANGE.0..=LON_RANGE.1);
        Ok((lat, lon))
    }

    fn read_battery(&mut self) -> Result<i16, SensorError> {
        Ok(self.rng.gen_range(BATTERY_RANGE.0..BATTERY_RANGE.1))
    }
}
