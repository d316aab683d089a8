//! Simulated sensor driver for development and testing.
//!
//! Produces a deterministic slow drift around comfortable indoor
//! conditions so the full pipeline can run on machines without the
//! hardware attached.

use crate::error::Result;
use crate::sensor::data::{RawReading, SensorSettings};
use crate::sensor::traits::SensorDriver;
use async_trait::async_trait;
use tracing::debug;

/// Number of initial reads reported before the simulated gas heater
/// settles, mirroring the real device's warm-up behavior.
const WARMUP_READS: u64 = 3;

/// A deterministic stand-in for the BME680.
pub struct SimulatedSensor {
    reads: u64,
}

impl SimulatedSensor {
    pub fn new() -> Self {
        Self { reads: 0 }
    }
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SensorDriver for SimulatedSensor {
    fn name(&self) -> &str {
        "BME680 (simulated)"
    }

    fn configure(&mut self, settings: &SensorSettings) -> Result<()> {
        debug!("simulated sensor configured: {:?}", settings);
        Ok(())
    }

    async fn read_once(&mut self) -> Result<RawReading> {
        let tick = self.reads as f64;
        self.reads += 1;

        // Slow sinusoidal drift around a comfortable room.
        let temperature = 21.5 + 1.5 * (tick / 40.0).sin();
        let humidity = 46.0 + 6.0 * (tick / 55.0).sin();
        let pressure = 1012.0 + 3.0 * (tick / 90.0).sin();
        let gas_resistance = 58_000.0 + 12_000.0 * (tick / 25.0).sin();

        Ok(RawReading {
            temperature,
            humidity,
            pressure,
            gas_resistance,
            heat_stable: self.reads > WARMUP_READS,
        })
    }
}
