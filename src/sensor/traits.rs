//! The sensor capability boundary.
//!
//! The sampler talks to the device exclusively through [`SensorDriver`];
//! register-level I/O, calibration, and bus handling live behind this
//! trait, not in this crate's core.

use crate::error::Result;
use crate::sensor::data::{RawReading, SensorSettings};
use async_trait::async_trait;

/// A driver that can configure the sensor and produce raw readings.
///
/// Implementations own the device handle; the sampler holds the only
/// `Box<dyn SensorDriver>` in the process, so no locking is required
/// around the device itself.
#[async_trait]
pub trait SensorDriver: Send {
    /// A short human-readable name for logs and the CLI.
    fn name(&self) -> &str;

    /// Apply oversampling, filter, and gas-heater configuration.
    fn configure(&mut self, settings: &SensorSettings) -> Result<()>;

    /// Perform one measurement transaction and return the raw reading.
    ///
    /// A failed transaction returns an error for this read only; the
    /// driver must remain usable for the next one.
    async fn read_once(&mut self) -> Result<RawReading>;
}
