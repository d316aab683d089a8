//! Data structures for sensor readings and device configuration.

use serde::{Deserialize, Serialize};

/// One raw sample from the environmental sensor.
///
/// Produced once per successful acquisition and discarded after the
/// derived telemetry message is built. Gas resistance is only
/// trustworthy when `heat_stable` is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    /// Temperature in degrees Celsius
    pub temperature: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Barometric pressure in hPa
    pub pressure: f64,
    /// Gas sensor resistance in ohms
    pub gas_resistance: f64,
    /// Whether the gas heater has settled enough to trust the resistance
    pub heat_stable: bool,
}

/// Oversampling rate for one measurement channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Oversampling {
    X1,
    X2,
    X4,
    X8,
    X16,
}

/// IIR filter size applied to temperature and pressure readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterSize {
    Size0,
    Size1,
    Size3,
    Size7,
    Size15,
    Size31,
    Size63,
    Size127,
}

/// Gas heater profile: target temperature and heat-up duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaterProfile {
    /// Heater plate target temperature in degrees Celsius
    pub temperature_celsius: u16,
    /// Heat-up duration in milliseconds before the gas measurement
    pub duration_ms: u16,
}

/// Full device configuration applied at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorSettings {
    pub humidity_oversampling: Oversampling,
    pub pressure_oversampling: Oversampling,
    pub temperature_oversampling: Oversampling,
    pub filter: FilterSize,
    pub heater: HeaterProfile,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            humidity_oversampling: Oversampling::X2,
            pressure_oversampling: Oversampling::X4,
            temperature_oversampling: Oversampling::X8,
            filter: FilterSize::Size3,
            heater: HeaterProfile {
                temperature_celsius: 320,
                duration_ms: 150,
            },
        }
    }
}
