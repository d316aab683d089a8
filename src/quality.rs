//! Air-quality index computation and classification.
//!
//! Two index formulas are computed side by side: the weighted composite
//! built from normalized per-component sub-indices, and the older
//! gas*temperature/humidity ratio kept for output parity. Both are pure
//! functions of a single [`RawReading`].

use crate::error::{Result, TelemetryError};
use crate::sensor::data::RawReading;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound of every index scale.
pub const INDEX_SCALE: f64 = 500.0;

/// Scale `value` into `[0, 500]` relative to the `[lo, hi]` range.
///
/// Values below `lo` clamp to 0, values above `hi` clamp to 500.
pub fn normalize(value: f64, lo: f64, hi: f64) -> f64 {
    (INDEX_SCALE * (value - lo) / (hi - lo)).clamp(0.0, INDEX_SCALE)
}

/// VOC sub-index, piecewise over gas resistance in ohms.
pub fn voc_index(gas_resistance: f64) -> f64 {
    if gas_resistance < 10_000.0 {
        0.0
    } else if gas_resistance < 50_000.0 {
        normalize(gas_resistance, 10_000.0, 50_000.0) * (200.0 / 500.0)
    } else if gas_resistance < 100_000.0 {
        normalize(gas_resistance, 50_000.0, 100_000.0) + 200.0
    } else {
        INDEX_SCALE
    }
}

/// Temperature sub-index with a comfort plateau at 18-25 C.
pub fn temperature_index(temperature: f64) -> f64 {
    if temperature < 18.0 {
        normalize(temperature, 0.0, 18.0)
    } else if temperature > 25.0 {
        normalize(temperature, 25.0, 50.0)
    } else {
        INDEX_SCALE
    }
}

/// Humidity sub-index with a comfort plateau at 40-70 %RH.
pub fn humidity_index(humidity: f64) -> f64 {
    if humidity < 40.0 {
        normalize(humidity, 0.0, 40.0)
    } else if humidity > 70.0 {
        normalize(humidity, 70.0, 100.0)
    } else {
        INDEX_SCALE
    }
}

/// Weighted composite IAQ index: 50% VOC, 25% temperature, 25% humidity.
pub fn weighted_iaq_index(temperature: f64, humidity: f64, gas_resistance: f64) -> f64 {
    let voc = voc_index(gas_resistance);
    let temp = temperature_index(temperature);
    let hum = humidity_index(humidity);

    (0.5 * voc) + (0.25 * temp) + (0.25 * hum)
}

/// Legacy ratio IAQ index, preserved verbatim from the first pipeline.
///
/// The formula is dimensionally ad hoc but kept as a secondary field for
/// output parity. A zero humidity makes the denominator zero and is
/// rejected instead of producing an infinite index.
pub fn legacy_iaq_index(temperature: f64, humidity: f64, gas_resistance: f64) -> Result<f64> {
    if humidity == 0.0 {
        return Err(TelemetryError::domain(
            "humidity is zero, legacy IAQ ratio is undefined",
        ));
    }

    let ratio = (gas_resistance * temperature) / (humidity / 100.0);
    Ok((ratio - 75_000.0) / (4_375_000.0 - 75_000.0) * INDEX_SCALE)
}

/// Air-quality bucket derived from the legacy ratio index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AirQualityLevel {
    Bad,
    Normal,
    Good,
}

impl AirQualityLevel {
    /// Classify a legacy ratio index value.
    pub fn from_index(iaq: f64) -> Self {
        if iaq <= 200.0 {
            Self::Bad
        } else if iaq <= 400.0 {
            Self::Normal
        } else {
            Self::Good
        }
    }
}

impl fmt::Display for AirQualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bad => write!(f, "bad"),
            Self::Normal => write!(f, "normal"),
            Self::Good => write!(f, "good"),
        }
    }
}

/// Gas-resistance bucket derived from the raw resistance in ohms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GasResistanceLevel {
    Dangerous,
    Normal,
    Good,
}

impl GasResistanceLevel {
    /// Classify a raw gas resistance in ohms.
    pub fn from_resistance(gas_resistance: f64) -> Self {
        if gas_resistance <= 10_000.0 {
            Self::Dangerous
        } else if gas_resistance <= 50_000.0 {
            Self::Normal
        } else {
            Self::Good
        }
    }
}

impl fmt::Display for GasResistanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dangerous => write!(f, "dangerous"),
            Self::Normal => write!(f, "normal"),
            Self::Good => write!(f, "good"),
        }
    }
}

/// Temperature comfort bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureComfort {
    Cold,
    Good,
    Hot,
}

impl TemperatureComfort {
    /// Classify a temperature in degrees Celsius.
    pub fn from_temperature(temperature: f64) -> Self {
        if temperature < 18.0 {
            Self::Cold
        } else if temperature <= 26.0 {
            Self::Good
        } else {
            Self::Hot
        }
    }
}

impl fmt::Display for TemperatureComfort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cold => write!(f, "cold"),
            Self::Good => write!(f, "good"),
            Self::Hot => write!(f, "hot"),
        }
    }
}

/// Humidity comfort bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HumidityComfort {
    Low,
    Good,
    High,
}

impl HumidityComfort {
    /// Classify a relative humidity percentage.
    pub fn from_humidity(humidity: f64) -> Self {
        if humidity < 30.0 {
            Self::Low
        } else if humidity <= 60.0 {
            Self::Good
        } else {
            Self::High
        }
    }
}

impl fmt::Display for HumidityComfort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Good => write!(f, "good"),
            Self::High => write!(f, "high"),
        }
    }
}

/// All numeric indices derived from one reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AirQualityIndices {
    /// VOC sub-index (0-500)
    pub voc: f64,
    /// Temperature sub-index (0-500)
    pub temperature: f64,
    /// Humidity sub-index (0-500)
    pub humidity: f64,
    /// Weighted composite index (0-500)
    pub weighted: f64,
    /// Legacy ratio index (unclamped)
    pub legacy_ratio: f64,
}

/// All categorical buckets derived from one reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub air_quality: AirQualityLevel,
    pub gas_resistance: GasResistanceLevel,
    pub temperature: TemperatureComfort,
    pub humidity: HumidityComfort,
}

/// The complete derived assessment for one reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Assessment {
    pub indices: AirQualityIndices,
    pub classification: Classification,
}

/// Compute indices and classification for a reading with trustworthy
/// gas data.
///
/// Callers gate this on [`RawReading::heat_stable`]; the gas-derived
/// values are meaningless before the heater settles. Fails only when the
/// legacy ratio denominator is zero.
pub fn assess(reading: &RawReading) -> Result<Assessment> {
    let legacy_ratio =
        legacy_iaq_index(reading.temperature, reading.humidity, reading.gas_resistance)?;

    let indices = AirQualityIndices {
        voc: voc_index(reading.gas_resistance),
        temperature: temperature_index(reading.temperature),
        humidity: humidity_index(reading.humidity),
        weighted: weighted_iaq_index(reading.temperature, reading.humidity, reading.gas_resistance),
        legacy_ratio,
    };

    let classification = Classification {
        air_quality: AirQualityLevel::from_index(legacy_ratio),
        gas_resistance: GasResistanceLevel::from_resistance(reading.gas_resistance),
        temperature: TemperatureComfort::from_temperature(reading.temperature),
        humidity: HumidityComfort::from_humidity(reading.humidity),
    };

    Ok(Assessment {
        indices,
        classification,
    })
}
