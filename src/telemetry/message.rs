//! The externally observable telemetry unit and its wire formats.

use crate::quality::Assessment;
use crate::sensor::data::RawReading;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event name carried by every push-channel frame.
pub const SENSOR_UPDATE_EVENT: &str = "sensor_update";

/// One populated telemetry sample: the reading it was computed from plus
/// the derived assessment, when the gas data was trustworthy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// When the sample was taken
    pub timestamp: DateTime<Utc>,
    /// The raw reading this sample was computed from
    pub reading: RawReading,
    /// Indices and classification; absent when the reading was not
    /// heat-stable
    pub assessment: Option<Assessment>,
}

impl TelemetrySample {
    /// Render the human-readable telemetry line.
    ///
    /// The numeric formatting is load-bearing: one decimal for
    /// temperature, humidity, pressure, and iaq, three decimals for gas
    /// resistance in kilo-ohms (historically labeled "Ohms"). Existing
    /// consumers parse this shape.
    pub fn render(&self) -> String {
        let mut out = format!(
            "{}: Temp: {:.1} C, Humidity: {:.1} %, Pressure: {:.1} hPa,",
            crate::SENSOR_NAME,
            self.reading.temperature,
            self.reading.humidity,
            self.reading.pressure
        );

        if let Some(assessment) = &self.assessment {
            out.push_str(&format!(
                " Gas: {:.3} Ohms, iaq: {:.1},",
                self.reading.gas_resistance / 1000.0,
                assessment.indices.legacy_ratio
            ));

            let classification = &assessment.classification;
            out.push_str(&format!(" air quality - {},", classification.air_quality));
            out.push_str(&format!(
                " gas resistance - {},",
                classification.gas_resistance
            ));
            out.push_str(&format!(" temperature - {},", classification.temperature));
            out.push_str(&format!(" humidity - {},", classification.humidity));
        }

        out
    }
}

/// Exactly one of these is produced per sampler tick.
#[derive(Debug, Clone)]
pub enum TelemetryMessage {
    /// A sample was acquired this tick
    Sample(TelemetrySample),
    /// The tick produced no data; subscribers see a null update
    Empty,
}

impl TelemetryMessage {
    /// Build a populated message stamped with the current time.
    pub fn sample(reading: RawReading, assessment: Option<Assessment>) -> Self {
        Self::Sample(TelemetrySample {
            timestamp: Utc::now(),
            reading,
            assessment,
        })
    }

    /// The formatted telemetry line, or `None` for the empty sentinel.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Sample(sample) => Some(sample.render()),
            Self::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// The JSON frame pushed to every subscriber.
#[derive(Debug, Clone, Serialize)]
pub struct PushEvent {
    pub event: &'static str,
    pub data: Option<String>,
}

impl From<&TelemetryMessage> for PushEvent {
    fn from(message: &TelemetryMessage) -> Self {
        Self {
            event: SENSOR_UPDATE_EVENT,
            data: message.render(),
        }
    }
}
