//! # airpulse - Live Air-Quality Telemetry
//!
//! A small Rust crate that samples a BME680 environmental sensor on a
//! fixed interval, derives air-quality indices and classifications from
//! each reading, and pushes the formatted result to every connected
//! WebSocket subscriber.
//!
//! ## Features
//!
//! - **Periodic sampling**: one shared background loop, started lazily on
//!   the first subscriber connection, exactly once per process
//! - **Air-quality assessment**: weighted composite and legacy ratio IAQ
//!   indices plus comfort classifications
//! - **Live fan-out**: `sensor_update` events over WebSocket, null on
//!   ticks that produced no data
//! - **Hardware optional**: a simulated driver runs everywhere; the real
//!   BME680 sits behind the `hardware` feature
//! - **Library + Binary**: use as a crate or standalone application
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use airpulse::{sensor, start_web_server, Hub, Sampler, WebConfig};
//! use std::time::Duration;
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let driver = sensor::open(&Default::default())?;
//!
//!     let (shutdown_tx, shutdown_rx) = watch::channel(false);
//!     let sampler = Sampler::new(driver, Duration::from_secs(10), shutdown_rx);
//!     let hub = Hub::new(sampler, shutdown_tx);
//!
//!     // Serve the dashboard and push channel on port 5000
//!     start_web_server(WebConfig::default(), hub).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod quality;
pub mod sensor;
pub mod telemetry;
pub mod web;

// Re-export public API
pub use error::{Result, TelemetryError};
pub use quality::{
    AirQualityIndices, AirQualityLevel, Assessment, Classification, GasResistanceLevel,
    HumidityComfort, TemperatureComfort,
};
pub use sensor::{RawReading, SensorDriver, SensorSettings, SimulatedSensor};
pub use telemetry::{
    PushEvent, Sampler, TelemetryMessage, TelemetrySample, SENSOR_UPDATE_EVENT,
};
pub use web::{start_web_server, Hub, WebConfig};

/// The sensor name used in every telemetry line
pub const SENSOR_NAME: &str = "BME680";

/// The default sampling interval in seconds
pub const DEFAULT_SAMPLE_INTERVAL_SECS: u64 = 10;

/// The default web server port
pub const DEFAULT_WEB_PORT: u16 = 5000;
