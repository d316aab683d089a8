//! The shared background sampling loop.
//!
//! One sampler runs per process. Each tick acquires a reading, derives
//! the air-quality assessment when the gas data is trustworthy, and
//! yields exactly one [`TelemetryMessage`]. Failures inside a tick are
//! downgraded to the empty message; only process shutdown ends the loop.

use crate::error::{Result, TelemetryError};
use crate::quality;
use crate::sensor::data::RawReading;
use crate::sensor::SensorDriver;
use crate::telemetry::message::TelemetryMessage;
use futures_util::stream::{self, BoxStream};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

/// Ceiling on a single sensor transaction, so a wedged bus cannot stall
/// the loop past one tick.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// The periodic acquisition/assessment loop.
///
/// Owns the only handle to the sensor driver. Constructed once at
/// startup and consumed by [`Sampler::into_stream`] when the hub starts
/// it on the first subscriber connection.
pub struct Sampler {
    driver: Box<dyn SensorDriver>,
    interval: Duration,
    read_timeout: Duration,
    shutdown: watch::Receiver<bool>,
}

impl Sampler {
    pub fn new(
        driver: Box<dyn SensorDriver>,
        interval: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            driver,
            interval,
            read_timeout: DEFAULT_READ_TIMEOUT,
            shutdown,
        }
    }

    /// Override the per-read timeout (primarily for tests).
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// One guarded sensor transaction.
    ///
    /// A shutdown signal or an expired read timeout both surface as
    /// [`TelemetryError::Interrupted`].
    async fn acquire(&mut self) -> Result<RawReading> {
        let read_timeout = self.read_timeout;
        let mut shutdown = self.shutdown.clone();

        tokio::select! {
            _ = shutdown.changed() => Err(TelemetryError::Interrupted),
            result = time::timeout(read_timeout, self.driver.read_once()) => {
                result.map_err(|_| TelemetryError::Interrupted)?
            }
        }
    }

    /// Produce the single message for one tick. Never fails: every
    /// per-tick error becomes the empty sentinel.
    async fn sample_once(&mut self) -> TelemetryMessage {
        let reading = match self.acquire().await {
            Ok(reading) => reading,
            Err(e) => {
                warn!("sampler tick produced no data: {}", e);
                return TelemetryMessage::Empty;
            }
        };

        if !reading.heat_stable {
            debug!("gas heater not settled, reporting without gas data");
            return TelemetryMessage::sample(reading, None);
        }

        match quality::assess(&reading) {
            Ok(assessment) => TelemetryMessage::sample(reading, Some(assessment)),
            Err(e) => {
                warn!("sampler tick produced no data: {}", e);
                TelemetryMessage::Empty
            }
        }
    }

    /// Turn the sampler into its tick stream.
    ///
    /// Ticks are strictly sequential; the stream ends only when the
    /// shutdown flag is raised.
    pub fn into_stream(self) -> BoxStream<'static, TelemetryMessage> {
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let stream = stream::unfold(
            (self, interval),
            |(mut sampler, mut interval)| async move {
                if *sampler.shutdown.borrow() {
                    return None;
                }

                let mut shutdown = sampler.shutdown.clone();
                tokio::select! {
                    _ = shutdown.changed() => None,
                    _ = interval.tick() => {
                        let message = sampler.sample_once().await;
                        Some((message, (sampler, interval)))
                    }
                }
            },
        );

        Box::pin(stream)
    }
}
