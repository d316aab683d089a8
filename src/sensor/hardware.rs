//! BME680 hardware driver adapter (requires the `hardware` feature).
//!
//! Register-level I/O is delegated to the `bme680` driver crate over the
//! Pi's I2C bus. The device is probed on the primary address first, then
//! the secondary; if neither responds there is nothing useful to run and
//! startup fails.

use crate::error::{Result, TelemetryError};
use crate::sensor::data::{FilterSize, Oversampling, RawReading, SensorSettings};
use crate::sensor::traits::SensorDriver;
use async_trait::async_trait;
use bme680::{Bme680, I2CAddress, IIRFilterSize, OversamplingSetting, PowerMode, SettingsBuilder};
use rppal::hal::Delay;
use rppal::i2c::I2c;
use std::time::Duration;
use tracing::{debug, info};

/// Driver for a BME680 attached to the Pi's I2C bus.
pub struct HardwareBme680 {
    device: Bme680<I2c, Delay>,
    delay: Delay,
    heater_settled_after: Duration,
}

impl HardwareBme680 {
    /// Open the sensor, probing the primary I2C address then the secondary.
    pub fn open() -> Result<Self> {
        let device = Self::probe(I2CAddress::Primary)
            .or_else(|primary_err| {
                debug!(
                    "no BME680 on primary address ({}), probing secondary",
                    primary_err
                );
                Self::probe(I2CAddress::Secondary)
            })
            .map_err(|e| {
                TelemetryError::startup(format!("no BME680 found on any known address: {}", e))
            })?;

        info!("BME680 opened on the I2C bus");

        Ok(Self {
            device,
            delay: Delay::new(),
            heater_settled_after: Duration::ZERO,
        })
    }

    fn probe(address: I2CAddress) -> std::result::Result<Bme680<I2c, Delay>, String> {
        let i2c = I2c::new().map_err(|e| format!("I2C bus unavailable: {}", e))?;
        let mut delay = Delay::new();

        Bme680::init(i2c, &mut delay, address)
            .map_err(|e| format!("init on {:?} failed: {:?}", address, e))
    }

    fn map_oversampling(oversampling: Oversampling) -> OversamplingSetting {
        match oversampling {
            Oversampling::X1 => OversamplingSetting::OS1x,
            Oversampling::X2 => OversamplingSetting::OS2x,
            Oversampling::X4 => OversamplingSetting::OS4x,
            Oversampling::X8 => OversamplingSetting::OS8x,
            Oversampling::X16 => OversamplingSetting::OS16x,
        }
    }

    fn map_filter(filter: FilterSize) -> IIRFilterSize {
        match filter {
            FilterSize::Size0 => IIRFilterSize::Size0,
            FilterSize::Size1 => IIRFilterSize::Size1,
            FilterSize::Size3 => IIRFilterSize::Size3,
            FilterSize::Size7 => IIRFilterSize::Size7,
            FilterSize::Size15 => IIRFilterSize::Size15,
            FilterSize::Size31 => IIRFilterSize::Size31,
            FilterSize::Size63 => IIRFilterSize::Size63,
            FilterSize::Size127 => IIRFilterSize::Size127,
        }
    }
}

#[async_trait]
impl SensorDriver for HardwareBme680 {
    fn name(&self) -> &str {
        "BME680"
    }

    fn configure(&mut self, settings: &SensorSettings) -> Result<()> {
        let heater_duration = Duration::from_millis(u64::from(settings.heater.duration_ms));

        let device_settings = SettingsBuilder::new()
            .with_humidity_oversampling(Self::map_oversampling(settings.humidity_oversampling))
            .with_pressure_oversampling(Self::map_oversampling(settings.pressure_oversampling))
            .with_temperature_oversampling(Self::map_oversampling(
                settings.temperature_oversampling,
            ))
            .with_temperature_filter(Self::map_filter(settings.filter))
            .with_gas_measurement(heater_duration, settings.heater.temperature_celsius, 20)
            .with_run_gas(true)
            .build();

        self.device
            .set_sensor_settings(&mut self.delay, device_settings)
            .map_err(|e| TelemetryError::acquisition(format!("settings rejected: {:?}", e)))?;

        self.heater_settled_after = heater_duration;
        debug!("BME680 configured: {:?}", settings);

        Ok(())
    }

    async fn read_once(&mut self) -> Result<RawReading> {
        // Forced mode triggers exactly one measurement cycle.
        self.device
            .set_sensor_mode(&mut self.delay, PowerMode::ForcedMode)
            .map_err(|e| TelemetryError::acquisition(format!("trigger failed: {:?}", e)))?;

        tokio::time::sleep(self.heater_settled_after).await;

        let (data, _state) = self
            .device
            .get_sensor_data(&mut self.delay)
            .map_err(|e| TelemetryError::acquisition(format!("read failed: {:?}", e)))?;

        Ok(RawReading {
            temperature: f64::from(data.temperature_celsius()),
            humidity: f64::from(data.humidity_percent()),
            pressure: f64::from(data.pressure_hpa()),
            gas_resistance: f64::from(data.gas_resistance_ohm()),
            heat_stable: data.heat_stable(),
        })
    }
}
