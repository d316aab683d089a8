use airpulse::{
    error::TelemetryError,
    quality::{self, GasResistanceLevel, HumidityComfort, TemperatureComfort},
    sensor::{RawReading, SensorDriver, SensorSettings},
    telemetry::{PushEvent, Sampler, TelemetryMessage, TelemetrySample},
    Hub, WebConfig,
};
use async_trait::async_trait;
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

fn comfortable_reading() -> RawReading {
    RawReading {
        temperature: 22.0,
        humidity: 45.0,
        pressure: 1013.2,
        gas_resistance: 55_000.0,
        heat_stable: true,
    }
}

/// Test TelemetrySample serialization and deserialization
#[test]
fn test_telemetry_sample_serialization() {
    let reading = comfortable_reading();
    let sample = TelemetrySample {
        timestamp: chrono::Utc::now(),
        reading,
        assessment: Some(quality::assess(&reading).unwrap()),
    };

    let json = serde_json::to_string_pretty(&sample).expect("Should serialize to JSON");
    assert!(json.contains("gas_resistance"));
    assert!(json.contains("legacy_ratio"));
    assert!(json.contains("\"good\""));

    let deserialized: TelemetrySample =
        serde_json::from_str(&json).expect("Should deserialize from JSON");
    assert_eq!(deserialized.reading, reading);

    let assessment = deserialized.assessment.expect("assessment survives");
    assert_eq!(
        assessment.classification.gas_resistance,
        GasResistanceLevel::Good
    );
}

/// The full pipeline reproduces the original wire line digit for digit
#[test]
fn test_wire_format_parity() {
    let reading = comfortable_reading();
    let assessment = quality::assess(&reading).unwrap();
    let message = TelemetryMessage::sample(reading, Some(assessment));

    assert_eq!(
        message.render().unwrap(),
        "BME680: Temp: 22.0 C, Humidity: 45.0 %, Pressure: 1013.2 hPa, \
         Gas: 55.000 Ohms, iaq: 303.9, air quality - normal, \
         gas resistance - good, temperature - good, humidity - good,"
    );
}

/// A comfortable room, assessed end to end
#[test]
fn test_comfortable_room_assessment() {
    let assessment = quality::assess(&comfortable_reading()).unwrap();

    assert_eq!(
        assessment.classification.gas_resistance,
        GasResistanceLevel::Good
    );
    assert_eq!(
        assessment.classification.temperature,
        TemperatureComfort::Good
    );
    assert_eq!(assessment.classification.humidity, HumidityComfort::Good);

    assert!((assessment.indices.voc - 250.0).abs() < 1e-9);
    assert!((assessment.indices.temperature - 500.0).abs() < 1e-9);
    assert!((assessment.indices.humidity - 500.0).abs() < 1e-9);
    assert!((assessment.indices.weighted - 375.0).abs() < 1e-9);
}

/// Warm room with dangerous gas resistance
#[test]
fn test_poor_air_assessment() {
    let reading = RawReading {
        temperature: 27.0,
        humidity: 65.0,
        pressure: 1000.0,
        gas_resistance: 8_000.0,
        heat_stable: true,
    };
    let assessment = quality::assess(&reading).unwrap();

    assert_eq!(
        assessment.classification.gas_resistance,
        GasResistanceLevel::Dangerous
    );
    assert_eq!(
        assessment.classification.temperature,
        TemperatureComfort::Hot
    );
    assert_eq!(assessment.classification.humidity, HumidityComfort::High);

    assert_eq!(assessment.indices.voc, 0.0);
    assert!((assessment.indices.weighted - 135.0).abs() < 1e-9);
}

/// Zero humidity never reaches a published message as inf or NaN
#[test]
fn test_zero_humidity_is_a_domain_error() {
    let reading = RawReading {
        humidity: 0.0,
        ..comfortable_reading()
    };

    let err = quality::assess(&reading).unwrap_err();
    assert!(matches!(err, TelemetryError::Domain(_)));
}

/// The empty sentinel crosses the wire as a null payload
#[test]
fn test_empty_message_serializes_as_null() {
    let event = PushEvent::from(&TelemetryMessage::Empty);
    let json = serde_json::to_string(&event).unwrap();
    assert_eq!(json, r#"{"event":"sensor_update","data":null}"#);
}

/// Test WebConfig defaults and builders
#[test]
fn test_web_config() {
    let config = WebConfig::default();
    assert_eq!(config.bind_address(), "0.0.0.0:5000");

    let config = WebConfig::new("127.0.0.1", 9000).with_cors(false);
    assert_eq!(config.bind_address(), "127.0.0.1:9000");
    assert!(!config.enable_cors);
}

enum Step {
    Read(RawReading),
    Fail,
}

struct ScriptedDriver {
    steps: std::collections::VecDeque<Step>,
}

#[async_trait]
impl SensorDriver for ScriptedDriver {
    fn name(&self) -> &str {
        "scripted"
    }

    fn configure(&mut self, _settings: &SensorSettings) -> airpulse::Result<()> {
        Ok(())
    }

    async fn read_once(&mut self) -> airpulse::Result<RawReading> {
        match self.steps.pop_front() {
            Some(Step::Read(reading)) => Ok(reading),
            Some(Step::Fail) | None => Err(TelemetryError::acquisition("scripted failure")),
        }
    }
}

fn scripted_sampler(steps: Vec<Step>) -> (Sampler, watch::Sender<bool>) {
    let (tx, rx) = watch::channel(false);
    let driver = Box::new(ScriptedDriver {
        steps: steps.into(),
    });
    (Sampler::new(driver, Duration::from_millis(1), rx), tx)
}

/// A failed acquisition yields the null sentinel, then normal service resumes
#[tokio::test]
async fn test_sampler_recovers_after_bad_tick() {
    let (sampler, _tx) = scripted_sampler(vec![
        Step::Read(comfortable_reading()),
        Step::Fail,
        Step::Read(comfortable_reading()),
    ]);

    let messages: Vec<_> = sampler.into_stream().take(3).collect().await;

    assert!(!messages[0].is_empty());
    assert!(messages[1].is_empty());
    assert!(!messages[2].is_empty());
}

/// A reading without heat-stable gas data keeps the raw fields and drops
/// the assessment
#[tokio::test]
async fn test_sampler_reports_partial_data_during_warmup() {
    let (sampler, _tx) = scripted_sampler(vec![Step::Read(RawReading {
        heat_stable: false,
        ..comfortable_reading()
    })]);

    let messages: Vec<_> = sampler.into_stream().take(1).collect().await;

    match &messages[0] {
        TelemetryMessage::Sample(sample) => {
            assert!(sample.assessment.is_none());
            assert_eq!(
                sample.render(),
                "BME680: Temp: 22.0 C, Humidity: 45.0 %, Pressure: 1013.2 hPa,"
            );
        }
        TelemetryMessage::Empty => panic!("expected a partial sample"),
    }
}

fn scripted_hub(steps: Vec<Step>) -> Arc<Hub> {
    let (tx, rx) = watch::channel(false);
    let driver = Box::new(ScriptedDriver {
        steps: steps.into(),
    });
    let sampler = Sampler::new(driver, Duration::from_millis(1), rx);
    Hub::new(sampler, tx)
}

/// N concurrent first connections start exactly one sampling loop
#[tokio::test]
async fn test_concurrent_connects_start_one_sampler() {
    let hub = scripted_hub(vec![Step::Read(comfortable_reading())]);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let hub = Arc::clone(&hub);
            tokio::spawn(async move { hub.ensure_sampler_started() })
        })
        .collect();

    let mut starts = 0;
    for handle in handles {
        if handle.await.unwrap() {
            starts += 1;
        }
    }

    assert_eq!(starts, 1);
    assert!(hub.sampler_running());
    hub.shutdown();
}

/// Once running, the loop survives every subscriber going away
#[tokio::test]
async fn test_sampler_outlives_subscribers() {
    let hub = scripted_hub(vec![
        Step::Read(comfortable_reading()),
        Step::Read(comfortable_reading()),
        Step::Read(comfortable_reading()),
    ]);

    let mut rx = hub.subscribe();
    hub.ensure_sampler_started();

    let first = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("sampler should tick")
        .expect("channel open");
    assert!(!first.is_empty());

    // Last subscriber leaves; the loop must keep running.
    drop(rx);

    // A later connection does not restart anything.
    assert!(!hub.ensure_sampler_started());

    let mut rx = hub.subscribe();
    let next = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("sampler should still tick")
        .expect("channel open");

    // The script has run dry by now or delivers its remaining reads;
    // either way the loop is alive and publishing every tick.
    let _ = next;
    hub.shutdown();
}
