//! airpulse - Live Air-Quality Telemetry Binary
//!
//! A standalone binary that serves BME680 air-quality telemetry to web
//! subscribers in real time.

use airpulse::{
    sensor, start_web_server, Hub, Sampler, SensorDriver, TelemetrySample, WebConfig,
    DEFAULT_SAMPLE_INTERVAL_SECS, DEFAULT_WEB_PORT,
};
use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "airpulse")]
#[command(about = "airpulse - Live BME680 air-quality telemetry")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Austin Couch")]
#[command(long_about = "Samples a BME680 environmental sensor and pushes air-quality telemetry to web subscribers")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Web server bind address
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Web server port
    #[arg(short, long, default_value_t = DEFAULT_WEB_PORT)]
    port: u16,

    /// Sampling interval in seconds
    #[arg(short, long, default_value_t = DEFAULT_SAMPLE_INTERVAL_SECS)]
    interval: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server (default)
    Serve(ServeArgs),

    /// Take a single reading, assess it, and exit
    Sample(SampleArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Static files directory (optional)
    #[arg(long)]
    static_dir: Option<String>,

    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,
}

#[derive(Args)]
struct SampleArgs {
    /// Output format: json or pretty
    #[arg(short, long, default_value = "pretty")]
    format: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;
    print_banner();

    match &cli.command {
        Some(Commands::Serve(args)) => serve_command(&cli, args).await?,
        Some(Commands::Sample(args)) => sample_command(args).await?,
        None => {
            let serve_args = ServeArgs {
                static_dir: None,
                no_cors: false,
            };
            serve_command(&cli, &serve_args).await?;
        }
    }

    Ok(())
}

fn init_logging(cli: &Cli) -> anyhow::Result<()> {
    let level = if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    Ok(())
}

fn print_banner() {
    println!("airpulse - Live BME680 air-quality telemetry");
    println!("   Version: {}", env!("CARGO_PKG_VERSION"));
    println!();
}

async fn serve_command(cli: &Cli, args: &ServeArgs) -> anyhow::Result<()> {
    info!("Starting airpulse telemetry publisher...");

    let driver = sensor::open(&Default::default()).context("could not open the sensor")?;
    info!("Sensor ready: {}", driver.name());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sampler = Sampler::new(driver, Duration::from_secs(cli.interval), shutdown_rx);
    let hub = Hub::new(sampler, shutdown_tx);

    let mut web_config = WebConfig::new(&cli.host, cli.port).with_cors(!args.no_cors);

    if let Some(static_dir) = &args.static_dir {
        web_config = web_config.with_static_path(Some(static_dir.clone()));
        info!("Using static files from: {}", static_dir);
    }

    info!("Web server configuration:");
    info!("  - Bind address: {}:{}", cli.host, cli.port);
    info!("  - CORS enabled: {}", !args.no_cors);
    info!("  - Sampling interval: {}s", cli.interval);

    start_web_server(web_config, hub)
        .await
        .context("web server failed")?;

    Ok(())
}

async fn sample_command(args: &SampleArgs) -> anyhow::Result<()> {
    let mut driver = sensor::open(&Default::default()).context("could not open the sensor")?;
    let reading = driver
        .read_once()
        .await
        .context("sensor read failed")?;

    let assessment = if reading.heat_stable {
        Some(airpulse::quality::assess(&reading).context("assessment failed")?)
    } else {
        None
    };

    match args.format.as_str() {
        "json" => {
            let sample = TelemetrySample {
                timestamp: chrono::Utc::now(),
                reading,
                assessment,
            };
            println!("{}", serde_json::to_string_pretty(&sample)?);
        }
        "pretty" => {
            print_pretty_sample(&reading, assessment.as_ref());
        }
        other => {
            anyhow::bail!("unsupported format: {}. Use 'json' or 'pretty'", other);
        }
    }

    Ok(())
}

fn print_pretty_sample(
    reading: &airpulse::RawReading,
    assessment: Option<&airpulse::Assessment>,
) {
    println!("Sensor reading");
    println!("==============");
    println!("  Temperature: {:.1} C", reading.temperature);
    println!("  Humidity: {:.1} %", reading.humidity);
    println!("  Pressure: {:.1} hPa", reading.pressure);

    if let Some(assessment) = assessment {
        println!("  Gas resistance: {:.0} Ohms", reading.gas_resistance);
        println!();
        println!("Air quality");
        println!("===========");
        println!("  Weighted IAQ: {:.1}", assessment.indices.weighted);
        println!("  Legacy IAQ: {:.1}", assessment.indices.legacy_ratio);
        println!(
            "  Air quality: {}",
            assessment.classification.air_quality
        );
        println!(
            "  Gas resistance: {}",
            assessment.classification.gas_resistance
        );
        println!(
            "  Temperature comfort: {}",
            assessment.classification.temperature
        );
        println!(
            "  Humidity comfort: {}",
            assessment.classification.humidity
        );
    } else {
        println!();
        println!("Gas heater not settled yet; gas data omitted.");
    }
}
