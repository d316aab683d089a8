//! Web server for the airpulse telemetry dashboard and push channel.
//!
//! One route serves the landing page; `/ws` is the persistent push
//! channel that subscribers receive `sensor_update` events over.

pub mod config;
pub mod handlers;
pub mod router;
pub mod websocket;

// Re-export commonly used items
pub use config::WebConfig;
pub use router::create_app;
pub use websocket::Hub;

use crate::error::{Result, TelemetryError};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Start the web server and run it until shutdown.
///
/// Ctrl-C stops accepting connections and raises the hub's shutdown
/// flag, which is also what terminates the sampling loop.
pub async fn start_web_server(config: WebConfig, hub: Arc<Hub>) -> Result<()> {
    let app = create_app(config.clone(), Arc::clone(&hub)).await?;

    let addr = format!("{}:{}", config.host, config.port)
        .parse::<SocketAddr>()
        .map_err(|e| TelemetryError::config(format!("Invalid bind address: {}", e)))?;

    info!("Starting airpulse web server on http://{}", addr);
    info!("Dashboard available at http://{}/", addr);
    info!("Push channel endpoint: ws://{}/ws", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TelemetryError::web_server(format!("Failed to bind to address: {}", e)))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(hub))
        .await
        .map_err(|e| TelemetryError::web_server(format!("Server error: {}", e)))?;

    Ok(())
}

async fn shutdown_signal(hub: Arc<Hub>) {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested, stopping sampler and server");
    }
    hub.shutdown();
}
