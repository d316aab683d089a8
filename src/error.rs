//! Error handling for the airpulse telemetry crate.

/// A specialized `Result` type for airpulse operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// The main error type for airpulse telemetry operations.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Sensor acquisition failed for one read
    #[error("Sensor acquisition failed: {0}")]
    Acquisition(String),

    /// A sensor read was cancelled or timed out
    #[error("Sensor read interrupted")]
    Interrupted,

    /// The air-quality calculation hit an undefined domain value
    #[error("Air-quality domain error: {0}")]
    Domain(String),

    /// Delivery to a single subscriber channel failed
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// The sensor could not be opened on any known address
    #[error("Sensor startup failed: {0}")]
    Startup(String),

    /// Web server error
    #[error("Web server error: {0}")]
    WebServer(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TelemetryError {
    /// Create a new acquisition error
    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::Acquisition(msg.into())
    }

    /// Create a new domain error
    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    /// Create a new delivery error
    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }

    /// Create a new startup error
    pub fn startup(msg: impl Into<String>) -> Self {
        Self::Startup(msg.into())
    }

    /// Create a new web server error
    pub fn web_server(msg: impl Into<String>) -> Self {
        Self::WebServer(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
