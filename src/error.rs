//! Error types for VegaIO

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// VegaIO error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Device not initialized
    #[error("Device not initialized")]
    NotInitialized,

    /// Subsystem initialization failed
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// Requested sample rate is not in the supported set
    #[error("Unsupported sample rate: {0} Hz")]
    UnsupportedSampleRate(u32),

    /// Sensor read failed for this tick
    #[error("Sensor error: {0}")]
    Sensor(String),

    /// Wireless link-layer failure
    #[error("Link error: {0}")]
    Link(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
