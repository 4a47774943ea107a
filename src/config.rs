//! Configuration for the VegaIO daemon
//!
//! Loads configuration from a TOML file. Every section has bench-calibrated
//! defaults so the daemon runs without a file at all.

use crate::error::Result;
use crate::sinks::DISPLAY_INTERVAL_MS;
use crate::telemetry::{NOTIFY_RATE_DEFAULT_HZ, PEAK_NOTIFY_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub sampling: SamplingConfig,
    pub sensor: SensorConfig,
    pub serial: SerialConfig,
    pub display: DisplayConfig,
    pub telemetry: TelemetryConfig,
    pub settings: SettingsConfig,
    pub logging: LoggingConfig,
}

/// Acquisition pacing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SamplingConfig {
    /// Sample rate in Hz. Must be one of 100, 200, 400, 800.
    pub rate_hz: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { rate_hz: 100 }
    }
}

/// Simulated sensor model and calibration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SensorConfig {
    /// Standard deviation of per-axis gaussian noise, in g
    pub noise_stddev_g: f32,
    /// Per-sample probability of a shock impulse on one axis
    pub impulse_probability: f32,
    /// Amplitude of an injected shock impulse, in g
    pub impulse_peak_g: f32,
    /// Calibration offsets, measured with the sensor flat and at rest.
    /// Subtracted from every raw reading.
    pub offset_x: f32,
    pub offset_y: f32,
    pub offset_z: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            noise_stddev_g: 0.02,
            impulse_probability: 0.002,
            impulse_peak_g: 30.0,
            offset_x: 0.35,
            offset_y: -0.60,
            offset_z: 0.70,
        }
    }
}

/// Serial CSV output
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SerialConfig {
    /// Serial port device path. An empty string writes CSV to stdout.
    pub port: String,
    /// Baud rate when a real port is used
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud: 115_200,
        }
    }
}

/// Display refresh
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    /// Milliseconds between display refreshes (50 = 20 Hz)
    pub update_interval_ms: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: DISPLAY_INTERVAL_MS,
        }
    }
}

/// Wireless telemetry pacing
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelemetryConfig {
    /// Data notification rate in Hz, clamped to 5..=50 at runtime
    pub notify_rate_hz: u8,
    /// Milliseconds between peak-hold notifications
    pub peak_interval_ms: u32,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            notify_rate_hz: NOTIFY_RATE_DEFAULT_HZ,
            peak_interval_ms: PEAK_NOTIFY_INTERVAL_MS,
        }
    }
}

/// Initial output-channel switches. Both can be toggled at runtime from the
/// settings screen.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SettingsConfig {
    pub wireless_enabled: bool,
    pub serial_enabled: bool,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            wireless_enabled: true,
            serial_enabled: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log output (stdout or stderr). Defaults to stderr so logs never mix
    /// into the CSV stream on stdout.
    pub output: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: "stderr".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML file
    ///
    /// # Arguments
    /// - `path`: Path to TOML configuration file
    ///
    /// # Returns
    /// Parsed configuration or error
    ///
    /// # Example
    /// ```no_run
    /// use vega_io::config::AppConfig;
    ///
    /// let config = AppConfig::from_file("vegaio.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Default configuration for the gSENSOR instrument
    ///
    /// Suitable for testing and development. Production deployments
    /// should use a proper TOML configuration file.
    pub fn gsensor_defaults() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            sensor: SensorConfig::default(),
            serial: SerialConfig::default(),
            display: DisplayConfig::default(),
            telemetry: TelemetryConfig::default(),
            settings: SettingsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Save configuration to TOML file
    ///
    /// # Arguments
    /// - `path`: Path to save TOML configuration file
    ///
    /// # Returns
    /// Success or error
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::gsensor_defaults()
    }
}
