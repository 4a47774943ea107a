//! VegaIO - instrument core for the gSENSOR high-range accelerometer
//!
//! This library provides the real-time telemetry pipeline of a
//! battery-powered, screen-equipped accelerometer instrument: clocked
//! acquisition, signal conditioning with peak hold, touch and button
//! input, a two-screen UI, and fan-out to display, serial CSV, and
//! wireless telemetry.
//!
//! Hardware collaborators (sensor, touch panel, button, display panel,
//! radio link) sit behind traits, so the full pipeline runs host-side
//! against simulated backends.

pub mod app;
pub mod clock;
pub mod config;
pub mod console;
pub mod drivers;
pub mod error;
pub mod input;
pub mod signal;
pub mod sinks;
pub mod telemetry;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
