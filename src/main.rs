//! VegaIO - telemetry daemon for the gSENSOR high-range accelerometer
//!
//! One cooperative control loop drives the instrument: clocked acquisition
//! feeds the signal conditioner, touch and button input drive the
//! two-screen UI, and the conditioned stream fans out to the display, the
//! serial CSV stream, and the wireless telemetry service, each on its own
//! cadence.

use log::{info, warn};
use std::env;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use vega_io::app::VegaApp;
use vega_io::config::AppConfig;
use vega_io::error::{Error, Result};

/// Parse config path from command line arguments.
///
/// Supports:
/// - `vega-io <path>` (positional)
/// - `vega-io --config <path>` (flag-based)
/// - `vega-io -c <path>` (short flag)
///
/// Defaults to `/etc/vegaio.toml` if not specified.
fn parse_config_path() -> String {
    let args: Vec<String> = env::args().collect();

    // Look for --config or -c flag
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }

    // Fall back to first positional argument (if it doesn't start with -)
    if args.len() > 1 && !args[1].starts_with('-') {
        return args[1].clone();
    }

    // Default path
    "/etc/vegaio.toml".to_string()
}

fn main() -> Result<()> {
    // Config comes first: it decides the log level and target. A missing
    // file falls back to defaults; a malformed one is a startup error.
    let config_path = parse_config_path();
    let (config, config_found) = if Path::new(&config_path).exists() {
        (AppConfig::from_file(&config_path)?, true)
    } else {
        (AppConfig::default(), false)
    };

    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(&config.logging.level),
    );
    if config.logging.output == "stdout" {
        builder.target(env_logger::Target::Stdout);
    }
    builder.init();

    info!("VegaIO v{} starting...", env!("CARGO_PKG_VERSION"));
    if config_found {
        info!("Using config: {}", config_path);
    } else {
        warn!("Config {} not found, using gSENSOR defaults", config_path);
    }

    // Set up shutdown signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);

    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let mut app = VegaApp::new(&config, &running)?;
    app.run(&running)?;

    info!("VegaIO stopped");
    Ok(())
}
