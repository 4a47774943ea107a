//! Serial CSV sink
//!
//! One text line per accepted sample:
//! `timestamp_ms,x,y,z,magnitude,peak`, floats at three decimals. Output
//! goes to stdout or to a real serial port, per config. Emission is gated
//! by the serial-enabled setting upstream; this sink only formats and
//! writes.

use crate::error::Result;
use crate::sinks::Cadence;
use crate::types::ConditionedSample;
use std::io::Write;
use std::time::{Duration, Instant};

/// CSV writer with an elapsed-time gate.
///
/// The default interval is 0 ms, so every accepted sample passes; a
/// nonzero interval decimates the stream for slow consumers.
pub struct SerialSink {
    out: Box<dyn Write + Send>,
    cadence: Cadence,
    write_errors: u64,
    last_error_log: Option<Instant>,
}

impl SerialSink {
    /// Write CSV to stdout.
    pub fn stdout(interval_ms: u32) -> Self {
        Self::with_writer(Box::new(std::io::stdout()), interval_ms)
    }

    /// Write CSV to a serial port (8N1).
    pub fn open_port(path: &str, baud: u32, interval_ms: u32) -> Result<Self> {
        let port = serialport::new(path, baud)
            .timeout(Duration::from_millis(10))
            .open()?;
        log::info!("Serial: CSV output on {} at {} baud", path, baud);
        Ok(Self::with_writer(Box::new(port), interval_ms))
    }

    /// Write CSV to any writer (tests capture through this).
    pub fn with_writer(out: Box<dyn Write + Send>, interval_ms: u32) -> Self {
        Self {
            out,
            cadence: Cadence::new(interval_ms),
            write_errors: 0,
            last_error_log: None,
        }
    }

    /// Emit one CSV line if the gate allows it.
    ///
    /// Write failures are counted and logged at most once per second; the
    /// sample path must never stall on a slow consumer.
    pub fn emit(&mut self, timestamp_ms: u32, sample: &ConditionedSample) {
        if !self.cadence.ready(timestamp_ms) {
            return;
        }
        let result = writeln!(
            self.out,
            "{},{:.3},{:.3},{:.3},{:.3},{:.3}",
            timestamp_ms, sample.x, sample.y, sample.z, sample.magnitude, sample.peak
        );
        if let Err(e) = result {
            self.write_errors += 1;
            let should_log = self
                .last_error_log
                .map_or(true, |last| last.elapsed() >= Duration::from_secs(1));
            if should_log {
                log::warn!("Serial: write failed ({} total): {}", self.write_errors, e);
                self.last_error_log = Some(Instant::now());
            }
        }
    }

    pub fn write_errors(&self) -> u64 {
        self.write_errors
    }
}
