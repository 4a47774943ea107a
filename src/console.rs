//! Debug console
//!
//! Single-character command surface on stdin:
//!
//! | Input   | Command                          |
//! |---------|----------------------------------|
//! | `r`/`R` | Reset the peak hold              |
//! | `c`/`C` | Full filter reset                |
//! | `s1`..`s4` | Sample rate 100/200/400/800 Hz |
//! | `?`     | Print rate and command summary   |
//!
//! Anything else is ignored silently. The parser is a plain byte-at-a-time
//! state machine so it works the same whether bytes arrive one keystroke or
//! one line at a time.

use crate::error::Result;
use crossbeam_channel::{unbounded, Receiver};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Parsed console command, ready for the control loop to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    ResetPeak,
    ResetFilters,
    SetSampleRate(u32),
    Status,
}

/// Byte-stream command parser. The only state is the one-byte lookahead
/// after `s`.
#[derive(Debug, Default)]
pub struct ConsoleParser {
    awaiting_rate_digit: bool,
}

impl ConsoleParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte; returns a command when one completes.
    pub fn feed(&mut self, byte: u8) -> Option<ConsoleCommand> {
        if self.awaiting_rate_digit {
            self.awaiting_rate_digit = false;
            return match byte {
                b'1' => Some(ConsoleCommand::SetSampleRate(100)),
                b'2' => Some(ConsoleCommand::SetSampleRate(200)),
                b'3' => Some(ConsoleCommand::SetSampleRate(400)),
                b'4' => Some(ConsoleCommand::SetSampleRate(800)),
                _ => {
                    log::warn!("Console: invalid rate digit, use s1-s4");
                    None
                }
            };
        }
        match byte {
            b'r' | b'R' => Some(ConsoleCommand::ResetPeak),
            b'c' | b'C' => Some(ConsoleCommand::ResetFilters),
            b's' | b'S' => {
                self.awaiting_rate_digit = true;
                None
            }
            b'?' => Some(ConsoleCommand::Status),
            _ => None,
        }
    }
}

/// Spawn the stdin reader thread and hand back the command channel.
///
/// The thread blocks in line reads, so at shutdown it may stay parked until
/// the process exits; it checks `running` between lines and stops on EOF.
pub fn spawn_stdin_reader(running: Arc<AtomicBool>) -> Result<Receiver<ConsoleCommand>> {
    let (tx, rx) = unbounded();
    thread::Builder::new()
        .name("console-reader".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            let mut parser = ConsoleParser::new();
            for line in stdin.lock().lines() {
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        log::debug!("Console: stdin read error: {}", e);
                        break;
                    }
                };
                // The terminator is part of the stream: a bare `s` cancels
                // at end of line instead of latching forever.
                for byte in line.bytes().chain(std::iter::once(b'\n')) {
                    if let Some(cmd) = parser.feed(byte) {
                        if tx.send(cmd).is_err() {
                            return;
                        }
                    }
                }
            }
            log::debug!("Console: stdin reader exiting");
        })?;
    Ok(rx)
}
