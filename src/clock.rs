//! Sample clock
//!
//! Stands in for the hardware timer that paces acquisition. A dedicated
//! thread runs a deadline-based loop and raises an atomic flag once per
//! period; the control loop consumes the flag with [`SampleClock::take_tick`],
//! which clears it in the same operation so a tick is never processed twice.
//!
//! The rate can be reprogrammed while the thread runs. The new period is
//! picked up at the next tick boundary; no restart is needed. A rate outside
//! the supported set is rejected and the previous rate stays in effect.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Output data rates the acquisition path supports, in Hz.
pub const SUPPORTED_SAMPLE_RATES: [u32; 4] = [100, 200, 400, 800];

/// Periodic tick source backed by a named timer thread.
pub struct SampleClock {
    flag: Arc<AtomicBool>,
    period_ns: Arc<AtomicU64>,
    running: Arc<AtomicBool>,
    overruns: Arc<AtomicU32>,
    rate_hz: u32,
    handle: Option<thread::JoinHandle<()>>,
}

impl SampleClock {
    /// Create a stopped clock at the given rate.
    pub fn new(rate_hz: u32) -> Result<Self> {
        if !SUPPORTED_SAMPLE_RATES.contains(&rate_hz) {
            return Err(Error::UnsupportedSampleRate(rate_hz));
        }
        Ok(Self {
            flag: Arc::new(AtomicBool::new(false)),
            period_ns: Arc::new(AtomicU64::new(period_ns_for(rate_hz))),
            running: Arc::new(AtomicBool::new(false)),
            overruns: Arc::new(AtomicU32::new(0)),
            rate_hz,
            handle: None,
        })
    }

    /// Spawn the timer thread. Calling on a running clock is a no-op.
    pub fn start(&mut self) -> Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }
        self.running.store(true, Ordering::Relaxed);

        let flag = Arc::clone(&self.flag);
        let period_ns = Arc::clone(&self.period_ns);
        let running = Arc::clone(&self.running);
        let overruns = Arc::clone(&self.overruns);

        let handle = thread::Builder::new()
            .name("sample-clock".to_string())
            .spawn(move || tick_loop(running, flag, period_ns, overruns))?;
        self.handle = Some(handle);

        log::info!("Clock: started at {} Hz", self.rate_hz);
        Ok(())
    }

    /// Reprogram the tick rate.
    ///
    /// Takes effect at the next tick boundary. An unsupported rate returns
    /// an error and leaves the previous rate running.
    pub fn set_rate(&mut self, rate_hz: u32) -> Result<()> {
        if !SUPPORTED_SAMPLE_RATES.contains(&rate_hz) {
            return Err(Error::UnsupportedSampleRate(rate_hz));
        }
        self.rate_hz = rate_hz;
        self.period_ns
            .store(period_ns_for(rate_hz), Ordering::Relaxed);
        log::info!("Clock: rate set to {} Hz", rate_hz);
        Ok(())
    }

    /// Consume a pending tick. Clears the flag in the same atomic swap, so
    /// each tick is observed exactly once.
    pub fn take_tick(&self) -> bool {
        self.flag.swap(false, Ordering::Relaxed)
    }

    /// Raise the tick flag immediately, bypassing the timer.
    pub fn force_tick(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn rate_hz(&self) -> u32 {
        self.rate_hz
    }

    /// Ticks whose deadline had already passed when the timer woke up.
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }
}

impl Drop for SampleClock {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn period_ns_for(rate_hz: u32) -> u64 {
    1_000_000_000 / u64::from(rate_hz)
}

/// Deadline-based pacing: each iteration schedules the next wakeup relative
/// to the previous deadline, not to "now", so jitter does not accumulate.
/// When the loop falls behind it realigns to the current time instead of
/// bursting to catch up.
fn tick_loop(
    running: Arc<AtomicBool>,
    flag: Arc<AtomicBool>,
    period_ns: Arc<AtomicU64>,
    overruns: Arc<AtomicU32>,
) {
    let mut next = Instant::now();
    while running.load(Ordering::Relaxed) {
        next += Duration::from_nanos(period_ns.load(Ordering::Relaxed));
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        } else {
            overruns.fetch_add(1, Ordering::Relaxed);
            next = now;
        }
        flag.store(true, Ordering::Relaxed);
    }
}
