//! Rate-gated output sinks
//!
//! Each sink runs on its own elapsed-time cadence so none blocks another:
//! a stalled sink delays only itself, never the sample path.

mod display;
mod serial;

pub use display::{
    ConsoleDisplay, DISPLAY_INTERVAL_MS, Display, DisplayCall, DisplaySink, G_ZONE_CAUTION,
    G_ZONE_EXTREME, G_ZONE_HIGH, GAUGE_FULL_SCALE_G, MockDisplay,
};
pub use serial::SerialSink;

/// Elapsed-time gate.
///
/// Fires when at least `interval_ms` has passed since the previous firing;
/// an interval of 0 fires on every check. The first check always fires.
#[derive(Debug)]
pub struct Cadence {
    interval_ms: u32,
    last_fire_ms: Option<u32>,
}

impl Cadence {
    pub fn new(interval_ms: u32) -> Self {
        Self {
            interval_ms,
            last_fire_ms: None,
        }
    }

    /// Check and latch: true when due, recording `now_ms` as the firing.
    pub fn ready(&mut self, now_ms: u32) -> bool {
        let due = match self.last_fire_ms {
            None => true,
            Some(last) => now_ms.wrapping_sub(last) >= self.interval_ms,
        };
        if due {
            self.last_fire_ms = Some(now_ms);
        }
        due
    }

    /// Change the interval; takes effect at the next check.
    pub fn set_interval(&mut self, interval_ms: u32) {
        self.interval_ms = interval_ms;
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_check_fires() {
        let mut cadence = Cadence::new(50);
        assert!(cadence.ready(1234));
    }

    #[test]
    fn test_respects_interval() {
        let mut cadence = Cadence::new(50);
        assert!(cadence.ready(0));
        assert!(!cadence.ready(20));
        assert!(!cadence.ready(49));
        assert!(cadence.ready(50));
        assert!(!cadence.ready(99));
        assert!(cadence.ready(110));
    }

    #[test]
    fn test_zero_interval_always_fires() {
        let mut cadence = Cadence::new(0);
        for t in 0..5 {
            assert!(cadence.ready(t));
        }
    }

    #[test]
    fn test_interval_change_applies_next_check() {
        let mut cadence = Cadence::new(1000);
        assert!(cadence.ready(0));
        cadence.set_interval(10);
        assert!(!cadence.ready(5));
        assert!(cadence.ready(10));
    }

    #[test]
    fn test_wrapping_timestamps() {
        let mut cadence = Cadence::new(50);
        assert!(cadence.ready(u32::MAX - 10));
        // 30 ms elapsed across the wrap boundary
        assert!(!cadence.ready(19));
        // 60 ms elapsed across the wrap boundary
        assert!(cadence.ready(49));
    }
}
