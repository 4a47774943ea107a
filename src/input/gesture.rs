//! Touch gesture classification
//!
//! Contact transitions are tracked per poll; classification happens once,
//! on release, from the contact duration:
//!
//! | Duration | Result |
//! |----------|--------|
//! | < 50 ms | discarded as noise |
//! | 50-499 ms | `Tap` |
//! | >= 500 ms | `LongPress` |
//!
//! The nominal tap window ends at 300 ms; releases in the 300-499 ms band
//! fall back to `Tap` rather than a separate hold gesture, since intent in
//! that band is ambiguous. Both boundaries are deterministic: exactly
//! 300 ms is a `Tap`, exactly 500 ms is a `LongPress`.

use crate::types::{Gesture, TouchEvent, TouchPoint};

/// Contacts shorter than this are classified as noise.
pub const TOUCH_NOISE_MAX_MS: u32 = 50;
/// Contacts at least this long classify as a long press.
pub const TOUCH_LONG_PRESS_MS: u32 = 500;

/// Classifies raw contact transitions into gestures.
///
/// One pending event slot: an unconsumed event is silently overwritten by
/// the next completed gesture. There is no queueing.
pub struct GestureEngine {
    touching: bool,
    start_ms: u32,
    last_x: i32,
    last_y: i32,
    pending: Option<TouchEvent>,
}

impl GestureEngine {
    pub fn new() -> Self {
        Self {
            touching: false,
            start_ms: 0,
            last_x: 0,
            last_y: 0,
            pending: None,
        }
    }

    /// Feed the current contact state.
    ///
    /// Contact start latches the position and start time; continued contact
    /// updates the position only; release classifies and stores the event.
    pub fn update(&mut self, contact: Option<TouchPoint>, now_ms: u32) {
        match (self.touching, contact) {
            (false, Some(point)) => {
                self.touching = true;
                self.start_ms = now_ms;
                self.last_x = point.x;
                self.last_y = point.y;
            }
            (true, Some(point)) => {
                self.last_x = point.x;
                self.last_y = point.y;
            }
            (true, None) => {
                self.touching = false;
                self.classify_release(now_ms);
            }
            (false, None) => {}
        }
    }

    fn classify_release(&mut self, now_ms: u32) {
        let duration = now_ms.wrapping_sub(self.start_ms);
        if duration < TOUCH_NOISE_MAX_MS {
            log::trace!("Gesture: {} ms contact dropped as noise", duration);
            return;
        }
        let gesture = if duration >= TOUCH_LONG_PRESS_MS {
            Gesture::LongPress
        } else {
            Gesture::Tap
        };
        log::debug!(
            "Gesture: {:?} ({} ms) at ({}, {})",
            gesture,
            duration,
            self.last_x,
            self.last_y
        );
        self.pending = Some(TouchEvent {
            gesture,
            x: self.last_x,
            y: self.last_y,
            timestamp_ms: now_ms,
        });
    }

    /// Consume the pending event, if any.
    pub fn take_event(&mut self) -> Option<TouchEvent> {
        self.pending.take()
    }

    pub fn is_touching(&self) -> bool {
        self.touching
    }
}

impl Default for GestureEngine {
    fn default() -> Self {
        Self::new()
    }
}
