//! Hard button debouncing

/// Minimum interval between accepted state transitions.
pub const BUTTON_DEBOUNCE_MS: u32 = 200;

/// Debounces the raw button line and reports accepted press edges.
///
/// State changes arriving within [`BUTTON_DEBOUNCE_MS`] of the previous
/// accepted change are treated as contact bounce and ignored. Release
/// edges are absorbed; only a press edge is reported.
pub struct ButtonDebouncer {
    stable_pressed: bool,
    last_change_ms: u32,
}

impl ButtonDebouncer {
    pub fn new() -> Self {
        Self {
            stable_pressed: false,
            last_change_ms: 0,
        }
    }

    /// Sample the raw line state. Returns true when a press edge is
    /// accepted.
    pub fn update(&mut self, pressed: bool, now_ms: u32) -> bool {
        if pressed == self.stable_pressed {
            return false;
        }
        if now_ms.wrapping_sub(self.last_change_ms) < BUTTON_DEBOUNCE_MS {
            return false;
        }
        self.stable_pressed = pressed;
        self.last_change_ms = now_ms;
        if pressed {
            log::debug!("Button: press accepted at {} ms", now_ms);
        }
        pressed
    }

    pub fn is_pressed(&self) -> bool {
        self.stable_pressed
    }
}

impl Default for ButtonDebouncer {
    fn default() -> Self {
        Self::new()
    }
}
