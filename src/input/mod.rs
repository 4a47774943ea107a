//! User input: touch gesture classification and button debouncing
//!
//! The physical touch panel and hard button are external collaborators
//! behind the [`TouchSurface`] and [`Button`] traits; the engines here turn
//! their raw state into discrete events for the UI state machine.

mod button;
mod gesture;
mod mock;

pub use button::{BUTTON_DEBOUNCE_MS, ButtonDebouncer};
pub use gesture::{GestureEngine, TOUCH_LONG_PRESS_MS, TOUCH_NOISE_MAX_MS};
pub use mock::{MockButton, MockTouch};

use crate::types::TouchPoint;

/// Touch panel collaborator: reports the current contact, if any.
pub trait TouchSurface: Send {
    /// Current contact position, or `None` when the panel is untouched.
    fn poll(&mut self) -> Option<TouchPoint>;
}

/// Hard button collaborator: reports the raw (undebounced) line state.
pub trait Button: Send {
    fn is_pressed(&mut self) -> bool;
}
