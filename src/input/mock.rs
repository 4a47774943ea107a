//! Scriptable input sources for tests and hardware-free runs
//!
//! Cloned handles share state, so a test (or demo harness) can hold one
//! handle to script contact while the app polls through another.

use crate::input::{Button, TouchSurface};
use crate::types::TouchPoint;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct MockTouchInner {
    contact: Option<TouchPoint>,
}

/// Touch surface whose contact state is set externally. Idle by default.
#[derive(Clone, Default)]
pub struct MockTouch {
    inner: Arc<Mutex<MockTouchInner>>,
}

impl MockTouch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the current contact; `None` releases.
    pub fn set_contact(&self, contact: Option<TouchPoint>) {
        self.inner.lock().contact = contact;
    }
}

impl TouchSurface for MockTouch {
    fn poll(&mut self) -> Option<TouchPoint> {
        self.inner.lock().contact
    }
}

#[derive(Default)]
struct MockButtonInner {
    pressed: bool,
}

/// Button whose line state is set externally. Released by default.
#[derive(Clone, Default)]
pub struct MockButton {
    inner: Arc<Mutex<MockButtonInner>>,
}

impl MockButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_pressed(&self, pressed: bool) {
        self.inner.lock().pressed = pressed;
    }
}

impl Button for MockButton {
    fn is_pressed(&mut self) -> bool {
        self.inner.lock().pressed
    }
}
