//! User input and UI state types

/// Gesture classification outcome.
///
/// `None` is a valid classification (e.g. a contact discarded as noise);
/// the UI state machine treats it as "no transition".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    None,
    Tap,
    LongPress,
}

/// Current touch contact position on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: i32,
    pub y: i32,
}

/// A classified touch gesture, produced on contact release.
///
/// Transient: buffered in a single slot and consumed at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchEvent {
    pub gesture: Gesture,
    /// Last contact position before release
    pub x: i32,
    pub y: i32,
    /// Release time, ms since app start
    pub timestamp_ms: u32,
}

/// User-toggleable feature flags.
///
/// Mutated only by the UI state machine; reverts to configured defaults on
/// restart (runtime changes are never persisted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub wireless_enabled: bool,
    pub serial_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wireless_enabled: true,
            serial_enabled: true,
        }
    }
}

/// Active display screen, owned by the UI state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Gauge,
    Settings,
}
