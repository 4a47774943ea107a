//! Two-screen UI state machine
//!
//! `Gauge` is the primary live view; `Settings` exposes the feature
//! toggles. Gestures drive transitions; the hard button toggles screens
//! unconditionally. Settings-screen taps dispatch through a static
//! hit-region table (240x240 panel layout).

use crate::types::{Gesture, Screen, Settings, TouchEvent};

/// Action bound to a settings-screen hit region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionAction {
    ToggleWireless,
    ToggleSerial,
    Back,
}

/// Rectangular touch target; bounds are inclusive.
#[derive(Debug, Clone, Copy)]
pub struct HitRegion {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub action: RegionAction,
}

impl HitRegion {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32, action: RegionAction) -> Self {
        Self { x1, y1, x2, y2, action }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}

/// Settings-screen touch targets.
pub const SETTINGS_REGIONS: [HitRegion; 3] = [
    HitRegion::new(30, 60, 210, 100, RegionAction::ToggleWireless),
    HitRegion::new(30, 110, 210, 150, RegionAction::ToggleSerial),
    HitRegion::new(70, 195, 170, 230, RegionAction::Back),
];

/// Owns the active screen and the user-toggleable feature flags.
pub struct UiStateMachine {
    screen: Screen,
    settings: Settings,
    screen_changed: bool,
    peak_reset_requested: bool,
}

impl UiStateMachine {
    pub fn new(settings: Settings) -> Self {
        Self {
            screen: Screen::Gauge,
            settings,
            screen_changed: false,
            peak_reset_requested: false,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    /// Apply a classified touch event to the current screen.
    pub fn handle_touch(&mut self, event: TouchEvent) {
        match (self.screen, event.gesture) {
            (_, Gesture::None) => {}
            (Screen::Gauge, Gesture::Tap) => self.set_screen(Screen::Settings),
            (Screen::Gauge, Gesture::LongPress) => {
                log::info!("Ui: peak reset requested");
                self.peak_reset_requested = true;
            }
            (Screen::Settings, Gesture::Tap) => self.dispatch_settings_tap(event.x, event.y),
            (Screen::Settings, Gesture::LongPress) => {}
        }
    }

    fn dispatch_settings_tap(&mut self, x: i32, y: i32) {
        let action = SETTINGS_REGIONS
            .iter()
            .find(|region| region.contains(x, y))
            .map(|region| region.action);
        match action {
            Some(RegionAction::ToggleWireless) => {
                self.settings.wireless_enabled = !self.settings.wireless_enabled;
                log::info!(
                    "Ui: wireless telemetry {}",
                    if self.settings.wireless_enabled { "enabled" } else { "disabled" }
                );
            }
            Some(RegionAction::ToggleSerial) => {
                self.settings.serial_enabled = !self.settings.serial_enabled;
                log::info!(
                    "Ui: serial output {}",
                    if self.settings.serial_enabled { "enabled" } else { "disabled" }
                );
            }
            // back button and tap-to-dismiss both return to the gauge
            Some(RegionAction::Back) | None => self.set_screen(Screen::Gauge),
        }
    }

    /// Hard button: toggles the screen regardless of state.
    pub fn handle_button_press(&mut self) {
        let next = match self.screen {
            Screen::Gauge => Screen::Settings,
            Screen::Settings => Screen::Gauge,
        };
        self.set_screen(next);
    }

    fn set_screen(&mut self, next: Screen) {
        if next != self.screen {
            self.screen = next;
            self.screen_changed = true;
            log::debug!("Ui: screen -> {:?}", next);
        }
    }

    /// True exactly once after each transition, then false until the next
    /// one. Sinks use this to repaint static chrome from scratch.
    pub fn screen_changed(&mut self) -> bool {
        std::mem::take(&mut self.screen_changed)
    }

    /// One-shot flag set by a long press on the gauge screen; consuming it
    /// clears it.
    pub fn take_peak_reset_request(&mut self) -> bool {
        std::mem::take(&mut self.peak_reset_requested)
    }
}
