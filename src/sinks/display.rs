//! Display fan-out
//!
//! The display collaborator owns rasterization; the sink decides when and
//! what to draw. Zone thresholds and full scale mirror the instrument's
//! gauge face.

use crate::error::Result;
use crate::sinks::Cadence;
use crate::types::{ConditionedSample, Screen, Settings};
use parking_lot::Mutex;
use std::sync::Arc;

/// Gauge refresh interval.
pub const DISPLAY_INTERVAL_MS: u32 = 50;

/// Zone boundaries in g, used for gauge coloring.
pub const G_ZONE_CAUTION: f32 = 10.0;
pub const G_ZONE_HIGH: f32 = 50.0;
pub const G_ZONE_EXTREME: f32 = 100.0;
/// Full-scale gauge deflection in g.
pub const GAUGE_FULL_SCALE_G: f32 = 200.0;

/// Display collaborator.
///
/// Rendering internals are out of scope; implementations receive snapshots
/// and draw however they like. `init` failure is fatal to startup.
pub trait Display: Send {
    fn init(&mut self) -> Result<()>;

    /// Boot banner, shown once after a successful `init`.
    fn show_splash(&mut self);

    /// Persistent error state (e.g. sensor absent).
    fn show_error(&mut self, message: &str);

    /// Clear and redraw static chrome for `screen` after a transition.
    fn prepare_for_screen_change(&mut self, screen: Screen);

    fn render_gauge(&mut self, sample: &ConditionedSample, timestamp_ms: u32);

    fn render_settings(&mut self, settings: &Settings, connected: bool);

    /// Drop the auto-ranged gauge maximum back to zero.
    fn reset_gauge_scale(&mut self);
}

/// Drives the display on its own cadence from the latest snapshots.
pub struct DisplaySink {
    display: Box<dyn Display>,
    cadence: Cadence,
}

impl DisplaySink {
    pub fn new(display: Box<dyn Display>, interval_ms: u32) -> Self {
        Self {
            display,
            cadence: Cadence::new(interval_ms),
        }
    }

    /// Initialize the panel and show the splash. Failure here aborts
    /// startup.
    pub fn init(&mut self) -> Result<()> {
        self.display.init()?;
        self.display.show_splash();
        Ok(())
    }

    pub fn show_error(&mut self, message: &str) {
        self.display.show_error(message);
    }

    pub fn reset_gauge_scale(&mut self) {
        self.display.reset_gauge_scale();
    }

    /// True when the refresh interval has elapsed; latches the firing.
    pub fn due(&mut self, now_ms: u32) -> bool {
        self.cadence.ready(now_ms)
    }

    /// Repaint for the current screen. `screen_changed` redraws static
    /// chrome first.
    pub fn render(
        &mut self,
        screen: Screen,
        screen_changed: bool,
        sample: &ConditionedSample,
        settings: &Settings,
        connected: bool,
        now_ms: u32,
    ) {
        if screen_changed {
            self.display.prepare_for_screen_change(screen);
        }
        match screen {
            Screen::Gauge => self.display.render_gauge(sample, now_ms),
            Screen::Settings => self.display.render_settings(settings, connected),
        }
    }
}

/// Zone label for a magnitude, per the gauge face thresholds.
fn zone_label(magnitude: f32) -> &'static str {
    if magnitude >= G_ZONE_EXTREME {
        "extreme"
    } else if magnitude >= G_ZONE_HIGH {
        "high"
    } else if magnitude >= G_ZONE_CAUTION {
        "caution"
    } else {
        "normal"
    }
}

/// Log-backed display for hardware-free runs.
///
/// Gauge frames land at trace level (they arrive at 20 Hz), screen
/// transitions at debug.
pub struct ConsoleDisplay {
    gauge_max: f32,
}

impl ConsoleDisplay {
    pub fn new() -> Self {
        Self { gauge_max: 0.0 }
    }
}

impl Default for ConsoleDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for ConsoleDisplay {
    fn init(&mut self) -> Result<()> {
        log::info!("Display: console renderer ready");
        Ok(())
    }

    fn show_splash(&mut self) {
        log::info!("Display: VegaIO v{}", env!("CARGO_PKG_VERSION"));
    }

    fn show_error(&mut self, message: &str) {
        log::error!("Display: {}", message);
    }

    fn prepare_for_screen_change(&mut self, screen: Screen) {
        log::debug!("Display: preparing {:?} screen", screen);
    }

    fn render_gauge(&mut self, sample: &ConditionedSample, timestamp_ms: u32) {
        if sample.magnitude > self.gauge_max {
            self.gauge_max = sample.magnitude.min(GAUGE_FULL_SCALE_G);
        }
        log::trace!(
            "Display: [{} ms] x={:.3} y={:.3} z={:.3} mag={:.3} peak={:.3} max={:.1} zone={}",
            timestamp_ms,
            sample.x,
            sample.y,
            sample.z,
            sample.magnitude,
            sample.peak,
            self.gauge_max,
            zone_label(sample.magnitude)
        );
    }

    fn render_settings(&mut self, settings: &Settings, connected: bool) {
        log::trace!(
            "Display: settings wireless={} serial={} link={}",
            settings.wireless_enabled,
            settings.serial_enabled,
            if connected { "connected" } else { "not connected" }
        );
    }

    fn reset_gauge_scale(&mut self) {
        self.gauge_max = 0.0;
        log::debug!("Display: gauge scale reset");
    }
}

/// One recorded call on a [`MockDisplay`].
#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCall {
    Splash,
    Error(String),
    Prepare(Screen),
    Gauge { magnitude: f32, peak: f32 },
    Settings { wireless: bool, serial: bool, connected: bool },
    ScaleReset,
}

#[derive(Default)]
struct MockDisplayInner {
    calls: Vec<DisplayCall>,
    fail_init: bool,
}

/// Recording display for tests; cloned handles share the call log.
#[derive(Clone, Default)]
pub struct MockDisplay {
    inner: Arc<Mutex<MockDisplayInner>>,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `init` fail, for startup-abort tests.
    pub fn set_fail_init(&self) {
        self.inner.lock().fail_init = true;
    }

    pub fn calls(&self) -> Vec<DisplayCall> {
        self.inner.lock().calls.clone()
    }

    pub fn scale_resets(&self) -> usize {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|call| **call == DisplayCall::ScaleReset)
            .count()
    }
}

impl Display for MockDisplay {
    fn init(&mut self) -> Result<()> {
        if self.inner.lock().fail_init {
            return Err(crate::error::Error::InitializationFailed(
                "display init".to_string(),
            ));
        }
        Ok(())
    }

    fn show_splash(&mut self) {
        self.inner.lock().calls.push(DisplayCall::Splash);
    }

    fn show_error(&mut self, message: &str) {
        self.inner
            .lock()
            .calls
            .push(DisplayCall::Error(message.to_string()));
    }

    fn prepare_for_screen_change(&mut self, screen: Screen) {
        self.inner.lock().calls.push(DisplayCall::Prepare(screen));
    }

    fn render_gauge(&mut self, sample: &ConditionedSample, _timestamp_ms: u32) {
        self.inner.lock().calls.push(DisplayCall::Gauge {
            magnitude: sample.magnitude,
            peak: sample.peak,
        });
    }

    fn render_settings(&mut self, settings: &Settings, connected: bool) {
        self.inner.lock().calls.push(DisplayCall::Settings {
            wireless: settings.wireless_enabled,
            serial: settings.serial_enabled,
            connected,
        });
    }

    fn reset_gauge_scale(&mut self) {
        self.inner.lock().calls.push(DisplayCall::ScaleReset);
    }
}
