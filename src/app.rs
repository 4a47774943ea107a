//! Application orchestration for the VegaIO daemon
//!
//! Wires the collaborators together and runs the cooperative control loop.
//! Every iteration handles, in order: sampling, user input, deferred UI
//! requests, console commands, link events, then the rate-gated sinks.
//! Nothing in the loop blocks; a slow sink only delays its own output.

use crate::clock::SampleClock;
use crate::config::AppConfig;
use crate::console::{self, ConsoleCommand};
use crate::drivers::{Accelerometer, SimulatedAccelerometer};
use crate::error::Result;
use crate::input::{Button, ButtonDebouncer, GestureEngine, MockButton, MockTouch, TouchSurface};
use crate::signal::SignalConditioner;
use crate::sinks::{Cadence, ConsoleDisplay, Display, DisplaySink, SerialSink};
use crate::telemetry::{MockLink, TelemetryCommand, TelemetryService, WirelessLink};
use crate::types::Settings;
use crate::ui::UiStateMachine;
use crossbeam_channel::Receiver;
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// External collaborators behind their trait boundaries, bundled so tests
/// and alternative backends can swap any of them.
pub struct Collaborators {
    pub sensor: Box<dyn Accelerometer>,
    pub touch: Box<dyn TouchSurface>,
    pub button: Box<dyn Button>,
    pub display: Box<dyn Display>,
    pub link: Box<dyn WirelessLink>,
    pub serial: SerialSink,
    pub console_rx: Receiver<ConsoleCommand>,
}

/// Main application structure that owns all components
pub struct VegaApp {
    started_at: Instant,
    clock: SampleClock,
    sensor: Box<dyn Accelerometer>,
    sensor_ok: bool,
    touch: Box<dyn TouchSurface>,
    button: Box<dyn Button>,
    debouncer: ButtonDebouncer,
    gestures: GestureEngine,
    conditioner: SignalConditioner,
    ui: UiStateMachine,
    display: DisplaySink,
    serial: SerialSink,
    telemetry: TelemetryService,
    data_cadence: Cadence,
    peak_cadence: Cadence,
    console_rx: Receiver<ConsoleCommand>,
    samples: u64,
    read_failures: u64,
    last_read_warn: Option<Instant>,
}

impl VegaApp {
    /// Create the app with the built-in simulated collaborators.
    ///
    /// The real panel, touch controller, and radio are external hardware;
    /// the daemon runs against their simulated stand-ins end to end.
    pub fn new(config: &AppConfig, running: &Arc<AtomicBool>) -> Result<Self> {
        let serial = if config.serial.port.is_empty() {
            SerialSink::stdout(0)
        } else {
            SerialSink::open_port(&config.serial.port, config.serial.baud, 0)?
        };
        let collaborators = Collaborators {
            sensor: Box::new(SimulatedAccelerometer::new(&config.sensor, 0)),
            touch: Box::new(MockTouch::new()),
            button: Box::new(MockButton::new()),
            display: Box::new(ConsoleDisplay::new()),
            link: Box::new(MockLink::new()),
            serial,
            console_rx: console::spawn_stdin_reader(Arc::clone(running))?,
        };
        Self::with_collaborators(config, collaborators)
    }

    /// Wire the app from explicit collaborators.
    ///
    /// Display init failure is fatal: the instrument is unusable without
    /// its panel. Sensor init failure is not: the UI stays alive showing
    /// an error, with sampling disabled for the process lifetime.
    pub fn with_collaborators(config: &AppConfig, collaborators: Collaborators) -> Result<Self> {
        info!("Initializing VegaIO application");

        let Collaborators {
            mut sensor,
            touch,
            button,
            display,
            link,
            serial,
            console_rx,
        } = collaborators;

        let mut display = DisplaySink::new(display, config.display.update_interval_ms);
        display.init()?;

        let sensor_ok = match sensor
            .init()
            .and_then(|_| sensor.set_output_rate(config.sampling.rate_hz))
        {
            Ok(()) => true,
            Err(e) => {
                error!("App: accelerometer init failed: {}", e);
                display.show_error("SENSOR NOT FOUND");
                false
            }
        };

        let clock = SampleClock::new(config.sampling.rate_hz)?;

        let ui = UiStateMachine::new(Settings {
            wireless_enabled: config.settings.wireless_enabled,
            serial_enabled: config.settings.serial_enabled,
        });

        let mut telemetry = TelemetryService::new(link, config.telemetry.notify_rate_hz);
        telemetry.set_enabled(config.settings.wireless_enabled)?;

        let data_cadence = Cadence::new(notify_interval_ms(telemetry.notify_rate_hz()));
        let peak_cadence = Cadence::new(config.telemetry.peak_interval_ms);

        info!("✓ Instrument core initialized");

        Ok(Self {
            started_at: Instant::now(),
            clock,
            sensor,
            sensor_ok,
            touch,
            button,
            debouncer: ButtonDebouncer::new(),
            gestures: GestureEngine::new(),
            conditioner: SignalConditioner::new(),
            ui,
            display,
            serial,
            telemetry,
            data_cadence,
            peak_cadence,
            console_rx,
            samples: 0,
            read_failures: 0,
            last_read_warn: None,
        })
    }

    /// Start the sample clock and run the control loop until `running`
    /// clears.
    pub fn run(&mut self, running: &Arc<AtomicBool>) -> Result<()> {
        self.clock.start()?;
        info!("Entering control loop ({} Hz sampling)", self.clock.rate_hz());
        info!("Press Ctrl+C to stop");

        let mut last_stats = Instant::now();
        while running.load(Ordering::Relaxed) {
            self.tick();

            if last_stats.elapsed().as_secs() >= 10 {
                self.log_statistics();
                last_stats = Instant::now();
            }

            // pace the loop well above the fastest sample rate
            std::thread::sleep(Duration::from_micros(500));
        }

        info!("Shutdown signal received");
        Ok(())
    }

    /// Run one loop iteration at the current time.
    pub fn tick(&mut self) {
        let now_ms = self.now_ms();
        self.tick_at(now_ms);
    }

    fn tick_at(&mut self, now_ms: u32) {
        // 1. Acquisition. A failed read skips this tick; the filters keep
        //    their previous state and the next tick tries again.
        if self.clock.take_tick() && self.sensor_ok {
            match self.sensor.read_sample() {
                Ok(raw) => {
                    let conditioned = self.conditioner.ingest(raw);
                    self.samples += 1;
                    if self.ui.settings().serial_enabled {
                        self.serial.emit(now_ms, &conditioned);
                    }
                }
                Err(e) => {
                    self.read_failures += 1;
                    let should_warn = self
                        .last_read_warn
                        .map_or(true, |last| last.elapsed() >= Duration::from_secs(1));
                    if should_warn {
                        warn!("App: sample read failed ({} total): {}", self.read_failures, e);
                        self.last_read_warn = Some(Instant::now());
                    }
                }
            }
        }

        // 2. User input, then bring the wireless service in line with the
        //    (possibly just toggled) settings flag.
        let pressed = self.button.is_pressed();
        if self.debouncer.update(pressed, now_ms) {
            self.ui.handle_button_press();
        }
        let contact = self.touch.poll();
        self.gestures.update(contact, now_ms);
        if let Some(event) = self.gestures.take_event() {
            self.ui.handle_touch(event);
        }
        if let Err(e) = self.telemetry.set_enabled(self.ui.settings().wireless_enabled) {
            warn!("App: telemetry state change failed: {}", e);
        }

        // 3. Deferred UI requests.
        if self.ui.take_peak_reset_request() {
            self.reset_peak("long press");
        }

        // 4. Console commands.
        while let Ok(command) = self.console_rx.try_recv() {
            self.apply_console_command(command);
        }

        // 5. Link events.
        match self.telemetry.poll_events() {
            Ok(commands) => {
                for command in commands {
                    match command {
                        TelemetryCommand::ResetPeak => self.reset_peak("remote command"),
                        TelemetryCommand::ResetFilters => self.reset_filters("remote command"),
                    }
                }
            }
            Err(e) => warn!("App: link event handling failed: {}", e),
        }

        // 6. Rate-gated sinks. The screen-change flag is consumed here and
        //    only here, when the display actually repaints.
        if self.display.due(now_ms) {
            let screen_changed = self.ui.screen_changed();
            let snapshot = self.conditioner.snapshot();
            let settings = self.ui.settings();
            self.display.render(
                self.ui.screen(),
                screen_changed,
                &snapshot,
                &settings,
                self.telemetry.is_connected(),
                now_ms,
            );
        }

        if self.sensor_ok && self.telemetry.is_connected() {
            self.data_cadence
                .set_interval(notify_interval_ms(self.telemetry.notify_rate_hz()));
            if self.data_cadence.ready(now_ms) {
                let snapshot = self.conditioner.snapshot();
                if let Err(e) = self.telemetry.notify_data(now_ms, &snapshot) {
                    warn!("App: data notification failed: {}", e);
                }
            }
            if self.peak_cadence.ready(now_ms) {
                if let Err(e) = self.telemetry.notify_peak(now_ms, self.conditioner.peak()) {
                    warn!("App: peak notification failed: {}", e);
                }
            }
        }
    }

    fn apply_console_command(&mut self, command: ConsoleCommand) {
        match command {
            ConsoleCommand::ResetPeak => self.reset_peak("console"),
            ConsoleCommand::ResetFilters => self.reset_filters("console"),
            ConsoleCommand::SetSampleRate(hz) => self.set_sample_rate(hz),
            ConsoleCommand::Status => {
                info!(
                    "App: rate {} Hz | commands: r=reset peak, c=reset filters, s1-s4=rate, ?=status",
                    self.clock.rate_hz()
                );
            }
        }
    }

    /// Zero the peak hold and drop the gauge back to its resting scale.
    fn reset_peak(&mut self, origin: &str) {
        self.conditioner.reset();
        self.display.reset_gauge_scale();
        info!("App: peak reset ({})", origin);
    }

    fn reset_filters(&mut self, origin: &str) {
        self.conditioner.full_reset();
        info!("App: filters reset ({})", origin);
    }

    /// Reprogram acquisition pacing. An unsupported rate is logged and the
    /// previous rate stays in effect.
    fn set_sample_rate(&mut self, hz: u32) {
        if let Err(e) = self.clock.set_rate(hz) {
            warn!("App: {}", e);
            return;
        }
        if self.sensor_ok {
            if let Err(e) = self.sensor.set_output_rate(hz) {
                warn!("App: sensor rate change failed: {}", e);
            }
        }
    }

    /// Milliseconds since app start; wraps after ~49.7 days.
    fn now_ms(&self) -> u32 {
        self.started_at.elapsed().as_millis() as u32
    }

    fn log_statistics(&self) {
        let counters = self.telemetry.counters();
        info!(
            "Stats: samples={} read_failures={} overruns={} link={:?} frames: data={} peak={} unknown_cmds={}",
            self.samples,
            self.read_failures,
            self.clock.overruns(),
            self.telemetry.state(),
            counters.data_frames_sent,
            counters.peak_frames_sent,
            counters.unknown_commands,
        );
    }
}

impl Drop for VegaApp {
    fn drop(&mut self) {
        debug!("VegaApp cleaning up...");
        if let Err(e) = self.telemetry.set_enabled(false) {
            error!("App: telemetry shutdown failed: {}", e);
        }
    }
}

/// Data notification interval for a rate in the clamped 5..=50 Hz range.
fn notify_interval_ms(rate_hz: u8) -> u32 {
    1000 / u32::from(rate_hz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::sinks::{DisplayCall, MockDisplay};
    use crate::telemetry::LinkEvent;
    use crate::types::{RawSample, TouchPoint};
    use crossbeam_channel::Sender;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::io::Write;

    /// Accelerometer that replays a fixed sample script; an exhausted
    /// script reads as a bus failure.
    struct ScriptedAccel {
        samples: VecDeque<RawSample>,
        fail_init: bool,
    }

    impl ScriptedAccel {
        fn with_samples(samples: &[RawSample]) -> Self {
            Self {
                samples: samples.iter().copied().collect(),
                fail_init: false,
            }
        }

        fn failing_init() -> Self {
            Self {
                samples: VecDeque::new(),
                fail_init: true,
            }
        }
    }

    impl Accelerometer for ScriptedAccel {
        fn init(&mut self) -> Result<()> {
            if self.fail_init {
                return Err(Error::InitializationFailed("scripted".to_string()));
            }
            Ok(())
        }

        fn read_sample(&mut self) -> Result<RawSample> {
            self.samples
                .pop_front()
                .ok_or_else(|| Error::Sensor("script exhausted".to_string()))
        }

        fn set_output_rate(&mut self, _hz: u32) -> Result<()> {
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl CaptureWriter {
        fn line_count(&self) -> usize {
            self.0.lock().iter().filter(|b| **b == b'\n').count()
        }
    }

    impl Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct Harness {
        app: VegaApp,
        touch: MockTouch,
        button: MockButton,
        display: MockDisplay,
        link: MockLink,
        console_tx: Sender<ConsoleCommand>,
        serial_out: CaptureWriter,
    }

    impl Harness {
        /// One scripted sample tick: raise the flag, then run the loop.
        fn sample_tick(&mut self, now_ms: u32) {
            self.app.clock.force_tick();
            self.app.tick_at(now_ms);
        }

        fn tap(&mut self, x: i32, y: i32, down_ms: u32) {
            self.touch.set_contact(Some(TouchPoint { x, y }));
            self.app.tick_at(down_ms);
            self.touch.set_contact(None);
            self.app.tick_at(down_ms + 100);
        }
    }

    fn test_config() -> AppConfig {
        AppConfig::gsensor_defaults()
    }

    fn harness_with(config: &AppConfig, sensor: ScriptedAccel) -> Harness {
        let touch = MockTouch::new();
        let button = MockButton::new();
        let display = MockDisplay::new();
        let link = MockLink::new();
        let serial_out = CaptureWriter::default();
        let (console_tx, console_rx) = crossbeam_channel::unbounded();
        let app = VegaApp::with_collaborators(
            config,
            Collaborators {
                sensor: Box::new(sensor),
                touch: Box::new(touch.clone()),
                button: Box::new(button.clone()),
                display: Box::new(display.clone()),
                link: Box::new(link.clone()),
                serial: SerialSink::with_writer(Box::new(serial_out.clone()), 0),
                console_rx,
            },
        )
        .unwrap();
        Harness {
            app,
            touch,
            button,
            display,
            link,
            console_tx,
            serial_out,
        }
    }

    fn harness(sensor: ScriptedAccel) -> Harness {
        harness_with(&test_config(), sensor)
    }

    fn resting(n: usize) -> Vec<RawSample> {
        vec![RawSample::new(0.0, 0.0, 1.0); n]
    }

    #[test]
    fn test_sample_path_converges() {
        let mut h = harness(ScriptedAccel::with_samples(&resting(10)));
        for i in 0..10 {
            h.sample_tick(i * 10);
        }
        let out = h.app.conditioner.snapshot();
        assert_eq!(h.app.samples, 10);
        assert!((out.z - 1.0).abs() < 1e-6);
        assert!((out.magnitude - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_step_response_through_full_pipeline() {
        let mut script = resting(10);
        script.push(RawSample::new(0.0, 0.0, 50.0));
        let mut h = harness(ScriptedAccel::with_samples(&script));
        for i in 0..11 {
            h.sample_tick(i * 10);
        }
        let out = h.app.conditioner.snapshot();
        // one window slot replaced: (9 * 1.0 + 50.0) / 10
        assert!((out.z - 5.9).abs() < 1e-5);
        assert!((out.peak - 5.9).abs() < 1e-5);
    }

    #[test]
    fn test_serial_csv_line_per_accepted_sample() {
        let mut h = harness(ScriptedAccel::with_samples(&resting(3)));
        for i in 0..3 {
            h.sample_tick(i * 10);
        }
        assert_eq!(h.serial_out.line_count(), 3);
        // no clock tick, no sample, no line
        h.app.tick_at(40);
        assert_eq!(h.serial_out.line_count(), 3);
    }

    #[test]
    fn test_serial_disabled_emits_nothing() {
        let mut config = test_config();
        config.settings.serial_enabled = false;
        let mut h = harness_with(&config, ScriptedAccel::with_samples(&resting(3)));
        for i in 0..3 {
            h.sample_tick(i * 10);
        }
        assert_eq!(h.app.samples, 3);
        assert_eq!(h.serial_out.line_count(), 0);
    }

    #[test]
    fn test_read_failure_skips_tick() {
        let mut h = harness(ScriptedAccel::with_samples(&[RawSample::new(0.0, 0.0, 2.0)]));
        h.sample_tick(0);
        assert_eq!(h.app.samples, 1);
        let before = h.app.conditioner.snapshot();

        // script exhausted: the read fails and the tick is skipped
        h.sample_tick(10);
        assert_eq!(h.app.samples, 1);
        assert_eq!(h.app.read_failures, 1);
        assert_eq!(h.app.conditioner.snapshot(), before);
    }

    #[test]
    fn test_sensor_init_failure_keeps_ui_alive() {
        let mut h = harness(ScriptedAccel::failing_init());
        assert!(!h.app.sensor_ok);
        assert!(h
            .display
            .calls()
            .contains(&DisplayCall::Error("SENSOR NOT FOUND".to_string())));

        // ticks do not attempt reads
        h.sample_tick(0);
        assert_eq!(h.app.samples, 0);
        assert_eq!(h.app.read_failures, 0);

        // input still works
        h.button.set_pressed(true);
        h.app.tick_at(250);
        assert_eq!(h.app.ui.screen(), crate::types::Screen::Settings);
    }

    #[test]
    fn test_button_toggles_screen_and_repaints() {
        let mut h = harness(ScriptedAccel::with_samples(&[]));
        h.button.set_pressed(true);
        h.app.tick_at(250);
        assert_eq!(h.app.ui.screen(), crate::types::Screen::Settings);
        assert!(h
            .display
            .calls()
            .contains(&DisplayCall::Prepare(crate::types::Screen::Settings)));

        h.button.set_pressed(false);
        h.app.tick_at(600);
        h.button.set_pressed(true);
        h.app.tick_at(900);
        assert_eq!(h.app.ui.screen(), crate::types::Screen::Gauge);
    }

    #[test]
    fn test_long_press_resets_peak_and_gauge_scale() {
        let mut h = harness(ScriptedAccel::with_samples(&[RawSample::new(0.0, 0.0, 5.0)]));
        h.sample_tick(0);
        assert!((h.app.conditioner.peak() - 5.0).abs() < 1e-6);

        h.touch.set_contact(Some(TouchPoint { x: 120, y: 120 }));
        h.app.tick_at(2000);
        h.touch.set_contact(None);
        h.app.tick_at(2600);

        assert_eq!(h.app.conditioner.peak(), 0.0);
        assert_eq!(h.display.scale_resets(), 1);
        assert_eq!(h.app.ui.screen(), crate::types::Screen::Gauge);
    }

    #[test]
    fn test_settings_tap_disables_wireless_service() {
        let mut h = harness(ScriptedAccel::with_samples(&[]));
        assert!(h.link.is_advertising());

        // gauge tap opens settings, then the wireless row toggles off
        h.tap(120, 80, 1000);
        assert_eq!(h.app.ui.screen(), crate::types::Screen::Settings);
        h.tap(120, 80, 1400);

        assert!(!h.app.ui.settings().wireless_enabled);
        assert!(!h.app.telemetry.is_enabled());
        assert!(!h.link.is_advertising());
    }

    #[test]
    fn test_remote_commands_reset_peak_and_filters() {
        let mut h = harness(ScriptedAccel::with_samples(&[RawSample::new(3.0, 0.0, 4.0)]));
        h.sample_tick(0);
        assert!((h.app.conditioner.peak() - 5.0).abs() < 1e-6);

        h.link.inject_event(LinkEvent::Connected);
        h.link.inject_event(LinkEvent::CommandWrite(0x01));
        h.app.tick_at(100);
        assert_eq!(h.app.conditioner.peak(), 0.0);
        assert_eq!(h.display.scale_resets(), 1);

        h.link.inject_event(LinkEvent::CommandWrite(0x02));
        h.app.tick_at(200);
        assert_eq!(
            h.app.conditioner.snapshot(),
            crate::types::ConditionedSample::default()
        );
    }

    #[test]
    fn test_connected_notifications_and_rate_config() {
        let mut h = harness(ScriptedAccel::with_samples(&resting(1)));
        h.sample_tick(0);

        h.link.inject_event(LinkEvent::Connected);
        h.app.tick_at(5000);
        // first connected tick fires both cadences
        let data = h.link.data_frames();
        let peaks = h.link.peak_frames();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].len(), 20);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].len(), 8);

        // notify interval not elapsed: nothing new
        h.app.tick_at(5001);
        assert_eq!(h.link.data_frames().len(), 1);

        // out-of-range rate write clamps to 50 Hz -> 20 ms interval
        h.link.inject_event(LinkEvent::ConfigWrite(200));
        h.app.tick_at(5002);
        assert_eq!(h.app.telemetry.notify_rate_hz(), 50);
        assert_eq!(h.app.data_cadence.interval_ms(), 20);
        h.app.tick_at(5021);
        assert_eq!(h.link.data_frames().len(), 2);
    }

    #[test]
    fn test_disconnect_stops_notifications() {
        let mut h = harness(ScriptedAccel::with_samples(&resting(1)));
        h.sample_tick(0);
        h.link.inject_event(LinkEvent::Connected);
        h.app.tick_at(1000);
        assert_eq!(h.link.data_frames().len(), 1);

        h.link.inject_event(LinkEvent::Disconnected);
        h.app.tick_at(1100);
        h.app.tick_at(1200);
        // back to advertising, no further frames
        assert!(h.link.is_advertising());
        assert_eq!(h.link.data_frames().len(), 1);
    }

    #[test]
    fn test_console_commands_apply() {
        let mut h = harness(ScriptedAccel::with_samples(&resting(1)));
        h.sample_tick(0);

        h.console_tx.send(ConsoleCommand::SetSampleRate(400)).unwrap();
        h.app.tick_at(100);
        assert_eq!(h.app.clock.rate_hz(), 400);

        h.console_tx.send(ConsoleCommand::ResetPeak).unwrap();
        h.app.tick_at(200);
        assert_eq!(h.app.conditioner.peak(), 0.0);
        assert_eq!(h.display.scale_resets(), 1);
    }

    #[test]
    fn test_wireless_disabled_config_starts_idle() {
        let mut config = test_config();
        config.settings.wireless_enabled = false;
        let h = harness_with(&config, ScriptedAccel::with_samples(&[]));
        assert!(!h.app.telemetry.is_enabled());
        assert!(!h.link.is_advertising());
    }
}
