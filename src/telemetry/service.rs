//! Wireless service lifecycle and dispatch
//!
//! Owns the connection state machine, gates notifications on it, and turns
//! inbound characteristic writes into commands for the orchestrator.
//! Notifications while not connected are silently skipped, never errors.

use crate::error::Result;
use crate::telemetry::frames::{self, CommandId, NOTIFY_RATE_DEFAULT_HZ, clamp_notify_rate};
use crate::telemetry::link::{LinkEvent, WirelessLink};
use crate::types::ConditionedSample;

/// Link connection lifecycle.
///
/// `Idle` until the service is enabled; `Advertising` while waiting for a
/// peer; `Connected` while one is attached. Disconnects fall back to
/// `Advertising` (auto re-advertise) unless the service was disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Idle,
    Advertising,
    Connected,
}

/// Commands surfaced to the orchestrator from inbound control writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelemetryCommand {
    ResetPeak,
    ResetFilters,
}

/// Counters for the periodic statistics log.
#[derive(Debug, Default)]
pub struct TelemetryCounters {
    pub data_frames_sent: u64,
    pub peak_frames_sent: u64,
    pub unknown_commands: u64,
    pub connects: u64,
    pub disconnects: u64,
}

/// Wireless telemetry service over an abstract link.
pub struct TelemetryService {
    link: Box<dyn WirelessLink>,
    state: ConnectionState,
    enabled: bool,
    notify_rate_hz: u8,
    counters: TelemetryCounters,
}

impl TelemetryService {
    pub fn new(link: Box<dyn WirelessLink>, notify_rate_hz: u8) -> Self {
        Self {
            link,
            state: ConnectionState::Idle,
            enabled: false,
            notify_rate_hz: clamp_notify_rate(notify_rate_hz),
            counters: TelemetryCounters::default(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Active notification rate in Hz.
    pub fn notify_rate_hz(&self) -> u8 {
        self.notify_rate_hz
    }

    pub fn counters(&self) -> &TelemetryCounters {
        &self.counters
    }

    /// Enable or disable the service. No-change calls are no-ops.
    ///
    /// Disabling stops advertising, drops any connection, and discards
    /// protocol state (the notify rate reverts to its default); a later
    /// enable starts over from `Advertising`.
    pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
        if enabled == self.enabled {
            return Ok(());
        }
        self.enabled = enabled;
        if enabled {
            self.link.start_advertising()?;
            self.state = ConnectionState::Advertising;
            log::info!("Telemetry: enabled, advertising");
        } else {
            self.link.stop()?;
            self.state = ConnectionState::Idle;
            self.notify_rate_hz = NOTIFY_RATE_DEFAULT_HZ;
            log::info!("Telemetry: disabled");
        }
        Ok(())
    }

    /// Drain pending link events, returning any surfaced commands in
    /// arrival order.
    pub fn poll_events(&mut self) -> Result<Vec<TelemetryCommand>> {
        let mut commands = Vec::new();
        while let Some(event) = self.link.poll_event() {
            if let Some(command) = self.process_event(event)? {
                commands.push(command);
            }
        }
        Ok(commands)
    }

    /// Apply one link event; control writes surface as commands.
    pub fn process_event(&mut self, event: LinkEvent) -> Result<Option<TelemetryCommand>> {
        match event {
            LinkEvent::Connected => {
                self.state = ConnectionState::Connected;
                self.counters.connects += 1;
                log::info!("Telemetry: client connected");
                Ok(None)
            }
            LinkEvent::Disconnected => {
                self.counters.disconnects += 1;
                if self.enabled {
                    // auto re-advertise so the peer can come back
                    self.link.start_advertising()?;
                    self.state = ConnectionState::Advertising;
                    log::info!("Telemetry: client disconnected, advertising");
                } else {
                    self.state = ConnectionState::Idle;
                    log::info!("Telemetry: client disconnected");
                }
                Ok(None)
            }
            LinkEvent::CommandWrite(byte) => match CommandId::from_byte(byte) {
                Some(CommandId::ResetPeak) => Ok(Some(TelemetryCommand::ResetPeak)),
                Some(CommandId::ResetFilters) => Ok(Some(TelemetryCommand::ResetFilters)),
                None => {
                    self.counters.unknown_commands += 1;
                    log::debug!("Telemetry: ignoring unknown command byte {:#04x}", byte);
                    Ok(None)
                }
            },
            LinkEvent::ConfigWrite(byte) => {
                let clamped = clamp_notify_rate(byte);
                if clamped != byte {
                    log::debug!("Telemetry: rate {} Hz out of range, clamped to {}", byte, clamped);
                }
                self.notify_rate_hz = clamped;
                log::info!("Telemetry: notification rate set to {} Hz", clamped);
                Ok(None)
            }
        }
    }

    /// Send a data notification. Skipped silently unless connected.
    pub fn notify_data(&mut self, timestamp_ms: u32, sample: &ConditionedSample) -> Result<()> {
        if self.state != ConnectionState::Connected {
            return Ok(());
        }
        let frame = frames::encode_data_frame(timestamp_ms, sample);
        self.link.notify_data(&frame)?;
        self.counters.data_frames_sent += 1;
        Ok(())
    }

    /// Send a peak notification. Skipped silently unless connected.
    pub fn notify_peak(&mut self, timestamp_ms: u32, peak: f32) -> Result<()> {
        if self.state != ConnectionState::Connected {
            return Ok(());
        }
        let frame = frames::encode_peak_frame(timestamp_ms, peak);
        self.link.notify_peak(&frame)?;
        self.counters.peak_frames_sent += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::link::MockLink;

    fn service_with_mock() -> (TelemetryService, MockLink) {
        let control = MockLink::new();
        let service = TelemetryService::new(Box::new(control.clone()), NOTIFY_RATE_DEFAULT_HZ);
        (service, control)
    }

    #[test]
    fn test_starts_idle() {
        let (service, control) = service_with_mock();
        assert_eq!(service.state(), ConnectionState::Idle);
        assert!(!service.is_connected());
        assert!(!control.is_advertising());
    }

    #[test]
    fn test_enable_starts_advertising() {
        let (mut service, control) = service_with_mock();
        service.set_enabled(true).unwrap();
        assert_eq!(service.state(), ConnectionState::Advertising);
        assert!(control.is_advertising());
        // enabling again is a no-op
        service.set_enabled(true).unwrap();
        assert_eq!(service.state(), ConnectionState::Advertising);
    }

    #[test]
    fn test_connect_disconnect_readvertises() {
        let (mut service, control) = service_with_mock();
        service.set_enabled(true).unwrap();
        service.process_event(LinkEvent::Connected).unwrap();
        assert_eq!(service.state(), ConnectionState::Connected);
        service.process_event(LinkEvent::Disconnected).unwrap();
        assert_eq!(service.state(), ConnectionState::Advertising);
        assert!(control.is_advertising());
        assert_eq!(service.counters().connects, 1);
        assert_eq!(service.counters().disconnects, 1);
    }

    #[test]
    fn test_disable_goes_idle_and_discards_state() {
        let (mut service, control) = service_with_mock();
        service.set_enabled(true).unwrap();
        service.process_event(LinkEvent::Connected).unwrap();
        service.process_event(LinkEvent::ConfigWrite(40)).unwrap();
        assert_eq!(service.notify_rate_hz(), 40);

        service.set_enabled(false).unwrap();
        assert_eq!(service.state(), ConnectionState::Idle);
        assert!(!control.is_advertising());
        // protocol state discarded: rate back at default
        assert_eq!(service.notify_rate_hz(), NOTIFY_RATE_DEFAULT_HZ);
    }

    #[test]
    fn test_disconnect_while_disabled_goes_idle() {
        let (mut service, _control) = service_with_mock();
        service.set_enabled(true).unwrap();
        service.process_event(LinkEvent::Connected).unwrap();
        service.set_enabled(false).unwrap();
        // a straggling disconnect event must not re-advertise
        service.process_event(LinkEvent::Disconnected).unwrap();
        assert_eq!(service.state(), ConnectionState::Idle);
    }

    #[test]
    fn test_notify_noop_unless_connected() {
        let (mut service, control) = service_with_mock();
        let sample = ConditionedSample::default();

        service.notify_data(0, &sample).unwrap();
        service.set_enabled(true).unwrap();
        service.notify_data(1, &sample).unwrap();
        service.notify_peak(1, 0.0).unwrap();
        assert!(control.data_frames().is_empty());
        assert!(control.peak_frames().is_empty());
        assert_eq!(service.counters().data_frames_sent, 0);

        // active immediately upon connect
        service.process_event(LinkEvent::Connected).unwrap();
        service.notify_data(2, &sample).unwrap();
        service.notify_peak(2, 1.5).unwrap();
        assert_eq!(control.data_frames().len(), 1);
        assert_eq!(control.peak_frames().len(), 1);
        assert_eq!(service.counters().data_frames_sent, 1);
        assert_eq!(service.counters().peak_frames_sent, 1);
    }

    #[test]
    fn test_command_writes_surface_as_commands() {
        let (mut service, control) = service_with_mock();
        service.set_enabled(true).unwrap();
        control.inject_event(LinkEvent::Connected);
        control.inject_event(LinkEvent::CommandWrite(0x01));
        control.inject_event(LinkEvent::CommandWrite(0x02));
        let commands = service.poll_events().unwrap();
        assert_eq!(
            commands,
            vec![TelemetryCommand::ResetPeak, TelemetryCommand::ResetFilters]
        );
    }

    #[test]
    fn test_unknown_command_ignored_and_counted() {
        let (mut service, _control) = service_with_mock();
        service.set_enabled(true).unwrap();
        let command = service.process_event(LinkEvent::CommandWrite(0x7F)).unwrap();
        assert_eq!(command, None);
        assert_eq!(service.counters().unknown_commands, 1);
    }

    #[test]
    fn test_config_write_clamps() {
        let (mut service, _control) = service_with_mock();
        service.set_enabled(true).unwrap();
        service.process_event(LinkEvent::ConfigWrite(200)).unwrap();
        assert_eq!(service.notify_rate_hz(), 50);
        service.process_event(LinkEvent::ConfigWrite(1)).unwrap();
        assert_eq!(service.notify_rate_hz(), 5);
        service.process_event(LinkEvent::ConfigWrite(25)).unwrap();
        assert_eq!(service.notify_rate_hz(), 25);
    }
}
