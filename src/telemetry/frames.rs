//! Wire framing for the telemetry link
//!
//! Outbound notifications are fixed-size little-endian frames:
//!
//! ```text
//! Data frame (20 bytes):
//! ┌──────────────┬─────────┬─────────┬─────────┬─────────────┐
//! │ u32 ts_ms    │ f32 x   │ f32 y   │ f32 z   │ f32 mag     │
//! │ offset 0     │ 4       │ 8       │ 12      │ 16          │
//! └──────────────┴─────────┴─────────┴─────────┴─────────────┘
//!
//! Peak frame (8 bytes):
//! ┌──────────────┬──────────┐
//! │ u32 ts_ms    │ f32 peak │
//! │ offset 0     │ 4        │
//! └──────────────┴──────────┘
//! ```
//!
//! Inbound writes are single bytes: an opcode on the control channel, a
//! notification rate in Hz on the config channel. Out-of-range rates are
//! clamped, never rejected.

use crate::types::ConditionedSample;

/// Data-notify frame size in bytes
pub const DATA_FRAME_LEN: usize = 20;
/// Peak-notify frame size in bytes
pub const PEAK_FRAME_LEN: usize = 8;

/// Reset the peak-hold register (and gauge scale state)
pub const CMD_RESET_PEAK: u8 = 0x01;
/// Reset every filter channel and the peak-hold register
pub const CMD_RESET_FILTERS: u8 = 0x02;

/// Lowest accepted notification rate
pub const NOTIFY_RATE_MIN_HZ: u8 = 5;
/// Highest accepted notification rate
pub const NOTIFY_RATE_MAX_HZ: u8 = 50;
/// Rate in effect after enable, before any config write
pub const NOTIFY_RATE_DEFAULT_HZ: u8 = 20;

/// Fixed cadence of peak-hold notifications
pub const PEAK_NOTIFY_INTERVAL_MS: u32 = 500;

/// Control-channel opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandId {
    ResetPeak = CMD_RESET_PEAK,
    ResetFilters = CMD_RESET_FILTERS,
}

impl CommandId {
    /// Decode a control-channel byte; unknown opcodes return `None`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CMD_RESET_PEAK => Some(Self::ResetPeak),
            CMD_RESET_FILTERS => Some(Self::ResetFilters),
            _ => None,
        }
    }
}

/// Pack a data-notify frame.
pub fn encode_data_frame(timestamp_ms: u32, sample: &ConditionedSample) -> [u8; DATA_FRAME_LEN] {
    let mut frame = [0u8; DATA_FRAME_LEN];
    frame[0..4].copy_from_slice(&timestamp_ms.to_le_bytes());
    frame[4..8].copy_from_slice(&sample.x.to_le_bytes());
    frame[8..12].copy_from_slice(&sample.y.to_le_bytes());
    frame[12..16].copy_from_slice(&sample.z.to_le_bytes());
    frame[16..20].copy_from_slice(&sample.magnitude.to_le_bytes());
    frame
}

/// Pack a peak-notify frame.
pub fn encode_peak_frame(timestamp_ms: u32, peak: f32) -> [u8; PEAK_FRAME_LEN] {
    let mut frame = [0u8; PEAK_FRAME_LEN];
    frame[0..4].copy_from_slice(&timestamp_ms.to_le_bytes());
    frame[4..8].copy_from_slice(&peak.to_le_bytes());
    frame
}

/// Clamp a requested notification rate into the supported band.
pub fn clamp_notify_rate(requested: u8) -> u8 {
    requested.clamp(NOTIFY_RATE_MIN_HZ, NOTIFY_RATE_MAX_HZ)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_frame_layout() {
        let sample = ConditionedSample {
            x: 1.0,
            y: -2.0,
            z: 0.5,
            magnitude: 2.29128784747792,
            peak: 9.0,
        };
        let frame = encode_data_frame(0x0102_0304, &sample);

        assert_eq!(frame.len(), DATA_FRAME_LEN);
        // timestamp, little-endian
        assert_eq!(&frame[0..4], &[0x04, 0x03, 0x02, 0x01]);
        // 1.0f32 = 0x3F800000
        assert_eq!(&frame[4..8], &[0x00, 0x00, 0x80, 0x3F]);
        // -2.0f32 = 0xC0000000
        assert_eq!(&frame[8..12], &[0x00, 0x00, 0x00, 0xC0]);
        // 0.5f32 = 0x3F000000
        assert_eq!(&frame[12..16], &[0x00, 0x00, 0x00, 0x3F]);
        // magnitude round-trips bit-exact
        let mag = f32::from_le_bytes([frame[16], frame[17], frame[18], frame[19]]);
        assert_eq!(mag, sample.magnitude);
        // peak is NOT part of the data frame
    }

    #[test]
    fn test_data_frame_zero() {
        let frame = encode_data_frame(0, &ConditionedSample::default());
        assert_eq!(frame, [0u8; DATA_FRAME_LEN]);
    }

    #[test]
    fn test_peak_frame_layout() {
        let frame = encode_peak_frame(1000, 42.5);
        assert_eq!(frame.len(), PEAK_FRAME_LEN);
        // 1000 = 0x000003E8
        assert_eq!(&frame[0..4], &[0xE8, 0x03, 0x00, 0x00]);
        // 42.5f32 = 0x422A0000
        assert_eq!(&frame[4..8], &[0x00, 0x00, 0x2A, 0x42]);
    }

    #[test]
    fn test_command_id_from_byte() {
        assert_eq!(CommandId::from_byte(0x01), Some(CommandId::ResetPeak));
        assert_eq!(CommandId::from_byte(0x02), Some(CommandId::ResetFilters));
        assert_eq!(CommandId::from_byte(0x00), None);
        assert_eq!(CommandId::from_byte(0x03), None);
        assert_eq!(CommandId::from_byte(0xFF), None);
    }

    #[test]
    fn test_notify_rate_clamping() {
        assert_eq!(clamp_notify_rate(0), NOTIFY_RATE_MIN_HZ);
        assert_eq!(clamp_notify_rate(4), 5);
        assert_eq!(clamp_notify_rate(5), 5);
        assert_eq!(clamp_notify_rate(20), 20);
        assert_eq!(clamp_notify_rate(50), 50);
        assert_eq!(clamp_notify_rate(51), 50);
        assert_eq!(clamp_notify_rate(200), 50);
    }
}
