//! Wireless telemetry: wire framing, link abstraction, and service
//! lifecycle
//!
//! The radio stack itself is an external collaborator behind
//! [`WirelessLink`]; this module defines what goes over it (fixed binary
//! frames, single-byte control and config writes) and when (connection
//! lifecycle gating).

mod frames;
mod link;
mod service;

pub use frames::{
    CMD_RESET_FILTERS, CMD_RESET_PEAK, CommandId, DATA_FRAME_LEN, NOTIFY_RATE_DEFAULT_HZ,
    NOTIFY_RATE_MAX_HZ, NOTIFY_RATE_MIN_HZ, PEAK_FRAME_LEN, PEAK_NOTIFY_INTERVAL_MS,
    clamp_notify_rate, encode_data_frame, encode_peak_frame,
};
pub use link::{LinkEvent, MockLink, WirelessLink};
pub use service::{ConnectionState, TelemetryCommand, TelemetryCounters, TelemetryService};
