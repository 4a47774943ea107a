//! Shared data types for the telemetry pipeline

mod input;
mod sample;

pub use input::{Gesture, Screen, Settings, TouchEvent, TouchPoint};
pub use sample::{ConditionedSample, RawSample};
