//! Streaming signal conditioning
//!
//! One moving-average filter per channel (X, Y, Z, raw magnitude) plus a
//! peak-hold register, updated once per accepted sample.

mod conditioner;
mod moving_average;

pub use conditioner::{FILTER_WINDOW, SignalConditioner};
pub use moving_average::MovingAverage;
