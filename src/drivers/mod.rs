//! Accelerometer drivers
//!
//! The physical sensor (register protocol, bus transport) is out of scope;
//! [`Accelerometer`] is its boundary. The simulated driver stands in for
//! hardware so the full pipeline runs anywhere.

mod sim;

pub use sim::SimulatedAccelerometer;

use crate::error::Result;
use crate::types::RawSample;

/// High-range 3-axis accelerometer collaborator.
///
/// A failed read means "no sample this tick": the caller skips the tick
/// and tries again on the next one. A failed `init` disables sampling for
/// the process lifetime.
pub trait Accelerometer: Send {
    /// Bring the device out of standby into measurement mode.
    fn init(&mut self) -> Result<()>;

    /// Read one calibrated sample, in g.
    fn read_sample(&mut self) -> Result<RawSample>;

    /// Match the device output data rate to the sample clock.
    fn set_output_rate(&mut self, hz: u32) -> Result<()>;
}
