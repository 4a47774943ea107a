//! Simulated accelerometer for hardware-free runs
//!
//! Produces a gravity-resting signal with Gaussian noise and occasional
//! impulse transients, so the downstream pipeline sees realistic data.
//! The simulated part carries a fixed physical bias matching the default
//! calibration offsets; the configured calibration is subtracted on read,
//! exactly as the real driver would do.

use crate::config::SensorConfig;
use crate::drivers::Accelerometer;
use crate::error::{Error, Result};
use rand::prelude::*;
use rand::rngs::SmallRng;
use rand_distr::StandardNormal;

/// Part-to-part zero-g offset of the simulated device, in g.
///
/// Matches the default calibration offsets in [`SensorConfig`], so a
/// default-configured instrument reads ~(0, 0, 1 g) at rest.
const SENSOR_BIAS_X: f32 = 0.35;
const SENSOR_BIAS_Y: f32 = -0.60;
const SENSOR_BIAS_Z: f32 = 0.70;

/// Simulated high-range accelerometer.
pub struct SimulatedAccelerometer {
    rng: SmallRng,
    noise_stddev: f32,
    impulse_probability: f32,
    impulse_peak_g: f32,
    calibration: [f32; 3],
    initialized: bool,
    output_rate_hz: u32,
    /// Remaining injected read failures (test hook)
    fail_next_reads: u32,
}

impl SimulatedAccelerometer {
    /// Create a simulator from config.
    ///
    /// Seed 0 draws from entropy; any other seed is reproducible. An
    /// out-of-range impulse probability is clamped into [0, 1] rather
    /// than rejected.
    pub fn new(config: &SensorConfig, seed: u64) -> Self {
        let rng = if seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        // gen_bool requires a probability in [0, 1]; clamp passes NaN
        // through, so non-finite values drop to 0
        let impulse_probability = if config.impulse_probability.is_finite() {
            config.impulse_probability.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if impulse_probability != config.impulse_probability {
            log::warn!(
                "Sensor: impulse probability {} out of range, using {}",
                config.impulse_probability,
                impulse_probability
            );
        }
        Self {
            rng,
            noise_stddev: config.noise_stddev_g,
            impulse_probability,
            impulse_peak_g: config.impulse_peak_g,
            calibration: [config.offset_x, config.offset_y, config.offset_z],
            initialized: false,
            output_rate_hz: 0,
            fail_next_reads: 0,
        }
    }

    /// Make the next `count` reads fail, as a flaky bus would.
    pub fn fail_next_reads(&mut self, count: u32) {
        self.fail_next_reads = count;
    }

    fn gaussian(&mut self, stddev: f32) -> f32 {
        if stddev == 0.0 {
            return 0.0;
        }
        let n: f32 = self.rng.sample(StandardNormal);
        n * stddev
    }
}

impl Accelerometer for SimulatedAccelerometer {
    fn init(&mut self) -> Result<()> {
        self.initialized = true;
        log::info!("Sensor: simulated accelerometer ready");
        Ok(())
    }

    fn read_sample(&mut self) -> Result<crate::types::RawSample> {
        if !self.initialized {
            return Err(Error::NotInitialized);
        }
        if self.fail_next_reads > 0 {
            self.fail_next_reads -= 1;
            return Err(Error::Sensor("injected read failure".to_string()));
        }

        // device frame: at rest the part reads its bias plus 1 g on Z
        let mut x = SENSOR_BIAS_X + self.gaussian(self.noise_stddev);
        let mut y = SENSOR_BIAS_Y + self.gaussian(self.noise_stddev);
        let mut z = SENSOR_BIAS_Z + 1.0 + self.gaussian(self.noise_stddev);

        if self.rng.gen_bool(self.impulse_probability as f64) {
            // brief strike transient on one axis
            let amplitude = self.gaussian(self.impulse_peak_g).abs();
            match self.rng.gen_range(0..3) {
                0 => x += amplitude,
                1 => y += amplitude,
                _ => z += amplitude,
            }
            log::trace!("Sensor: simulated impulse of {:.1} g", amplitude);
        }

        Ok(crate::types::RawSample::new(
            x - self.calibration[0],
            y - self.calibration[1],
            z - self.calibration[2],
        ))
    }

    fn set_output_rate(&mut self, hz: u32) -> Result<()> {
        self.output_rate_hz = hz;
        log::debug!("Sensor: output data rate {} Hz", hz);
        Ok(())
    }
}
