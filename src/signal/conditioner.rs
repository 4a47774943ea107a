//! Per-axis smoothing, magnitude filtering, and peak-hold

use crate::signal::MovingAverage;
use crate::types::{ConditionedSample, RawSample};

/// Samples averaged per channel.
pub const FILTER_WINDOW: usize = 10;

/// Filters raw 3-axis samples and maintains the peak-hold register.
///
/// The magnitude channel is fed from the raw sample's magnitude, not
/// derived from the filtered axes. Averaging the axes first and taking the
/// norm of the result under-reads fast transients: opposing axis movement
/// cancels inside the filters before the norm is computed. Filtering the
/// already-computed magnitude preserves the impulse response.
pub struct SignalConditioner {
    filter_x: MovingAverage<FILTER_WINDOW>,
    filter_y: MovingAverage<FILTER_WINDOW>,
    filter_z: MovingAverage<FILTER_WINDOW>,
    filter_magnitude: MovingAverage<FILTER_WINDOW>,
    peak: f32,
    last: ConditionedSample,
}

impl SignalConditioner {
    pub fn new() -> Self {
        Self {
            filter_x: MovingAverage::new(),
            filter_y: MovingAverage::new(),
            filter_z: MovingAverage::new(),
            filter_magnitude: MovingAverage::new(),
            peak: 0.0,
            last: ConditionedSample::default(),
        }
    }

    /// Feed one raw sample and return the updated conditioned state.
    ///
    /// Precondition: `raw` contains no NaN components. The filters do not
    /// check; a NaN would poison every running sum until `full_reset`.
    pub fn ingest(&mut self, raw: RawSample) -> ConditionedSample {
        let x = self.filter_x.add_sample(raw.x);
        let y = self.filter_y.add_sample(raw.y);
        let z = self.filter_z.add_sample(raw.z);
        let magnitude = self.filter_magnitude.add_sample(raw.magnitude());
        if magnitude > self.peak {
            self.peak = magnitude;
        }
        self.last = ConditionedSample {
            x,
            y,
            z,
            magnitude,
            peak: self.peak,
        };
        self.last
    }

    /// Latest conditioned values; zeroed until the first sample.
    pub fn snapshot(&self) -> ConditionedSample {
        self.last
    }

    pub fn peak(&self) -> f32 {
        self.peak
    }

    /// Zero the peak-hold register. Filter state is untouched, so the next
    /// sample re-seeds the peak from the current filtered magnitude.
    pub fn reset(&mut self) {
        self.peak = 0.0;
        self.last.peak = 0.0;
        log::debug!("Conditioner: peak reset");
    }

    /// Zero every filter channel and the peak-hold register.
    pub fn full_reset(&mut self) {
        self.filter_x.reset();
        self.filter_y.reset();
        self.filter_z.reset();
        self.filter_magnitude.reset();
        self.peak = 0.0;
        self.last = ConditionedSample::default();
        log::debug!("Conditioner: full filter reset");
    }
}

impl Default for SignalConditioner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converges_to_constant_input() {
        let mut conditioner = SignalConditioner::new();
        let mut out = ConditionedSample::default();
        for _ in 0..FILTER_WINDOW {
            out = conditioner.ingest(RawSample::new(0.0, 0.0, 1.0));
        }
        assert!((out.x - 0.0).abs() < 1e-6);
        assert!((out.y - 0.0).abs() < 1e-6);
        assert!((out.z - 1.0).abs() < 1e-6);
        assert!((out.magnitude - 1.0).abs() < 1e-6);
        assert!((out.peak - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_peak_is_monotonic_between_resets() {
        let mut conditioner = SignalConditioner::new();
        let mut last_peak = 0.0;
        let values = [1.0, 5.0, 3.0, 2.0, 8.0, 1.0, 0.5];
        for v in values {
            let out = conditioner.ingest(RawSample::new(0.0, 0.0, v));
            assert!(out.peak >= last_peak);
            assert!(out.peak >= out.magnitude);
            last_peak = out.peak;
        }
    }

    #[test]
    fn test_reset_clears_peak_only() {
        let mut conditioner = SignalConditioner::new();
        for _ in 0..FILTER_WINDOW {
            conditioner.ingest(RawSample::new(0.0, 0.0, 4.0));
        }
        conditioner.reset();
        assert_eq!(conditioner.peak(), 0.0);
        assert_eq!(conditioner.snapshot().peak, 0.0);
        // filters kept their state: the next sample re-seeds the peak from
        // a still-converged magnitude, not from scratch
        let out = conditioner.ingest(RawSample::new(0.0, 0.0, 4.0));
        assert!((out.magnitude - 4.0).abs() < 1e-6);
        assert!((out.peak - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_full_reset_clears_everything() {
        let mut conditioner = SignalConditioner::new();
        for _ in 0..FILTER_WINDOW {
            conditioner.ingest(RawSample::new(2.0, 2.0, 2.0));
        }
        conditioner.full_reset();
        assert_eq!(conditioner.peak(), 0.0);
        assert_eq!(conditioner.snapshot(), ConditionedSample::default());
        // first sample after a full reset averages over itself alone
        let out = conditioner.ingest(RawSample::new(0.0, 0.0, 3.0));
        assert!((out.z - 3.0).abs() < 1e-6);
        assert!((out.magnitude - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_raw_magnitude_filtering_beats_filtered_axis_norm() {
        // Alternating-sign input with constant magnitude: the axis filters
        // cancel toward zero while the raw magnitude stays at 10. This
        // pins the chosen semantics (filter the raw magnitude) against the
        // rejected one (norm of the filtered axes).
        let mut conditioner = SignalConditioner::new();
        let mut out = ConditionedSample::default();
        for i in 0..FILTER_WINDOW {
            let x = if i % 2 == 0 { 6.0 } else { -6.0 };
            out = conditioner.ingest(RawSample::new(x, 8.0, 0.0));
        }
        let filtered_axis_norm = (out.x * out.x + out.y * out.y + out.z * out.z).sqrt();
        assert!((out.magnitude - 10.0).abs() < 1e-5);
        assert!((filtered_axis_norm - 8.0).abs() < 1e-5);
        assert!((out.magnitude - filtered_axis_norm).abs() > 1.0);
    }

    #[test]
    fn test_step_input_partial_convergence() {
        let mut conditioner = SignalConditioner::new();
        for _ in 0..FILTER_WINDOW {
            conditioner.ingest(RawSample::new(0.0, 0.0, 1.0));
        }
        let out = conditioner.ingest(RawSample::new(0.0, 0.0, 50.0));
        // one window slot replaced: (9 * 1.0 + 50.0) / 10
        assert!((out.z - 5.9).abs() < 1e-5);
        assert!((out.magnitude - 5.9).abs() < 1e-5);
        assert!((out.peak - 5.9).abs() < 1e-5);
        assert!(out.z > 1.0 && out.z < 50.0);
    }
}
