//! Acceleration sample types

/// One raw 3-axis accelerometer reading, in g.
///
/// Produced once per sampling tick and consumed immediately; the pipeline
/// never retains raw samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RawSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RawSample {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean vector magnitude of the three axes.
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Filtered pipeline output, read by the output sinks as a snapshot.
///
/// Exactly one live instance exists, owned by the signal conditioner.
/// After at least one sample, `peak >= magnitude` holds and `peak` is
/// non-decreasing until explicitly reset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConditionedSample {
    /// Filtered X axis, g
    pub x: f32,
    /// Filtered Y axis, g
    pub y: f32,
    /// Filtered Z axis, g
    pub z: f32,
    /// Filtered vector magnitude, g (filtered from the raw magnitude,
    /// not derived from the filtered axes)
    pub magnitude: f32,
    /// Peak-hold of the filtered magnitude since the last reset, g
    pub peak: f32,
}
