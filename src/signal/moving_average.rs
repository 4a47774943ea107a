//! Constant-time moving average over a fixed trailing window

/// O(1) windowed mean: ring buffer plus running sum.
///
/// `N` is the window size, fixed at compile time. Until the window fills,
/// the average is taken over the samples seen so far; before any sample it
/// is 0. Float rounding drift in the running sum stays bounded because an
/// evicted value carries its error contribution out with it within one
/// full wrap cycle.
#[derive(Debug, Clone)]
pub struct MovingAverage<const N: usize> {
    buffer: [f32; N],
    index: usize,
    count: usize,
    sum: f32,
}

impl<const N: usize> MovingAverage<N> {
    pub fn new() -> Self {
        Self {
            buffer: [0.0; N],
            index: 0,
            count: 0,
            sum: 0.0,
        }
    }

    /// Push one sample and return the updated average.
    ///
    /// Evicts the value at the write cursor from the running sum, stores
    /// the new value there, and advances the cursor modulo `N`.
    pub fn add_sample(&mut self, value: f32) -> f32 {
        self.sum -= self.buffer[self.index];
        self.buffer[self.index] = value;
        self.sum += value;
        self.index = (self.index + 1) % N;
        if self.count < N {
            self.count += 1;
        }
        self.average()
    }

    /// Mean of the samples currently in the window; 0 before any sample.
    pub fn average(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f32
        }
    }

    /// True once `N` samples have been absorbed.
    pub fn is_full(&self) -> bool {
        self.count == N
    }

    pub fn sample_count(&self) -> usize {
        self.count
    }

    /// Zero the buffer, cursor, count, and running sum.
    pub fn reset(&mut self) {
        self.buffer = [0.0; N];
        self.index = 0;
        self.count = 0;
        self.sum = 0.0;
    }
}

impl<const N: usize> Default for MovingAverage<N> {
    fn default() -> Self {
        Self::new()
    }
}
