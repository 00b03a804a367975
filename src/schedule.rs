use crate::real;

/// Progress is capped here so the rate never reaches zero.
pub const MAX_PROGRESS: real = 0.9999;

/// Linear decay from `base_rate` toward zero over one worker's share of the
/// training.
///
/// Each worker computes this from its own position; workers do not agree on
/// a global step count.
#[derive(Debug, Clone, Copy)]
pub struct LinearDecay {
    base_rate: real,
    n_iteration: usize,
    slice_len: usize,
}

impl LinearDecay {
    pub fn new(base_rate: real, n_iteration: usize, slice_len: usize) -> Self {
        LinearDecay {
            base_rate,
            n_iteration,
            slice_len,
        }
    }

    /// Fraction of the work done at `position` of pass `iteration`, in `[0, MAX_PROGRESS]`.
    pub fn progress(&self, iteration: usize, position: usize) -> real {
        let done = (iteration * self.slice_len + position) as real;
        let total = (self.n_iteration * self.slice_len + 1) as real;
        (done / total).min(MAX_PROGRESS)
    }

    pub fn rate(&self, iteration: usize, position: usize) -> real {
        self.base_rate * (1.0 - self.progress(iteration, position))
    }
}
