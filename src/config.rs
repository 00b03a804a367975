use anyhow::{ensure, Result};

use crate::real;

/// Hyperparameters of a training run.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Maximum skip length. Accepted for compatibility; the substring scan is
    /// bounded by the longest vocabulary entry instead.
    pub window: usize,
    /// Embedding dimension.
    pub dim: usize,
    /// Base random seed. Worker `k` is seeded with `seed + k`.
    pub seed: u64,
    /// Number of passes over the corpus.
    pub n_iteration: usize,
    /// Negative samples drawn per positive pair and direction.
    pub n_negative: usize,
    /// Number of worker threads, one contiguous corpus slice each.
    pub n_threads: usize,
    /// Starting learning rate; decays linearly toward zero.
    pub learning_rate: real,
    /// Subsampling rate. Smaller values discard frequent substrings more often.
    pub sample_rate: real,
    /// Smoothing exponent applied to counts when building the unigram table.
    pub unigram_power: real,
    /// Draw a progress bar while training.
    pub show_progress: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            window: 5,
            dim: 100,
            seed: 1,
            n_iteration: 5,
            n_negative: 5,
            n_threads: 1,
            learning_rate: 0.025,
            sample_rate: 1e-3,
            unigram_power: 0.75,
            show_progress: true,
        }
    }
}

fn positive(name: &str, value: real) -> Result<()> {
    ensure!(
        value.is_finite() && value > 0.0,
        "{name} must be positive, got {value}"
    );
    Ok(())
}

impl TrainConfig {
    /// Check the preconditions that the numeric code relies on.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.dim > 0, "embedding dimension must be positive");
        ensure!(self.seed > 0, "seed must be positive");
        ensure!(self.n_threads > 0, "thread count must be positive");
        positive("learning rate", self.learning_rate)?;
        positive("sample rate", self.sample_rate)?;
        positive("unigram table power", self.unigram_power)?;
        Ok(())
    }
}
