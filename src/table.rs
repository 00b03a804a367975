use anyhow::{ensure, Result};
use tracing::warn;

use crate::{real, Rng};

/// Number of slots in the negative-sampling table.
pub const TABLE_SIZE: usize = 1_000_000;

/// Slot → vocabulary id table for drawing negative samples in O(1).
///
/// The share of slots holding id `i` approximates `count(i)^p / Σ count(j)^p`.
/// Built once, then only read.
#[derive(Debug, Clone)]
pub struct UnigramTable {
    slots: Vec<usize>,
}

impl UnigramTable {
    pub fn new(counts: &[u64], power: real) -> Result<Self> {
        Self::with_size(counts, power, TABLE_SIZE)
    }

    pub fn with_size(counts: &[u64], power: real, size: usize) -> Result<Self> {
        ensure!(!counts.is_empty(), "cannot build a unigram table for an empty vocabulary");
        ensure!(size > 0, "unigram table size must be positive");
        ensure!(
            power.is_finite() && power > 0.0,
            "unigram table power must be positive, got {power}"
        );
        let vocab_size = counts.len();
        if size < vocab_size {
            warn!(
                "unigram table has {size} slots for {vocab_size} vocabulary entries; \
                 some entries will never be drawn as negatives"
            );
        }

        let mass = |id: usize| (counts[id] as real).powf(power);
        let total = (0..vocab_size).map(mass).sum::<real>();
        ensure!(
            total.is_finite() && total > 0.0,
            "vocabulary counts sum to zero; cannot build a sampling distribution"
        );

        let mut slots = Vec::with_capacity(size);
        let mut id = 0;
        let mut cumulative = mass(id) / total;
        for slot in 0..size {
            slots.push(id);
            if (slot as real / size as real) > cumulative && id + 1 < vocab_size {
                id += 1;
                cumulative += mass(id) / total;
            }
        }
        Ok(UnigramTable { slots })
    }

    /// Draws one vocabulary id.
    pub fn sample(&self, rng: &mut Rng) -> usize {
        self.slots[rng.rand_index(self.slots.len())]
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[usize] {
        &self.slots
    }

    /// Fraction of slots holding `id`.
    pub fn fraction(&self, id: usize) -> real {
        self.slots.iter().filter(|&&s| s == id).count() as real / self.slots.len() as real
    }
}
