use std::sync::atomic::{AtomicU64, Ordering};

use aligned_box::AlignedBox;
use anyhow::{anyhow, Result};

use crate::{real, Rng};

/// A float that many threads may read and write at once.
///
/// Loads and stores are relaxed and `add` is not a read-modify-write, so a
/// concurrent update can be lost. Training tolerates that.
#[derive(Default)]
#[repr(transparent)]
pub struct Real {
    bits: AtomicU64,
}

impl Real {
    pub fn get(&self) -> real {
        real::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn set(&self, value: real) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn add(&self, x: real) {
        let a = self.get();
        self.set(a + x);
    }
}

/// Which context bank a training pair uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSide {
    Left,
    Right,
}

/// The three embedding banks, each `vocab_size * dim` long. Row `i` of a bank
/// is `[i * dim, (i + 1) * dim)`.
pub struct Embeddings {
    dim: usize,
    /// The learned word-vectors.
    words: AlignedBox<[Real]>,
    /// Vectors for substrings seen immediately to the left of a word.
    contexts_left: AlignedBox<[Real]>,
    /// Vectors for substrings seen immediately to the right of a word.
    contexts_right: AlignedBox<[Real]>,
}

fn alloc_bank(len: usize) -> Result<AlignedBox<[Real]>> {
    AlignedBox::slice_from_default(128, len)
        .map_err(|err| anyhow!("error allocating {len} embedding weights: {err:?}"))
}

impl Embeddings {
    /// Word vectors start uniform in `[-1/dim, 1/dim]`, context vectors at zero.
    pub fn new(vocab_size: usize, dim: usize, rng: &mut Rng) -> Result<Self> {
        let n = vocab_size
            .checked_mul(dim)
            .ok_or_else(|| anyhow!("embedding arena size overflows"))?;
        let words = alloc_bank(n)?;
        let contexts_left = alloc_bank(n)?;
        let contexts_right = alloc_bank(n)?;

        let bound = 1.0 / dim as real;
        for w in words.iter() {
            w.set(rng.uniform(-bound, bound));
        }

        Ok(Embeddings {
            dim,
            words,
            contexts_left,
            contexts_right,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn word_row(&self, id: usize) -> &[Real] {
        &self.words[id * self.dim..][..self.dim]
    }

    pub fn context_row(&self, side: ContextSide, id: usize) -> &[Real] {
        let bank = match side {
            ContextSide::Left => &self.contexts_left,
            ContextSide::Right => &self.contexts_right,
        };
        &bank[id * self.dim..][..self.dim]
    }

    /// Snapshot of a word vector.
    pub fn word_vector(&self, id: usize) -> Vec<real> {
        self.word_row(id).iter().map(Real::get).collect()
    }

    /// Snapshot of a context vector.
    pub fn context_vector(&self, side: ContextSide, id: usize) -> Vec<real> {
        self.context_row(side, id).iter().map(Real::get).collect()
    }
}
