//! Approximate frequent n-gram counting with the lossy counting algorithm.
//!
//! This produces the vocabulary and n-gram count files the trainer reads.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{ensure, Context, Result};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::real;

#[derive(Debug, Clone)]
pub struct LossyCounter {
    /// N-grams of every length `1..=max_ngram_size` are counted.
    max_ngram_size: usize,
    /// Minimum frequency, as a fraction of the corpus length, to be reported.
    support_threshold: real,
    /// Maximum undercount, as a fraction of the corpus length.
    epsilon: real,
    n_threads: usize,
}

impl LossyCounter {
    pub fn new(
        max_ngram_size: usize,
        support_threshold: real,
        epsilon: real,
        n_threads: usize,
    ) -> Result<Self> {
        ensure!(max_ngram_size > 0, "maximum n-gram size must be positive");
        ensure!(
            support_threshold.is_finite() && support_threshold > 0.0,
            "support threshold must be positive, got {support_threshold}"
        );
        ensure!(
            epsilon.is_finite() && epsilon > 0.0,
            "epsilon must be positive, got {epsilon}"
        );
        ensure!(n_threads > 0, "thread count must be positive");
        Ok(LossyCounter {
            max_ngram_size,
            support_threshold,
            epsilon,
            n_threads,
        })
    }

    /// Counts n-grams of every size, one job per size, and returns them sorted
    /// by count, most frequent first. Ties are ordered by n-gram.
    pub fn count(&self, corpus: &[char]) -> Result<Vec<(String, u64)>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.n_threads)
            .build()
            .context("error starting counting threads")?;
        let mut counted: Vec<(String, u64)> = pool.install(|| {
            (1..=self.max_ngram_size)
                .into_par_iter()
                .flat_map_iter(|n| self.count_size(corpus, n))
                .collect()
        });
        sort_by_count(&mut counted);
        info!("counted {} frequent n-grams", counted.len());
        Ok(counted)
    }

    fn count_size(&self, corpus: &[char], n: usize) -> Vec<(String, u64)> {
        if corpus.len() < n {
            return vec![];
        }
        let bucket_size = ((1.0 / self.epsilon) as usize).max(1);
        let lower_bound = (self.support_threshold * corpus.len() as real) as u64;

        // n-gram -> (count, maximum undercount)
        let mut counts: HashMap<&[char], (u64, u64)> = HashMap::new();
        let mut bucket: u64 = 1;
        for i in 0..=(corpus.len() - n) {
            let entry = counts.entry(&corpus[i..i + n]).or_insert((0, bucket - 1));
            entry.0 += 1;

            if i > 0 && i % bucket_size == 0 {
                counts.retain(|_, &mut (count, error)| count + error > bucket);
                bucket += 1;
            }
        }

        let mut kept: Vec<(String, u64)> = counts
            .into_iter()
            .filter(|&(_, (count, _))| count >= lower_bound)
            .map(|(ngram, (count, _))| (ngram.iter().collect(), count))
            .collect();
        sort_by_count(&mut kept);
        info!("{n}-grams: {} kept", kept.len());
        kept
    }
}

fn sort_by_count(entries: &mut [(String, u64)]) {
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
}

/// The first `k` distinct entries of a sorted count list.
pub fn top(counted: &[(String, u64)], k: usize) -> Vec<(String, u64)> {
    let mut seen = HashSet::new();
    let top: Vec<(String, u64)> = counted
        .iter()
        .filter(|(ngram, _)| seen.insert(ngram.as_str()))
        .take(k)
        .cloned()
        .collect();
    if top.len() < k {
        warn!("only {} n-grams counted, {} requested", top.len(), k);
    }
    top
}

/// Writes `<ngram>\t<count>` lines.
pub fn write_counts<W: Write>(entries: &[(String, u64)], mut fo: W) -> Result<()> {
    for (ngram, count) in entries {
        writeln!(fo, "{ngram}\t{count}").context("error writing n-gram counts")?;
    }
    fo.flush().context("error writing n-gram counts")?;
    Ok(())
}

pub fn save_counts(entries: &[(String, u64)], path: &Path) -> Result<()> {
    info!("saving {} n-gram counts to {}", entries.len(), path.display());
    let fo = BufWriter::new(File::create(path).context("error creating n-gram count file")?);
    write_counts(entries, fo)
}
