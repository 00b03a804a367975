//! Expected word frequency of substrings, given the probability that a word
//! boundary falls before each corpus position.
//!
//! An occurrence of a substring counts as much as the probability that it is
//! exactly one word: a boundary before it, none inside it, and one after it
//! (the end of the corpus always counts as a boundary). The most word-like
//! substrings make the vocabulary file the trainer reads.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::real;

#[derive(Debug, Clone)]
pub struct ExpectedWordCounter {
    /// Substrings of every length `1..=max_word_len` are counted.
    max_word_len: usize,
    /// At most this many substrings of each length are kept.
    extract_num: usize,
    n_threads: usize,
}

impl ExpectedWordCounter {
    pub fn new(max_word_len: usize, extract_num: usize, n_threads: usize) -> Result<Self> {
        ensure!(max_word_len > 0, "maximum word length must be positive");
        ensure!(extract_num > 0, "number of words to extract must be positive");
        ensure!(n_threads > 0, "thread count must be positive");
        Ok(ExpectedWordCounter {
            max_word_len,
            extract_num,
            n_threads,
        })
    }

    /// Counts substrings of every length, one job per length, and returns
    /// them sorted by expected frequency, highest first. Ties are ordered by
    /// substring.
    ///
    /// `boundaries[i]` is the probability of a word boundary just before
    /// `corpus[i]`.
    pub fn count(&self, corpus: &[char], boundaries: &[real]) -> Result<Vec<(String, real)>> {
        ensure!(
            corpus.len() == boundaries.len(),
            "corpus has {} characters but {} boundary probabilities",
            corpus.len(),
            boundaries.len()
        );
        if let Some(i) = boundaries.iter().position(|p| !(0.0..=1.0).contains(p)) {
            bail!(
                "boundary probability at position {i} is {}, not in [0, 1]",
                boundaries[i]
            );
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.n_threads)
            .build()
            .context("error starting counting threads")?;
        let mut counted: Vec<(String, real)> = pool.install(|| {
            (1..=self.max_word_len)
                .into_par_iter()
                .flat_map_iter(|len| self.count_length(corpus, boundaries, len))
                .collect()
        });
        sort_by_frequency(&mut counted);
        info!("counted {} word-like substrings", counted.len());
        Ok(counted)
    }

    fn count_length(
        &self,
        corpus: &[char],
        boundaries: &[real],
        len: usize,
    ) -> Vec<(String, real)> {
        if corpus.len() < len {
            return vec![];
        }
        let mut counts: HashMap<&[char], real> = HashMap::new();
        for start in 0..=(corpus.len() - len) {
            *counts.entry(&corpus[start..start + len]).or_insert(0.0) +=
                word_probability(boundaries, start, len);
        }

        let mut kept: Vec<(String, real)> = counts
            .into_iter()
            .map(|(word, count)| (word.iter().collect(), count))
            .collect();
        sort_by_frequency(&mut kept);
        kept.truncate(self.extract_num);
        info!("length {len}: {} kept", kept.len());
        kept
    }
}

/// Probability that `len` characters starting at `start` form exactly one word.
pub fn word_probability(boundaries: &[real], start: usize, len: usize) -> real {
    let inside: real = boundaries[start + 1..start + len]
        .iter()
        .map(|b| 1.0 - b)
        .product();
    let after = boundaries.get(start + len).copied().unwrap_or(1.0);
    boundaries[start] * inside * after
}

fn sort_by_frequency(entries: &mut [(String, real)]) {
    entries.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
}

/// The first `k` entries of a sorted count list.
pub fn top(counted: &[(String, real)], k: usize) -> Vec<(String, real)> {
    if counted.len() < k {
        warn!(
            "only {} word-like substrings counted, {} requested",
            counted.len(),
            k
        );
    }
    counted.iter().take(k).cloned().collect()
}

/// Writes `<word>\t<expected count>` lines.
pub fn write_counts<W: Write>(entries: &[(String, real)], mut fo: W) -> Result<()> {
    for (word, count) in entries {
        writeln!(fo, "{word}\t{count}").context("error writing word counts")?;
    }
    fo.flush().context("error writing word counts")?;
    Ok(())
}

pub fn save_counts(entries: &[(String, real)], path: &Path) -> Result<()> {
    info!("saving {} word-like substrings to {}", entries.len(), path.display());
    let fo = BufWriter::new(File::create(path).context("error creating word count file")?);
    write_counts(entries, fo)
}

/// Reads one boundary probability per line. Blank lines are skipped.
pub fn read_boundaries(path: &Path) -> Result<Vec<real>> {
    let fin = BufReader::new(File::open(path).context("error opening boundary file")?);
    let mut boundaries = vec![];
    for (line_num, line) in fin.lines().enumerate() {
        let line = line.context("error reading boundary file")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let p = line.parse::<real>().with_context(|| {
            format!(
                "error reading boundary file: unrecognized probability on line {}",
                line_num + 1
            )
        })?;
        boundaries.push(p);
    }
    Ok(boundaries)
}
