//! Skip-gram with negative sampling over word-like n-grams.
//!
//! The "words" here are arbitrary substrings of a corpus that has not been
//! split on whitespace. Every vocabulary entry gets a word vector plus a left
//! and a right context vector, trained Hogwild-style by several threads that
//! share one embedding arena without locks.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Index;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use ordered_float::OrderedFloat;

pub mod config;
pub mod corpus;
pub mod embeddings;
pub mod lossy;
pub mod rng;
pub mod schedule;
pub mod table;
pub mod trainer;
pub mod vocab;
pub mod words;

pub use config::TrainConfig;
pub use embeddings::{ContextSide, Embeddings, Real};
pub use lossy::LossyCounter;
pub use rng::Rng;
pub use table::{UnigramTable, TABLE_SIZE};
pub use trainer::{keep_probability, SkipGram, Trained};
pub use vocab::Vocabulary;
pub use words::ExpectedWordCounter;

#[allow(non_camel_case_types)]
pub type real = f64; // Precision of float numbers

/// Log to stderr at `info` unless `RUST_LOG` says otherwise.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn norm(v: &[real]) -> real {
    v.iter().copied().map(|e| e * e).sum::<real>().sqrt()
}

pub fn normalize(v: &mut [real]) {
    let len = norm(v);
    if len == 0.0 {
        return;
    }
    for e in v {
        *e /= len;
    }
}

pub fn dot(a: &[real], b: &[real]) -> real {
    assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(&a, &b)| a * b).sum()
}

/// Word vectors read back from a vector file written by [`Trained::save_vectors`].
#[derive(Debug)]
pub struct Vectors {
    /// Embedding vector length (number of dimensions).
    size: usize,

    /// The vocabulary.
    vocab: Vec<String>,

    /// `embeddings[k * size..(k+1) * size]` is the unit-length vector for word `k`.
    embeddings: Vec<real>,
}

impl Index<usize> for Vectors {
    type Output = [real];

    fn index(&self, i: usize) -> &[real] {
        &self.embeddings[i * self.size..][..self.size]
    }
}

impl Vectors {
    pub fn load(file_name: &Path) -> Result<Self> {
        let f = BufReader::new(File::open(file_name).context("error opening vector file")?);
        let mut lines = f.lines();
        let header = lines
            .next()
            .ok_or_else(|| anyhow!("invalid vector file: missing header"))?
            .context("error reading vector file")?;
        let mut fields = header.split_whitespace();
        let num_words: usize = fields
            .next()
            .ok_or_else(|| anyhow!("invalid vector file header"))?
            .parse()
            .context("invalid vector file header")?;
        let size: usize = fields
            .next()
            .ok_or_else(|| anyhow!("invalid vector file header"))?
            .parse()
            .context("invalid vector file header")?;

        let mut vocab: Vec<String> = Vec::with_capacity(num_words);
        let mut m = vec![0.0; num_words * size];
        for b in 0..num_words {
            let line_num = b + 2;
            let line = lines
                .next()
                .ok_or_else(|| anyhow!("vector file ends early: expected {num_words} rows"))?
                .context("error reading vector file")?;

            // The substring may itself contain spaces, so peel the
            // components off the end of the line.
            let mut rest = line.as_str();
            let row = &mut m[b * size..][..size];
            for slot in row.iter_mut().rev() {
                let (head, value) = rest
                    .rsplit_once(' ')
                    .ok_or_else(|| anyhow!("too few components on line {line_num}"))?;
                *slot = value
                    .parse()
                    .with_context(|| format!("invalid component on line {line_num}"))?;
                rest = head;
            }
            vocab.push(rest.to_string());
            normalize(row);
        }

        Ok(Vectors {
            size,
            vocab,
            embeddings: m,
        })
    }

    pub fn num_words(&self) -> usize {
        self.vocab.len()
    }

    /// Returns the vector size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Get the index for a word as string. Exact match only, case-sensitive.
    pub fn lookup_word(&self, word: &str) -> Option<usize> {
        self.vocab.iter().position(|v| v == word)
    }

    /// Get the word for a word-index. Panics if `word` is out of range.
    pub fn word(&self, word: usize) -> &str {
        &self.vocab[word]
    }

    /// The `n` entries most similar to `query` by cosine similarity, best
    /// first. Indexes listed in `exclude` are skipped.
    pub fn nearest(&self, query: &[real], exclude: &[usize], n: usize) -> Vec<(&str, real)> {
        let mut query = query.to_vec();
        normalize(&mut query);
        let mut best: Vec<(&str, real)> = (0..self.num_words())
            .filter(|c| !exclude.contains(c))
            .map(|c| (self.word(c), dot(&query, &self[c])))
            .collect();
        best.sort_by_key(|&(_word, sim)| std::cmp::Reverse(OrderedFloat(sim)));
        best.truncate(n);
        best
    }
}
