use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use tracing::{debug, warn};

/// Bidirectional map between substrings and dense ids `0..len()`, with an
/// occurrence count per id.
///
/// Ids follow input order. Counts default to 1 so that the sampling
/// distribution stays defined for entries missing from the count file.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    words: Vec<String>,
    counts: Vec<u64>,
    /// Keyed by code points so corpus slices can be looked up without allocating.
    index: HashMap<Vec<char>, usize>,
    total_count: u64,
    /// Length of the longest entry, in code points.
    max_word_len: usize,
}

impl Vocabulary {
    /// Builds a vocabulary where every entry has count 1.
    pub fn new(words: Vec<String>) -> Result<Self> {
        let counts = vec![1; words.len()];
        Self::with_counts(words, counts)
    }

    pub fn from_entries<S: Into<String>>(
        entries: impl IntoIterator<Item = (S, u64)>,
    ) -> Result<Self> {
        let (words, counts): (Vec<String>, Vec<u64>) = entries
            .into_iter()
            .map(|(word, count)| (word.into(), count))
            .unzip();
        Self::with_counts(words, counts)
    }

    fn with_counts(words: Vec<String>, counts: Vec<u64>) -> Result<Self> {
        ensure!(!words.is_empty(), "vocabulary is empty");
        ensure!(
            words.len() == counts.len(),
            "vocabulary has {} entries but {} counts",
            words.len(),
            counts.len()
        );

        let mut index = HashMap::with_capacity(words.len());
        let mut max_word_len = 0;
        for (id, word) in words.iter().enumerate() {
            let key: Vec<char> = word.chars().collect();
            ensure!(!key.is_empty(), "vocabulary entry {id} is empty");
            max_word_len = max_word_len.max(key.len());
            if let Some(previous) = index.insert(key, id) {
                bail!("vocabulary entry {word:?} appears twice (ids {previous} and {id})");
            }
        }
        let total_count = counts.iter().sum();

        Ok(Vocabulary {
            words,
            counts,
            index,
            total_count,
            max_word_len,
        })
    }

    /// Reads the first `max_entries` words of `vocab_path`, then takes their
    /// counts from `ngram_path`.
    pub fn load(vocab_path: &Path, ngram_path: &Path, max_entries: usize) -> Result<Self> {
        let words = read_vocabulary_words(vocab_path, max_entries)?;
        if words.len() < max_entries {
            warn!(
                "vocabulary file has only {} entries, {} requested",
                words.len(),
                max_entries
            );
        }
        let mut vocab = Vocabulary::new(words)?;

        let fin =
            BufReader::new(File::open(ngram_path).context("error opening n-gram count file")?);
        vocab.update_counts(fin)?;
        debug!(
            "loaded {} vocabulary entries, total count {}",
            vocab.len(),
            vocab.total_count
        );
        Ok(vocab)
    }

    /// Overwrites the count of every entry that appears in an n-gram count
    /// listing (`<substring>\t<count>` per line). Other lines are ignored.
    fn update_counts<R: BufRead>(&mut self, fin: R) -> Result<()> {
        for (line_num, line) in fin.lines().enumerate() {
            let line = line.context("error reading n-gram count file")?;
            if line.is_empty() {
                continue;
            }
            let (ngram, count) = line.split_once('\t').with_context(|| {
                format!("n-gram count file syntax error on line {}", line_num + 1)
            })?;
            let count = count.trim().parse::<u64>().with_context(|| {
                format!(
                    "error reading n-gram count file: unrecognized count on line {}",
                    line_num + 1
                )
            })?;
            let key: Vec<char> = ngram.chars().collect();
            if let Some(&id) = self.index.get(&key) {
                self.counts[id] = count;
            }
        }
        self.total_count = self.counts.iter().sum();
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Returns the id of a substring, if it is in the vocabulary.
    pub fn lookup(&self, word: &[char]) -> Option<usize> {
        self.index.get(word).copied()
    }

    pub fn lookup_str(&self, word: &str) -> Option<usize> {
        self.lookup(&word.chars().collect::<Vec<char>>())
    }

    /// Panics if `id` is out of range.
    pub fn word(&self, id: usize) -> &str {
        &self.words[id]
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Panics if `id` is out of range.
    pub fn count(&self, id: usize) -> u64 {
        self.counts[id]
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn max_word_len(&self) -> usize {
        self.max_word_len
    }
}

/// Reads up to `max_entries` lines of a vocabulary file. Each line is
/// `<substring>\t<anything>`; only the substring is kept.
pub fn read_vocabulary_words(path: &Path, max_entries: usize) -> Result<Vec<String>> {
    let fin = BufReader::new(File::open(path).context("error opening vocabulary file")?);
    let mut words = vec![];
    for line in fin.lines().take(max_entries) {
        let line = line.context("error reading vocabulary file")?;
        let word = match line.split_once('\t') {
            Some((word, _rest)) => word.to_string(),
            None => line,
        };
        words.push(word);
    }
    Ok(words)
}
