use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::thread;
use std::time::Instant;

use anyhow::{anyhow, ensure, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::schedule::LinearDecay;
use crate::{real, ContextSide, Embeddings, Rng, TrainConfig, UnigramTable, Vocabulary};

/// The reporting worker updates the progress bar once per this many corpus positions.
const PROGRESS_CHUNK: usize = 1000;

/// Probability of keeping an occurrence of a substring seen `count` times
/// (out of `total`) as a training center.
///
/// Values above 1 mean the substring is always kept. Frequent substrings get
/// lower values.
pub fn keep_probability(count: u64, total: u64, sample_rate: real) -> real {
    let f = count as real;
    let k = sample_rate * total as real;
    ((f / k).sqrt() + 1.0) * k / f
}

/// The logistic function, 1 / (1 + e^-x).
fn sigmoid(x: real) -> real {
    1.0 / (1.0 + (-x).exp())
}

/// Skip-gram with negative sampling over the substrings of one corpus.
///
/// A `SkipGram` is trained exactly once: [`SkipGram::train`] consumes it and
/// returns the [`Trained`] vectors.
pub struct SkipGram {
    config: TrainConfig,
    corpus: Vec<char>,
    vocab: Vocabulary,
    table: UnigramTable,
    embeddings: Embeddings,
}

impl SkipGram {
    pub fn new(corpus: Vec<char>, vocab: Vocabulary, config: TrainConfig) -> Result<Self> {
        config.validate()?;
        ensure!(!corpus.is_empty(), "corpus is empty");
        ensure!(
            corpus.len() >= config.n_threads,
            "corpus has {} characters, too short to split across {} threads",
            corpus.len(),
            config.n_threads
        );

        let table = UnigramTable::new(vocab.counts(), config.unigram_power)
            .context("error building negative sampling table")?;
        let embeddings = Embeddings::new(vocab.len(), config.dim, &mut Rng::new(config.seed))?;

        info!("###### SGNS-WNE ######");
        info!("corpus length       : {}", corpus.len());
        info!("vocabulary size     : {}", vocab.len());
        info!("window              : {}", config.window);
        info!("dim                 : {}", config.dim);
        info!("seed                : {}", config.seed);
        info!("iterations          : {}", config.n_iteration);
        info!("negative samples    : {}", config.n_negative);
        info!("threads             : {}", config.n_threads);
        info!("learning rate       : {}", config.learning_rate);
        info!("sample rate         : {}", config.sample_rate);
        info!("unigram table power : {}", config.unigram_power);
        info!("longest entry       : {}", vocab.max_word_len());

        Ok(SkipGram {
            config,
            corpus,
            vocab,
            table,
            embeddings,
        })
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    /// The arena as initialized, before any training.
    pub fn embeddings(&self) -> &Embeddings {
        &self.embeddings
    }

    /// Runs every pass over the corpus on `n_threads` workers and waits for
    /// all of them.
    ///
    /// Worker `k` trains on characters `[k * len/n, (k+1) * len/n)`; the last
    /// `len % n` characters are not used. Workers share the embedding arena
    /// without locking, so with more than one thread the result depends on
    /// scheduling.
    pub fn train(self) -> Result<Trained> {
        let n_threads = self.config.n_threads;
        let slice_len = self.corpus.len() / n_threads;

        let progress = if self.config.show_progress {
            let bar = ProgressBar::new((self.config.n_iteration * slice_len) as u64);
            bar.set_style(
                ProgressStyle::with_template("{msg} [{elapsed_precise}] {wide_bar} {percent}%")
                    .map_err(|err| anyhow!("invalid progress bar template: {err}"))?,
            );
            bar.set_message("Training");
            bar
        } else {
            ProgressBar::hidden()
        };

        let start = Instant::now();
        thread::scope(|s| -> Result<()> {
            let this: &SkipGram = &self;
            let progress = &progress;
            let workers = (0..n_threads)
                .map(|id| {
                    s.spawn(move || this.train_slice(id, id * slice_len, slice_len, progress))
                })
                .collect::<Vec<_>>();
            for worker in workers {
                worker
                    .join()
                    .map_err(|_| anyhow!("training worker thread panicked"))?;
            }
            Ok(())
        })?;
        progress.finish_and_clear();
        info!("training took {} ms", start.elapsed().as_millis());

        Ok(Trained {
            vocab: self.vocab,
            embeddings: self.embeddings,
        })
    }

    fn train_slice(&self, id: usize, start: usize, len: usize, progress: &ProgressBar) {
        let corpus = &self.corpus[start..start + len];
        let vocab = self.vocab.clone();
        let max_word_len = vocab.max_word_len();
        let total_count = vocab.total_count();
        let sample_rate = self.config.sample_rate;
        let n_iteration = self.config.n_iteration;
        let schedule = LinearDecay::new(self.config.learning_rate, n_iteration, len);
        let reports_progress = id == self.config.n_threads - 1;

        let mut rng = Rng::new(self.config.seed.wrapping_add(id as u64));
        let mut gradient: Vec<real> = vec![0.0; self.config.dim];

        for iteration in 0..n_iteration {
            for i in 0..len {
                let done = iteration * len + i;
                if reports_progress && done % PROGRESS_CHUNK == 0 {
                    progress.set_position(done as u64);
                }
                let alpha = schedule.rate(iteration, i);

                // Over center substrings starting at `i`
                for word_len in 1..=max_word_len {
                    if i + word_len > len {
                        break;
                    }
                    let Some(word) = vocab.lookup(&corpus[i..i + word_len]) else {
                        continue;
                    };

                    // The subsampling randomly discards frequent substrings
                    let keep = keep_probability(vocab.count(word), total_count, sample_rate);
                    if keep < rng.rand_real() {
                        continue;
                    }

                    // Over context substrings starting right after the center
                    let context_start = i + word_len;
                    for context_len in 1..=max_word_len {
                        if context_start + context_len > len {
                            break;
                        }
                        let Some(context) =
                            vocab.lookup(&corpus[context_start..context_start + context_len])
                        else {
                            continue;
                        };

                        self.learn_pair(
                            word,
                            context,
                            ContextSide::Right,
                            alpha,
                            &mut rng,
                            &mut gradient,
                        );
                        self.learn_pair(
                            context,
                            word,
                            ContextSide::Left,
                            alpha,
                            &mut rng,
                            &mut gradient,
                        );
                    }
                }
            }
        }

        if reports_progress {
            progress.set_position((n_iteration * len) as u64);
        }
    }

    /// One negative-sampling step: `center`'s word vector against `target`'s
    /// row in the `side` context bank, plus `n_negative` rows drawn from the
    /// unigram table.
    ///
    /// Context rows are updated as each example is scored; the center row is
    /// updated once at the end with the accumulated gradient.
    fn learn_pair(
        &self,
        center: usize,
        target: usize,
        side: ContextSide,
        alpha: real,
        rng: &mut Rng,
        gradient: &mut [real],
    ) {
        let center_row = self.embeddings.word_row(center);
        gradient.fill(0.0);

        for d in 0..=self.config.n_negative {
            let (sample, label) = if d == 0 {
                (target, 1.0)
            } else {
                let sample = self.table.sample(rng);
                if sample == target {
                    continue;
                }
                (sample, 0.0)
            };

            let context_row = self.embeddings.context_row(side, sample);
            let x = center_row
                .iter()
                .zip(context_row)
                .map(|(w, c)| w.get() * c.get())
                .sum::<real>();
            let g = sigmoid(x) - label;

            for ((grad, c), w) in gradient.iter_mut().zip(context_row).zip(center_row) {
                *grad += g * c.get();
                c.add(-alpha * g * w.get());
            }
        }

        for (w, grad) in center_row.iter().zip(gradient.iter()) {
            w.add(-alpha * grad);
        }
    }
}

/// The outcome of a finished training run.
pub struct Trained {
    vocab: Vocabulary,
    embeddings: Embeddings,
}

impl Trained {
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn dim(&self) -> usize {
        self.embeddings.dim()
    }

    pub fn embeddings(&self) -> &Embeddings {
        &self.embeddings
    }

    pub fn word_vector(&self, id: usize) -> Vec<real> {
        self.embeddings.word_vector(id)
    }

    pub fn context_vector(&self, side: ContextSide, id: usize) -> Vec<real> {
        self.embeddings.context_vector(side, id)
    }

    /// Writes `"<vocab size> <dim>"`, then one line per id: the substring and
    /// its word vector, space-separated.
    pub fn write_vectors<W: Write>(&self, mut fo: W) -> Result<()> {
        writeln!(fo, "{} {}", self.vocab.len(), self.dim()).context("error writing output file")?;
        for (id, word) in self.vocab.words().iter().enumerate() {
            write!(fo, "{word}").context("error writing output file")?;
            for f in self.embeddings.word_row(id) {
                write!(fo, " {}", f.get()).context("error writing output file")?;
            }
            writeln!(fo).context("error writing output file")?;
        }
        fo.flush().context("error writing output file")?;
        Ok(())
    }

    pub fn save_vectors(&self, output_file: &Path) -> Result<()> {
        info!("saving embeddings to {}", output_file.display());
        let fo = BufWriter::new(File::create(output_file).context("error creating output file")?);
        self.write_vectors(fo)
    }
}
