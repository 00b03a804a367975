use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use sgns_wne::corpus::read_corpus;
use sgns_wne::{real, SkipGram, TrainConfig, Vocabulary};

#[derive(Parser)]
#[command(about = "Skip-gram embeddings for word-like n-grams", long_about = None)]
struct Options {
    /// Use text from FILE as the corpus. It is not split on whitespace.
    #[arg(long = "corpus", value_name = "FILE")]
    corpus_file: PathBuf,

    /// Read the vocabulary (one `<substring>\t<count>` per line) from FILE
    #[arg(long = "vocab", value_name = "FILE")]
    vocab_file: PathBuf,

    /// Read occurrence counts (`<substring>\t<count>` per line) from FILE;
    /// vocabulary entries not listed get count 1
    #[arg(long = "ngram-counts", value_name = "FILE")]
    ngram_file: PathBuf,

    /// Save the resulting vectors to FILE
    #[arg(long = "output", value_name = "FILE")]
    output_file: PathBuf,

    /// Embed the first N vocabulary entries
    #[arg(long = "embed-num", value_name = "N")]
    embed_num: usize,

    /// Set max skip length between words
    #[arg(long, default_value_t = 5)]
    window: usize,

    /// Set size of word vectors
    #[arg(long = "size", default_value_t = 100)]
    dim: usize,

    /// Random seed; thread k uses seed + k
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Number of passes over the corpus
    #[arg(long, default_value_t = 5)]
    iter: usize,

    /// Number of negative examples per pair (0 = not used)
    #[arg(long, default_value_t = 5)]
    negative: usize,

    /// Use N threads
    #[arg(long = "threads", value_name = "N", default_value_t = 1)]
    num_threads: usize,

    /// Set the starting learning rate
    #[arg(long, default_value_t = 0.025)]
    alpha: real,

    /// Set threshold for occurrence of substrings. Those that appear with
    /// higher frequency will be randomly down-sampled
    #[arg(long, default_value_t = 1e-3)]
    sample: real,

    /// Exponent applied to counts in the negative sampling distribution
    #[arg(long, default_value_t = 0.75)]
    power: real,

    /// Don't draw a progress bar
    #[arg(long)]
    quiet: bool,
}

impl Options {
    fn train_config(&self) -> TrainConfig {
        TrainConfig {
            window: self.window,
            dim: self.dim,
            seed: self.seed,
            n_iteration: self.iter,
            n_negative: self.negative,
            n_threads: self.num_threads,
            learning_rate: self.alpha,
            sample_rate: self.sample,
            unigram_power: self.power,
            show_progress: !self.quiet,
        }
    }
}

fn run(options: &Options) -> Result<()> {
    let config = options.train_config();
    config.validate()?;

    let corpus = read_corpus(&options.corpus_file)?;
    let vocab = Vocabulary::load(&options.vocab_file, &options.ngram_file, options.embed_num)?;

    let skipgram = SkipGram::new(corpus, vocab, config)?;
    let trained = skipgram.train()?;
    trained.save_vectors(&options.output_file)?;
    info!("done");
    Ok(())
}

fn main() {
    sgns_wne::init_tracing();

    let options = Options::parse();
    if let Err(err) = run(&options) {
        eprintln!("{err:#}");
        process::exit(1);
    }
}
