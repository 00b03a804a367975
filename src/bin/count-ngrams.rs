use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;

use sgns_wne::corpus::read_corpus;
use sgns_wne::lossy::{save_counts, top};
use sgns_wne::{real, LossyCounter};

/// Count frequent character n-grams with the lossy counting algorithm
#[derive(Parser)]
struct Options {
    /// Count n-grams of the text in FILE
    #[arg(long = "corpus", value_name = "FILE")]
    corpus_file: PathBuf,

    /// Save every frequent n-gram with its count to FILE
    #[arg(long = "output", value_name = "FILE")]
    output_file: PathBuf,

    /// Also save the N most frequent n-grams to --top-output
    #[arg(long, value_name = "N", requires = "top_output_file")]
    top: Option<usize>,

    /// File for the most frequent n-grams
    #[arg(long = "top-output", value_name = "FILE", requires = "top")]
    top_output_file: Option<PathBuf>,

    /// Count n-grams of every length up to N
    #[arg(long = "max-ngram-size", value_name = "N", default_value_t = 8)]
    max_ngram_size: usize,

    /// Use N threads
    #[arg(long = "threads", value_name = "N", default_value_t = 1)]
    num_threads: usize,

    /// Report n-grams whose frequency is at least this fraction of the corpus length
    #[arg(long = "support", default_value_t = 1e-6)]
    support_threshold: real,

    /// Allowed undercount, as a fraction of the corpus length
    #[arg(long, default_value_t = 1e-7)]
    epsilon: real,
}

fn run(options: &Options) -> Result<()> {
    let counter = LossyCounter::new(
        options.max_ngram_size,
        options.support_threshold,
        options.epsilon,
        options.num_threads,
    )?;
    let corpus = read_corpus(&options.corpus_file)?;
    let counted = counter.count(&corpus)?;
    save_counts(&counted, &options.output_file)?;

    if let (Some(k), Some(path)) = (options.top, &options.top_output_file) {
        save_counts(&top(&counted, k), path)?;
    }
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
