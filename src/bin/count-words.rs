use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;

use sgns_wne::corpus::read_corpus;
use sgns_wne::words::{read_boundaries, save_counts, top};
use sgns_wne::ExpectedWordCounter;

/// Count the expected word frequency of substrings and save the most word-like ones
#[derive(Parser)]
struct Options {
    /// Count substrings of the text in FILE
    #[arg(long = "corpus", value_name = "FILE")]
    corpus_file: PathBuf,

    /// Read the word boundary probability before each corpus character from FILE, one per line
    #[arg(long = "boundaries", value_name = "FILE")]
    boundary_file: PathBuf,

    /// Save the most word-like substrings with their expected counts to FILE
    #[arg(long = "output", value_name = "FILE")]
    output_file: PathBuf,

    /// Count substrings of every length up to N
    #[arg(long = "max-word-length", value_name = "N", default_value_t = 8)]
    max_word_len: usize,

    /// Keep at most N substrings of each length, and save the N best overall
    #[arg(long = "extract-num", value_name = "N")]
    extract_num: usize,

    /// Use N threads
    #[arg(long = "threads", value_name = "N", default_value_t = 1)]
    num_threads: usize,
}

fn run(options: &Options) -> Result<()> {
    let counter = ExpectedWordCounter::new(
        options.max_word_len,
        options.extract_num,
        options.num_threads,
    )?;
    let corpus = read_corpus(&options.corpus_file)?;
    let boundaries = read_boundaries(&options.boundary_file)?;
    let counted = counter.count(&corpus, &boundaries)?;
    save_counts(&top(&counted, options.extract_num), &options.output_file)
}

fn main() {
    sgns_wne::init_tracing();

    let options = Options::parse();
    if let Err(err) = run(&options) {
        eprintln!("{err:#}");
        process::exit(1);
    }
}
