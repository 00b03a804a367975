use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use sgns_wne::corpus::{read_text_lossy, visualize_whitespace};

/// Join a text into one line, replacing whitespace runs with '␣'
#[derive(Parser)]
struct Options {
    /// Read raw text from FILE
    #[arg(long = "corpus", value_name = "FILE")]
    corpus_file: PathBuf,

    /// Write the processed corpus to FILE
    #[arg(long = "output", value_name = "FILE")]
    output_file: PathBuf,
}

fn run(options: &Options) -> Result<()> {
    let text = read_text_lossy(&options.corpus_file)?;
    let processed = visualize_whitespace(&text);
    fs::write(&options.output_file, &processed).context("error writing output file")?;
    info!(
        "wrote {} characters to {}",
        processed.chars().count(),
        options.output_file.display()
    );
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
