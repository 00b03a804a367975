use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use sgns_wne::{normalize, Vectors};

/// Show the substrings closest to a query, by cosine similarity of word vectors
#[derive(Parser)]
struct Options {
    /// Vector file written by `sgns-wne`
    #[arg(value_name = "FILE")]
    file_name: PathBuf,

    /// Number of closest substrings to show
    #[arg(short, default_value_t = 40)]
    n: usize,
}

fn run(options: &Options) -> Result<()> {
    let vectors = Vectors::load(&options.file_name)?;
    let stdin = io::stdin();
    let mut input = stdin.lock();

    'outer: loop {
        print!("Enter substrings separated by spaces (EXIT to break): ");
        io::stdout().flush().context("error writing to stdout")?;

        let mut line = String::new();
        if input.read_line(&mut line).context("error reading stdin")? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line == "EXIT" {
            break;
        }

        let mut bi: Vec<usize> = vec![];
        for query in line.split_whitespace() {
            match vectors.lookup_word(query) {
                None => {
                    println!("{query}: out of vocabulary");
                    continue 'outer;
                }
                Some(i) => {
                    println!("{query}: position in vocabulary {i}");
                    bi.push(i);
                }
            }
        }
        if bi.is_empty() {
            continue;
        }

        let mut query = vec![0.0; vectors.size()];
        for &i in &bi {
            for (q, r) in query.iter_mut().zip(vectors[i].iter().copied()) {
                *q += r;
            }
        }
        normalize(&mut query);

        println!();
        println!("                                         Substring       Cosine similarity");
        println!("------------------------------------------------------------------------");
        for (word, sim) in vectors.nearest(&query, &bi, options.n) {
            println!("{:50}\t\t{}", word, sim);
        }
    }
    Ok(())
}

fn main() {
    let options = Options::parse();
    if let Err(err) = run(&options) {
        eprintln!("{err:#}");
        process::exit(1);
    }
}
