use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::Path;
use weat_eval::init_tracing;
use weat_eval::split::split_corpus;

// splits a prepared corpus (one text per line) into n random parts, so
// embeddings can be trained and scored on each part independently.
// treated as binary executable so it can be ran independently from main

#[derive(Parser)]
#[command(name = "split_corpus", version, about = "Split a corpus into random parts")]
struct Cli {
    /// Corpus file, one text per line
    corpus: String,

    /// Number of splits to write
    n: usize,

    /// Directory to create the `splits` folder in
    output_dir: String,

    /// Base name of the split files, defaults to the corpus file stem
    #[arg(long)]
    filename: Option<String>,

    /// Seed of the shuffle
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() -> Result<()> {

    init_tracing(false);
    let cli = Cli::parse();

    let text = fs::read_to_string(&cli.corpus).with_context(|| format!("could not read {}", cli.corpus))?;
    let corpus = text.lines().filter(|l| !l.trim().is_empty()).map(str::to_owned).collect::<Vec<String>>();

    let filename = match cli.filename {
        Some(filename) => filename,
        None => Path::new(&cli.corpus)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("corpus")
            .to_owned(),
    };

    let written = split_corpus(corpus, cli.n, &cli.output_dir, &filename, cli.seed)?;
    for path in written {
        println!("{}", path);
    }
    Ok(())
}
