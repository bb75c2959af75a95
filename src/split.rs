
use crate::error::WeatError;
use crate::files_handling::save_output;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::path::Path;
use tracing::info;


/// Shuffles `corpus` with a seeded rng and deals it round robin into `n` splits,
/// split `i` taking every n-th text starting at `i`.
pub fn shuffled_splits(mut corpus: Vec<String>, n: usize, seed: u64) -> Result<Vec<Vec<String>>, WeatError> {

    if n == 0 {
        return Err(WeatError::Configuration("number of splits must be positive".to_string()));
    }

    corpus.shuffle(&mut StdRng::seed_from_u64(seed));

    let mut splits: Vec<Vec<String>> = vec![Vec::new(); n];
    for (k, text) in corpus.into_iter().enumerate() {
        splits[k % n].push(text);
    }
    Ok(splits)
}

/// Writes the splits of `corpus` lower cased to `<output_dir>/splits/<filename>__split<i>.txt`.
pub fn split_corpus(corpus: Vec<String>, n: usize, output_dir: &str, filename: &str, seed: u64) -> Result<Vec<String>, WeatError> {

    let split_dir = Path::new(output_dir).join("splits").display().to_string();
    let mut written: Vec<String> = Vec::with_capacity(n);

    for (i, split) in shuffled_splits(corpus, n, seed)?.into_iter().enumerate() {
        let lines = split.iter().map(|text| text.to_lowercase()).collect::<Vec<String>>();
        let name = format!("{}__split{}", filename, i);
        save_output(&split_dir, &name, &lines)?;
        info!("wrote {} texts to {}/{}.txt", lines.len(), split_dir, name);
        written.push(format!("{}/{}.txt", split_dir, name));
    }

    Ok(written)
}
