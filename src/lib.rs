mod error;
mod files_handling;
pub mod config;
pub mod lexicon;
pub mod pipeline;
pub mod similarity;
pub mod split;
pub mod weat;
pub mod word_vectors;

pub use config::{Config, RunParams};
pub use error::WeatError;
pub use files_handling::{read_input, save_output, ReadFile, SaveFile, VectorTable};
pub use pipeline::{Pipeline, TestOutcome};
pub use weat::{weat_score, WeatScore};
pub use word_vectors::{VectorGetter, WordVectors};

/// Installs the fmt subscriber used by the binaries. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "weat_eval=debug" } else { "weat_eval=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}
