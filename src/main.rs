use anyhow::{Context, Result};
use clap::Parser;
use weat_eval::{init_tracing, Config, Pipeline};

/// Scores a corpus of WEAT tests against one embedding backend and checks
/// the results against their reference scores.
#[derive(Parser)]
#[command(name = "weat", version, about)]
struct Cli {
    /// Path to the run parameters json
    config: String,

    /// Log every OOV token and fallback lookup
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let params = Config::new(&cli.config)
        .with_context(|| format!("could not build parameters from {}", cli.config))?
        .get_params();

    let outcomes = Pipeline::run(&params).context("WEAT run failed")?;

    for outcome in &outcomes {
        match (outcome.score, &outcome.error) {
            (Some(score), _) => println!("{}\t{:.4}\t{}", outcome.test, score,
                outcome.reference.map(|r| format!("{:.4}", r)).unwrap_or_else(|| "-".to_string())),
            (None, Some(e)) => println!("{}\terror\t{}", outcome.test, e),
            (None, None) => {},
        }
    }

    Pipeline::check(&outcomes, params.tolerance)?;
    Ok(())
}
