use std::path::PathBuf;

use clap::Parser;

use tweet_threads::ingest::{self, IngestConfig};

#[derive(Parser, Debug)]
#[command(
    name = "tweet-threads",
    about = "Reconstruct conversation threads from a tweet reply relation"
)]
struct Args {
    /// JSON-lines edge relation (defaults to TWEET_SRC_URL).
    #[arg(long)]
    source: Option<PathBuf>,

    /// Staging directory for conversation batches (defaults to STAGING_PATH or `output`).
    #[arg(long)]
    staging_path: Option<PathBuf>,

    /// Fail when the fixed point is not reached within this many rounds.
    #[arg(long)]
    max_rounds: Option<usize>,

    /// Reconstruct connected components in parallel.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for parallel mode.
    #[arg(long)]
    workers: Option<usize>,
}

fn resolve_config(args: Args) -> Result<IngestConfig, Box<dyn std::error::Error>> {
    let mut config = IngestConfig::from_env_with_source(args.source)?;

    if let Some(staging_path) = args.staging_path {
        config.staging_path = staging_path;
    }
    if let Some(max_rounds) = args.max_rounds {
        config.threading.max_rounds = max_rounds;
    }
    if args.parallel {
        config.threading.parallel = true;
    }
    if let Some(workers) = args.workers {
        config.threading.worker_threads = workers.max(1);
    }

    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tweet_threads::init_logger();

    let config = resolve_config(Args::parse())?;
    log::info!("starting ingestion");

    let summary = match ingest::run(&config) {
        Ok(summary) => summary,
        Err(err) => {
            log::error!("ingestion failed: {}", err);
            return Err(err.into());
        }
    };

    println!(
        "{} messages, {} conversations in {} rounds ({} batches staged in {})",
        summary.messages,
        summary.stats.conversations,
        summary.stats.rounds,
        summary.staged.len(),
        config.staging_path.display()
    );
    Ok(())
}
