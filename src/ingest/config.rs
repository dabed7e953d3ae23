use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::threading::ReconstructionConfig;
use crate::threading::config::DEFAULT_MAX_ROUNDS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_path(key: &str, default: &str) -> PathBuf {
    env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

/// Configuration for one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// JSON-lines edge relation to read
    pub source_path: PathBuf,
    /// Directory receiving the staged conversation batches
    pub staging_path: PathBuf,
    pub threading: ReconstructionConfig,
}

impl IngestConfig {
    pub fn new(source_path: impl Into<PathBuf>, staging_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            staging_path: staging_path.into(),
            threading: ReconstructionConfig::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with_source(None)
    }

    /// Like `from_env`, but an explicit `source` takes precedence over `TWEET_SRC_URL`.
    pub fn from_env_with_source(source: Option<PathBuf>) -> Result<Self, ConfigError> {
        let source_path = match source {
            Some(path) => path,
            None => env::var("TWEET_SRC_URL")
                .map(PathBuf::from)
                .map_err(|_| ConfigError::Missing("TWEET_SRC_URL"))?,
        };

        let threading = ReconstructionConfig {
            max_rounds: env_usize("THREADING_MAX_ROUNDS", DEFAULT_MAX_ROUNDS),
            parallel: env_bool("THREADING_PARALLEL", false),
            worker_threads: env_usize("THREADING_WORKERS", num_cpus::get()).max(1),
        };

        Ok(Self {
            source_path,
            staging_path: env_path("STAGING_PATH", "output"),
            threading,
        })
    }
}
