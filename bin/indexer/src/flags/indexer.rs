use anyhow::{Context as _, Result};
use clap::{ArgAction, Args};
use kona_indexer_core::{HeadWatcherConfig, RetryPolicy};
use kona_indexer_service::{IndexerConfig, RestartPolicy, load_sources};
use std::{path::PathBuf, time::Duration};

/// Indexer configuration arguments.
#[derive(Args, Debug, Clone)]
pub struct IndexerArgs {
    /// Directory to store indexer data.
    #[arg(long, env = "DATADIR")]
    pub datadir: PathBuf,

    /// Path to the TOML file declaring the ingestion sources.
    #[arg(long, env = "SOURCES")]
    pub sources: PathBuf,

    /// Delay before the first retry of a failed RPC call, in milliseconds.
    #[arg(long = "retry.min-delay-ms", env = "RETRY_MIN_DELAY_MS", default_value_t = 500)]
    pub retry_min_delay_ms: u64,

    /// Upper bound of the delay between two RPC retries, in milliseconds.
    #[arg(long = "retry.max-delay-ms", env = "RETRY_MAX_DELAY_MS", default_value_t = 30_000)]
    pub retry_max_delay_ms: u64,

    /// Maximum number of retries of a failed RPC call. Unbounded when unset.
    #[arg(long = "retry.max-attempts", env = "RETRY_MAX_ATTEMPTS")]
    pub retry_max_attempts: Option<usize>,

    /// Deadline of a single RPC call, in seconds.
    #[arg(long = "retry.request-timeout-secs", env = "RETRY_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub retry_request_timeout_secs: u64,

    /// Maximum number of consecutive restarts of a failing source. Unbounded when unset.
    #[arg(long = "restart.max-restarts", env = "RESTART_MAX_RESTARTS")]
    pub max_restarts: Option<usize>,

    /// Follow the chain heads to detect reorgs.
    #[arg(
        long = "watcher.enabled",
        env = "WATCHER_ENABLED",
        default_value_t = true,
        action = ArgAction::Set
    )]
    pub watcher_enabled: bool,

    /// Interval between two head queries of a watcher, in seconds.
    #[arg(long = "watcher.poll-interval-secs", env = "WATCHER_POLL_INTERVAL_SECS", default_value_t = 12)]
    pub watcher_poll_interval_secs: u64,

    /// Number of recent heads kept to locate the common ancestor of a reorg.
    #[arg(long = "watcher.depth", env = "WATCHER_DEPTH", default_value_t = 64)]
    pub watcher_depth: usize,
}

impl IndexerArgs {
    /// Builds the [`RetryPolicy`] of every RPC call.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            min_delay: Duration::from_millis(self.retry_min_delay_ms),
            max_delay: Duration::from_millis(self.retry_max_delay_ms),
            max_attempts: self.retry_max_attempts,
            request_timeout: Duration::from_secs(self.retry_request_timeout_secs),
            ..Default::default()
        }
    }

    /// Builds the head watcher configuration, `None` when disabled.
    pub fn watcher_config(&self) -> Option<HeadWatcherConfig> {
        self.watcher_enabled.then(|| HeadWatcherConfig {
            poll_interval: Duration::from_secs(self.watcher_poll_interval_secs),
            depth: self.watcher_depth,
            ..Default::default()
        })
    }

    /// Loads the sources file and returns the indexer [`IndexerConfig`].
    pub fn init_config(&self, metrics_enabled: bool) -> Result<IndexerConfig> {
        let sources = load_sources(&self.sources).with_context(|| {
            format!("Failed to load sources from '{}'", self.sources.display())
        })?;

        Ok(IndexerConfig::new(
            self.datadir.clone(),
            metrics_enabled,
            sources,
            self.retry_policy(),
            self.watcher_config(),
            RestartPolicy::Transient,
            self.max_restarts,
        ))
    }
}
