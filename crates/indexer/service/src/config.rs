use alloy_eips::BlockNumberOrTag;
use alloy_primitives::Address;
use derive_more::Constructor;
use kona_indexer_core::{DriverConfig, HeadWatcherConfig, RetryPolicy, event_signature};
use kona_indexer_types::{ReorgTopic, SourceId, SourceKind};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet, HashSet},
    num::NonZeroU64,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use url::Url;

use crate::RestartPolicy;

/// Default number of blocks fetched with a single `eth_getLogs` call.
pub const DEFAULT_MAX_RANGE_SIZE: NonZeroU64 = NonZeroU64::MIN.saturating_add(999);

/// Default target duration of a cycle once a source caught up, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 12;

/// Configuration for the indexer service.
#[derive(Debug, Clone, Constructor)]
pub struct IndexerConfig {
    /// Directory where the database files are stored.
    pub datadir: PathBuf,

    /// Whether metrics are recorded.
    pub metrics_enabled: bool,

    /// The ingestion sources.
    pub sources: Vec<SourceConfig>,

    /// Retry schedule of every RPC call.
    pub retry: RetryPolicy,

    /// Head watcher settings, `None` disables reorg detection.
    pub watcher: Option<HeadWatcherConfig>,

    /// Restart policy of the ingestion drivers.
    pub restart_policy: RestartPolicy,

    /// Maximum number of consecutive driver restarts, `None` for unbounded.
    pub max_restarts: Option<usize>,
}

impl IndexerConfig {
    /// Checks the source table for duplicate identifiers and inconsistent block bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_sources(&self.sources)
    }

    /// Groups the source kinds by RPC endpoint. One head watcher runs per endpoint.
    pub fn watched_kinds(&self) -> BTreeMap<Url, BTreeSet<SourceKind>> {
        let mut watched: BTreeMap<Url, BTreeSet<SourceKind>> = BTreeMap::new();
        for source in &self.sources {
            watched.entry(source.rpc_url.clone()).or_default().insert(source.kind);
        }
        watched
    }
}

/// Chain head followed by a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadTag {
    /// The most recent block.
    #[default]
    Latest,
    /// The most recent block considered safe.
    Safe,
    /// The most recent finalized block. Immune to reorgs.
    Finalized,
}

impl From<HeadTag> for BlockNumberOrTag {
    fn from(tag: HeadTag) -> Self {
        match tag {
            HeadTag::Latest => Self::Latest,
            HeadTag::Safe => Self::Safe,
            HeadTag::Finalized => Self::Finalized,
        }
    }
}

/// One ingestion source, as declared in the sources file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Stable identifier of the source.
    pub id: SourceId,
    /// Ingested event class.
    pub kind: SourceKind,
    /// JSON-RPC endpoint of the chain.
    pub rpc_url: Url,
    /// Contract emitting the events.
    pub address: Address,
    /// First block to ingest.
    pub start_block: u64,
    /// Maximum number of blocks per `eth_getLogs` call.
    #[serde(default = "default_max_range_size")]
    pub max_range_size: NonZeroU64,
    /// Target duration of a cycle once caught up, in seconds.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Chain head followed by the source.
    #[serde(default)]
    pub head_tag: HeadTag,
    /// Last block to ingest.
    #[serde(default)]
    pub stop_at_block: Option<u64>,
}

const fn default_max_range_size() -> NonZeroU64 {
    DEFAULT_MAX_RANGE_SIZE
}

const fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl SourceConfig {
    /// Returns the driver configuration of this source.
    pub fn to_driver_config(&self) -> DriverConfig {
        DriverConfig {
            source_id: self.id.clone(),
            kind: self.kind,
            address: self.address,
            topic0: event_signature(self.kind),
            start_block: self.start_block,
            max_range_size: self.max_range_size,
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            head_tag: self.head_tag.into(),
            stop_at_block: self.stop_at_block,
        }
    }

    /// The reorg channel of this source: its kind on its own endpoint.
    pub fn reorg_topic(&self) -> ReorgTopic {
        ReorgTopic::new(self.rpc_url.clone(), self.kind)
    }
}

/// Layout of the sources file: a list of `[[source]]` tables.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SourcesFile {
    #[serde(default)]
    source: Vec<SourceConfig>,
}

/// Parses and validates a sources file.
pub fn parse_sources(contents: &str) -> Result<Vec<SourceConfig>, ConfigError> {
    let file: SourcesFile = toml::from_str(contents)?;
    validate_sources(&file.source)?;
    Ok(file.source)
}

/// Reads, parses and validates the sources file at `path`.
pub fn load_sources(path: &Path) -> Result<Vec<SourceConfig>, ConfigError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
    parse_sources(&contents)
}

fn validate_sources(sources: &[SourceConfig]) -> Result<(), ConfigError> {
    if sources.is_empty() {
        return Err(ConfigError::NoSources);
    }

    let mut seen = HashSet::new();
    for source in sources {
        if !seen.insert(&source.id) {
            return Err(ConfigError::DuplicateSource(source.id.clone()));
        }
        if let Some(stop_at_block) = source.stop_at_block &&
            stop_at_block < source.start_block
        {
            return Err(ConfigError::InvalidStopBlock {
                source_id: source.id.clone(),
                start_block: source.start_block,
                stop_at_block,
            });
        }
    }
    Ok(())
}

/// Errors raised while loading the source table.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The sources file could not be read.
    #[error("failed to read sources file {path}: {source}")]
    Read {
        /// Path of the file.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The sources file is not valid TOML or does not match the expected layout.
    #[error("invalid sources file: {0}")]
    Parse(#[from] toml::de::Error),

    /// No source is configured.
    #[error("no ingestion source configured")]
    NoSources,

    /// Two sources share the same identifier.
    #[error("duplicate source id: {0}")]
    DuplicateSource(SourceId),

    /// The stop block of a source lies before its start block.
    #[error("source {source_id}: stop_at_block {stop_at_block} is below start_block {start_block}")]
    InvalidStopBlock {
        /// The offending source.
        source_id: SourceId,
        /// Configured first block.
        start_block: u64,
        /// Configured last block.
        stop_at_block: u64,
    },
}
