//! This crate provides the runnable service layer of the log indexer.
//! It wires the ingestion drivers, the head watchers and the metric reporter of every configured
//! source and supervises them.

mod config;
pub use config::{
    ConfigError, DEFAULT_MAX_RANGE_SIZE, DEFAULT_POLL_INTERVAL_SECS, HeadTag, IndexerConfig,
    SourceConfig, load_sources, parse_sources,
};

mod error;
pub use error::ServiceError;

mod service;
pub use service::Service;

mod actors;
pub use actors::{IndexerActor, MetricWorker, RestartPolicy, SourceActor};
