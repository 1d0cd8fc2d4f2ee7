//! Persistent storage for the log indexer.
//!
//! This crate materializes decoded chain events into [`reth-db`] (MDBX) environments,
//! one environment per ingestion source plus a shared settings environment.
//!
//! It persists:
//! - Output root proposals, keyed by their oracle index
//! - Proven withdrawals, keyed by `(block number, log index)`
//! - The ingestion cursor of every source
//! - Process wide boolean flags such as the stop flag of a source
//!
//! ## Guarantees
//!
//! - A batch import and the matching cursor advance commit in a single transaction
//! - Re-importing a batch overwrites rows by natural key and never duplicates them
//! - A rollback deletes every row at or above the reorg block and rewinds the cursor atomically

pub mod models;

mod error;
pub use error::StorageError;

mod providers;

mod sourcedb;
pub use sourcedb::SourceDb;

mod settingsdb;
pub use settingsdb::SettingsDb;

mod metrics;
pub(crate) use metrics::Metrics;

mod factory;
pub use factory::SourceDbFactory;

mod traits;
pub use traits::{
    CursorStorage, IngestionStorage, RecordImporter, RecordReader, RollbackOutcome,
    StopFlagStorage, StorageRewinder,
};
