use crate::StorageError;
use kona_indexer_types::{ChunkRange, Cursor, DecodedRecord, OutputProposal, ProvenWithdrawal, SourceId};
use std::fmt::Debug;

/// Durable ingestion progress of a single source.
///
/// The cursor is owned by exactly one ingestion driver; implementations do not need to guard
/// against concurrent writers of the same source.
pub trait CursorStorage: Debug {
    /// Loads the cursor of the source, creating the fresh cursor `{initial_start,
    /// initial_start - 1}` if the source never ran before.
    fn load_cursor(&self, initial_start: u64) -> Result<Cursor, StorageError>;

    /// Marks every block up to and including `end_block` as processed.
    ///
    /// # Returns
    /// * `Ok(Cursor)` with the stored cursor.
    /// * `Err(StorageError::CursorRegression)` if `end_block` is below the stored end.
    fn advance_cursor(&self, end_block: u64) -> Result<Cursor, StorageError>;

    /// Rewinds the cursor so `reorg_block` and everything above it is fetched again.
    fn rewind_cursor(&self, reorg_block: u64) -> Result<Cursor, StorageError>;
}

/// Import gateway of decoded records.
pub trait RecordImporter: Debug {
    /// Upserts `records`, decoded from `chunk`, and moves the cursor past the chunk.
    ///
    /// The records and the cursor are written in a single transaction: either all of them are
    /// visible afterwards or none. Applying the same batch again is a no-op.
    fn import_batch(
        &self,
        records: &[DecodedRecord],
        chunk: ChunkRange,
    ) -> Result<Cursor, StorageError>;
}

/// Result of a successful rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollbackOutcome {
    /// Number of deleted rows.
    pub deleted_rows: usize,
    /// Cursor after the rewind.
    pub cursor: Cursor,
}

/// Reorg rollback of materialized rows.
pub trait StorageRewinder: Debug {
    /// Deletes every row emitted at or above `reorg_block` and rewinds the cursor, atomically.
    fn rollback(&self, reorg_block: u64) -> Result<RollbackOutcome, StorageError>;
}

/// Read access to the materialized rows of a source.
pub trait RecordReader: Debug {
    /// All stored output proposals, ordered by index.
    fn output_proposals(&self) -> Result<Vec<OutputProposal>, StorageError>;

    /// All stored proven withdrawals, ordered by log position.
    fn proven_withdrawals(&self) -> Result<Vec<ProvenWithdrawal>, StorageError>;

    /// Highest L1 block of any stored row, `None` if nothing was imported.
    fn latest_imported_block(&self) -> Result<Option<u64>, StorageError>;
}

/// Everything an ingestion driver needs from the storage of its source.
pub trait IngestionStorage: CursorStorage + RecordImporter + StorageRewinder + Send + Sync {}

impl<T> IngestionStorage for T where T: CursorStorage + RecordImporter + StorageRewinder + Send + Sync
{}

/// Process wide durable stop flags, keyed by source.
pub trait StopFlagStorage: Debug + Send + Sync {
    /// Whether ingestion of `source` was permanently stopped.
    fn is_stopped(&self, source: &SourceId) -> Result<bool, StorageError>;

    /// Sets or clears the stop flag of `source`.
    fn set_stopped(&self, source: &SourceId, stopped: bool) -> Result<(), StorageError>;
}
