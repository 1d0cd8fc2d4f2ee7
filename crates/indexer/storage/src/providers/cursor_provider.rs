//! Ingestion cursor bookkeeping.
//!
//! Every write goes through [`Cursor`]'s own transitions so the stored value keeps
//! `start_block <= end_block + 1`.

use crate::{
    error::StorageError,
    models::{CursorEntry, IngestionCursors, StringKey},
};
use kona_indexer_types::{ChunkRange, Cursor, SourceId};
use reth_db_api::transaction::{DbTx, DbTxMut};
use tracing::{debug, error, info};

#[derive(Debug)]
pub(crate) struct CursorProvider<'tx, TX> {
    tx: &'tx TX,
    source_id: &'tx SourceId,
}

impl<'tx, TX> CursorProvider<'tx, TX> {
    pub(crate) const fn new(tx: &'tx TX, source_id: &'tx SourceId) -> Self {
        Self { tx, source_id }
    }

    fn key(&self) -> StringKey {
        StringKey::from(self.source_id.as_str())
    }
}

impl<TX> CursorProvider<'_, TX>
where
    TX: DbTx,
{
    pub(crate) fn get_cursor(&self) -> Result<Option<Cursor>, StorageError> {
        let entry = self.tx.get::<IngestionCursors>(self.key()).inspect_err(|err| {
            error!(
                target: "indexer::storage",
                source_id = %self.source_id,
                %err,
                "Failed to read cursor"
            );
        })?;
        Ok(entry.map(Into::into))
    }

    fn require_cursor(&self) -> Result<Cursor, StorageError> {
        self.get_cursor()?
            .ok_or_else(|| StorageError::CursorNotInitialised(self.source_id.to_string()))
    }
}

impl<TX> CursorProvider<'_, TX>
where
    TX: DbTxMut + DbTx,
{
    /// Returns the stored cursor, creating a fresh one at `initial_start` if none exists.
    pub(crate) fn load_or_init(&self, initial_start: u64) -> Result<Cursor, StorageError> {
        if let Some(cursor) = self.get_cursor()? {
            debug!(target: "indexer::storage", source_id = %self.source_id, %cursor, "Loaded cursor");
            return Ok(cursor);
        }

        let cursor = Cursor::fresh(initial_start);
        info!(
            target: "indexer::storage",
            source_id = %self.source_id,
            %cursor,
            "Initialising cursor"
        );
        self.put_cursor(cursor)?;
        Ok(cursor)
    }

    /// Marks every block up to `end_block` as processed.
    pub(crate) fn advance(&self, end_block: u64) -> Result<Cursor, StorageError> {
        let current = self.require_cursor()?;
        if end_block < current.end_block {
            error!(
                target: "indexer::storage",
                source_id = %self.source_id,
                current = %current,
                requested = end_block,
                "Refusing to move cursor backwards"
            );
            return Err(StorageError::CursorRegression {
                current: current.end_block,
                requested: end_block,
            });
        }

        let cursor = current.advanced_to(end_block);
        self.put_cursor(cursor)?;
        Ok(cursor)
    }

    /// Moves the cursor past `chunk` if the chunk covers unprocessed blocks.
    ///
    /// Re-applying an already processed chunk leaves the cursor untouched, a chunk starting
    /// beyond the cursor is rejected.
    pub(crate) fn advance_past(&self, chunk: ChunkRange) -> Result<Cursor, StorageError> {
        let current = self.require_cursor()?;
        if chunk.start > current.start_block {
            error!(
                target: "indexer::storage",
                source_id = %self.source_id,
                current = %current,
                %chunk,
                "Chunk would leave a gap behind the cursor"
            );
            return Err(StorageError::CursorGap {
                cursor_start: current.start_block,
                chunk_start: chunk.start,
            });
        }

        if chunk.end < current.start_block {
            debug!(
                target: "indexer::storage",
                source_id = %self.source_id,
                current = %current,
                %chunk,
                "Chunk already processed, cursor unchanged"
            );
            return Ok(current);
        }

        let cursor = current.advanced_to(chunk.end);
        self.put_cursor(cursor)?;
        Ok(cursor)
    }

    /// Rewinds the cursor so every block at or above `reorg_block` is processed again.
    pub(crate) fn rewind(&self, reorg_block: u64) -> Result<Cursor, StorageError> {
        let current = self.require_cursor()?;
        let cursor = current.rewound_to(reorg_block);
        self.put_cursor(cursor)?;
        Ok(cursor)
    }

    fn put_cursor(&self, cursor: Cursor) -> Result<(), StorageError> {
        self.tx.put::<IngestionCursors>(self.key(), CursorEntry::from(cursor)).inspect_err(
            |err| {
                error!(
                    target: "indexer::storage",
                    source_id = %self.source_id,
                    %cursor,
                    %err,
                    "Failed to write cursor"
                );
            },
        )?;
        Ok(())
    }
}
