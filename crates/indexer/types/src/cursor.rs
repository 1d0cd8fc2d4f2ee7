use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Durable ingestion progress of a single source.
///
/// `start_block` is the next block to fetch and `end_block` the last block whose logs have been
/// persisted. The two always satisfy `start_block <= end_block + 1`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, Serialize, Deserialize,
)]
#[display("start: {start_block}, end: {end_block}")]
pub struct Cursor {
    /// Next block to fetch.
    pub start_block: u64,
    /// Last processed block.
    pub end_block: u64,
}

impl Cursor {
    /// Creates the cursor of a source that has not processed any block yet.
    pub const fn fresh(start_block: u64) -> Self {
        Self { start_block, end_block: start_block.saturating_sub(1) }
    }

    /// Returns the cursor after the chunk ending at `chunk_end` has been persisted.
    pub const fn advanced_to(self, chunk_end: u64) -> Self {
        Self { start_block: chunk_end.saturating_add(1), end_block: chunk_end }
    }

    /// Returns the cursor after a reorg invalidated every block at or above `reorg_block`.
    ///
    /// Blocks below the cursor that were never processed stay unprocessed, so the new end is
    /// `min(reorg_block - 1, end_block)`.
    pub fn rewound_to(self, reorg_block: u64) -> Self {
        Self::fresh(self.start_block.min(reorg_block))
    }

    /// Whether the logs of `block` have been persisted.
    ///
    /// Decided on `start_block` alone: a fresh cursor at block 0 reports `end_block == 0` while
    /// nothing was processed yet.
    pub const fn has_processed(&self, block: u64) -> bool {
        block < self.start_block
    }

    /// Whether the invariant `start_block <= end_block + 1` holds.
    pub const fn is_consistent(&self) -> bool {
        self.start_block <= self.end_block.saturating_add(1)
    }
}

/// Inclusive block range fetched with a single RPC call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display("[{start}, {end}]")]
pub struct ChunkRange {
    /// First block of the chunk.
    pub start: u64,
    /// Last block of the chunk.
    pub end: u64,
}

impl ChunkRange {
    /// Creates a new [`ChunkRange`].
    pub const fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Number of blocks covered by the chunk.
    pub const fn len(&self) -> u64 {
        if self.is_empty() { 0 } else { (self.end - self.start).saturating_add(1) }
    }

    /// Whether the chunk covers no block at all.
    pub const fn is_empty(&self) -> bool {
        self.end < self.start
    }
}
