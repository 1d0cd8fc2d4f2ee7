//! Ingestion progress and flags.

use bytes::{Buf, BufMut};
use kona_indexer_types::Cursor;
use reth_codecs::Compact;
use serde::{Deserialize, Serialize};

/// Stored form of a [`Cursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CursorEntry {
    /// Next block to fetch.
    pub start_block: u64,
    /// Last processed block.
    pub end_block: u64,
}

impl Compact for CursorEntry {
    fn to_compact<B>(&self, buf: &mut B) -> usize
    where
        B: BufMut + AsMut<[u8]>,
    {
        buf.put_u64(self.start_block);
        buf.put_u64(self.end_block);
        16
    }

    fn from_compact(mut buf: &[u8], _len: usize) -> (Self, &[u8]) {
        let start_block = buf.get_u64();
        let end_block = buf.get_u64();
        (Self { start_block, end_block }, buf)
    }
}

impl From<Cursor> for CursorEntry {
    fn from(cursor: Cursor) -> Self {
        Self { start_block: cursor.start_block, end_block: cursor.end_block }
    }
}

impl From<CursorEntry> for Cursor {
    fn from(entry: CursorEntry) -> Self {
        Self { start_block: entry.start_block, end_block: entry.end_block }
    }
}

/// A durable boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FlagEntry {
    /// The flag value.
    pub value: bool,
}

impl Compact for FlagEntry {
    fn to_compact<B>(&self, buf: &mut B) -> usize
    where
        B: BufMut + AsMut<[u8]>,
    {
        buf.put_u8(self.value as u8);
        1
    }

    fn from_compact(mut buf: &[u8], _len: usize) -> (Self, &[u8]) {
        let value = buf.get_u8() != 0;
        (Self { value }, buf)
    }
}
