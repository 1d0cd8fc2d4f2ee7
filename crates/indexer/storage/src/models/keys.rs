//! Custom table keys.

use derive_more::Display;
use reth_db::DatabaseError;
use reth_db_api::table;
use serde::{Deserialize, Serialize};

/// UTF-8 string key, used for per-source and named entries.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
pub struct StringKey(pub String);

impl From<&str> for StringKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl table::Encode for StringKey {
    type Encoded = Vec<u8>;

    fn encode(self) -> Self::Encoded {
        self.0.into_bytes()
    }
}

impl table::Decode for StringKey {
    fn decode(value: &[u8]) -> Result<Self, DatabaseError> {
        String::from_utf8(value.to_vec()).map(Self).map_err(|_| DatabaseError::Decode)
    }
}

/// Position of a log on chain: `(block_number, log_index)`.
///
/// Encoded as 16 big-endian bytes so the byte order of keys matches the numeric order of
/// positions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[display("{block_number}:{log_index}")]
pub struct LogPosition {
    /// Block the log was emitted in.
    pub block_number: u64,
    /// Index of the log within the block.
    pub log_index: u64,
}

impl LogPosition {
    /// Creates a new [`LogPosition`].
    pub const fn new(block_number: u64, log_index: u64) -> Self {
        Self { block_number, log_index }
    }

    /// The first position of `block_number`.
    pub const fn block_start(block_number: u64) -> Self {
        Self::new(block_number, 0)
    }
}

impl table::Encode for LogPosition {
    type Encoded = [u8; 16];

    fn encode(self) -> Self::Encoded {
        let mut buf = [0u8; 16];
        buf[..8].copy_from_slice(&self.block_number.to_be_bytes());
        buf[8..].copy_from_slice(&self.log_index.to_be_bytes());
        buf
    }
}

impl table::Decode for LogPosition {
    fn decode(value: &[u8]) -> Result<Self, DatabaseError> {
        let (block, index) = value.split_first_chunk::<8>().ok_or(DatabaseError::Decode)?;
        let index: [u8; 8] = index.try_into().map_err(|_| DatabaseError::Decode)?;
        Ok(Self::new(u64::from_be_bytes(*block), u64::from_be_bytes(index)))
    }
}
