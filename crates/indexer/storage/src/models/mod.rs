//! Database table schemas used by the indexer.
//!
//! This module defines the value types, keys, and table layouts for all data
//! persisted by the indexer.
//!
//! The tables are registered using [`reth_db_api::table::TableInfo`] and grouped into a
//! [`reth_db_api::TableSet`] for database initialization via Reth's storage-api.

use reth_db_api::{
    TableSet, TableType, TableViewer,
    table::{DupSort, TableInfo},
    tables,
};
use std::fmt;

mod keys;
pub use keys::{LogPosition, StringKey};

mod records;
pub use records::{OutputProposalEntry, ProvenWithdrawalEntry};

mod progress;
pub use progress::{CursorEntry, FlagEntry};

/// Implements [`reth_db_api::table::Compress`] and [`reth_db_api::table::Decompress`] for
/// types that implement [`reth_codecs::Compact`].
macro_rules! impl_compression_for_compact {
    ($($name:ident),+) => {
        $(
            impl reth_db_api::table::Compress for $name {
                type Compressed = Vec<u8>;

                fn compress_to_buf<B: bytes::BufMut + AsMut<[u8]>>(&self, buf: &mut B) {
                    let _ = reth_codecs::Compact::to_compact(self, buf);
                }
            }

            impl reth_db_api::table::Decompress for $name {
                fn decompress(value: &[u8]) -> Result<Self, reth_db_api::DatabaseError> {
                    let (obj, _) = reth_codecs::Compact::from_compact(value, value.len());
                    Ok(obj)
                }
            }
        )+
    };
}

impl_compression_for_compact!(OutputProposalEntry, ProvenWithdrawalEntry, CursorEntry, FlagEntry);

tables! {
    /// Output root proposals keyed by their index in the `L2OutputOracle`.
    /// - Key: `u64`: l2 output index
    /// - Value: [`OutputProposalEntry`]
    table OutputProposals {
        type Key = u64;
        type Value = OutputProposalEntry;
    }

    /// Proven withdrawals keyed by the position of the proving log on L1.
    /// - Key: [`LogPosition`]: big-endian `(block number, log index)`, so a walk from
    ///   `(n, 0)` visits exactly the rows emitted at or above block `n`.
    /// - Value: [`ProvenWithdrawalEntry`]
    table ProvenWithdrawals {
        type Key = LogPosition;
        type Value = ProvenWithdrawalEntry;
    }

    /// Ingestion progress per source.
    /// - Key: [`StringKey`]: source id
    /// - Value: [`CursorEntry`]
    table IngestionCursors {
        type Key = StringKey;
        type Value = CursorEntry;
    }

    /// Named boolean flags, e.g. the stop flag of a source.
    /// - Key: [`StringKey`]: flag name
    /// - Value: [`FlagEntry`]
    table Flags {
        type Key = StringKey;
        type Value = FlagEntry;
    }
}
