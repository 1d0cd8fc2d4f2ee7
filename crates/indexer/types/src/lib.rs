//! Core types shared across the indexer components.
//!
//! This crate defines the plain data structures moved between the fetch loop,
//! the event decoders and the storage layer of the log indexer.

mod source;
pub use source::{ParseSourceKindError, SourceId, SourceKind};

mod cursor;
pub use cursor::{ChunkRange, Cursor};

mod log;
pub use log::{BlockRef, RawLog};

mod record;
pub use record::{DecodedRecord, OutputProposal, ProvenWithdrawal};

mod reorg;
pub use reorg::{ReorgSignal, ReorgTopic};
