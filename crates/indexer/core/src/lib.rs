//! Continuous, chunked log ingestion.
//!
//! One [`IngestionDriver`] runs per ingestion source. Every cycle it reads the chain head,
//! splits the unprocessed range with [`chunk_range`], fetches each chunk through a
//! [`ResilientRpc`], decodes the logs with a [`DecoderRegistry`] and commits them together with
//! the cursor advance. Reorg signals are delivered through a [`ReorgRouter`] and checked between
//! chunks; a [`HeadWatcher`] produces them by tracking the parent hashes of the chain head.

mod chunker;
pub use chunker::{ChunkIter, chunk_range};

pub mod rpc;
pub use rpc::{AlloyChainRpc, ChainRpc, ResilientRpc, RetryPolicy, RpcError};

pub mod decoder;
pub use decoder::{DecodeError, DecoderRegistry, EventDecoder, event_signature};

pub mod reorg;
pub use reorg::{HeadWatcher, HeadWatcherConfig, ReorgInbox, ReorgRouter, SharedInbox};

mod driver;
pub use driver::{DriverConfig, DriverError, DriverExit, IngestionDriver, poll_delay};

#[cfg(test)]
pub(crate) mod test_utils;
