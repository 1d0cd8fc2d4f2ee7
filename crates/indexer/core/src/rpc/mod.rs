//! Access to the chain over JSON-RPC.
//!
//! [`ChainRpc`] is the narrow capability the ingestion driver consumes. [`AlloyChainRpc`]
//! implements it over an alloy provider and [`ResilientRpc`] wraps any implementation with the
//! retry and cancellation contract of the indexer.

use alloy_eips::BlockNumberOrTag;
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use auto_impl::auto_impl;
use kona_indexer_types::{BlockRef, ChunkRange, RawLog};
use std::fmt::Debug;

mod client;
pub use client::AlloyChainRpc;

mod error;
pub use error::RpcError;

mod retry;
pub use retry::{ResilientRpc, RetryPolicy};

mod metrics;
pub(crate) use metrics::Metrics;

/// Chain queries needed to ingest logs and follow the chain head.
#[async_trait]
#[auto_impl(&, Arc)]
pub trait ChainRpc: Debug + Send + Sync {
    /// Returns the logs emitted by `address` with signature `topic0` within `range`, ordered by
    /// block number and log index.
    async fn get_logs(
        &self,
        range: ChunkRange,
        address: Address,
        topic0: B256,
    ) -> Result<Vec<RawLog>, RpcError>;

    /// Resolves `tag` to a block number.
    async fn get_block_number(&self, tag: BlockNumberOrTag) -> Result<u64, RpcError>;

    /// Fetches the number, hash and parent hash of the block identified by `tag`.
    async fn get_block_ref(&self, tag: BlockNumberOrTag) -> Result<BlockRef, RpcError>;
}
