use alloy_eips::BlockNumberOrTag;
use alloy_primitives::{Address, B256};
use kona_indexer_types::{SourceId, SourceKind};
use std::{num::NonZeroU64, time::Duration};

/// Static configuration of one [`IngestionDriver`](super::IngestionDriver).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Stable identifier of the source.
    pub source_id: SourceId,
    /// Ingestion class, selects the reorg channel.
    pub kind: SourceKind,
    /// Contract emitting the ingested events.
    pub address: Address,
    /// Signature of the ingested event.
    pub topic0: B256,
    /// First block to ingest when the source has no cursor yet.
    pub start_block: u64,
    /// Maximum number of blocks fetched with a single `eth_getLogs` call.
    pub max_range_size: NonZeroU64,
    /// Target duration of a cycle once the source caught up with the chain head.
    pub poll_interval: Duration,
    /// Block tag used as the upper bound of every cycle.
    pub head_tag: BlockNumberOrTag,
    /// Last block to ingest. Once reached the source is stopped permanently.
    pub stop_at_block: Option<u64>,
}
