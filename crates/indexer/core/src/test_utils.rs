//! Mocks of the capabilities consumed by the ingestion engine.

use crate::{ChainRpc, RpcError, event_signature};
use alloy_eips::BlockNumberOrTag;
use alloy_primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;
use kona_indexer_storage::{
    CursorStorage, RecordImporter, RollbackOutcome, StopFlagStorage, StorageError,
    StorageRewinder,
};
use kona_indexer_types::{
    BlockRef, ChunkRange, Cursor, DecodedRecord, RawLog, SourceId, SourceKind,
};
use mockall::mock;

mock!(
    #[derive(Debug)]
    pub Rpc {}

    #[async_trait]
    impl ChainRpc for Rpc {
        async fn get_logs(
            &self,
            range: ChunkRange,
            address: Address,
            topic0: B256,
        ) -> Result<Vec<RawLog>, RpcError>;
        async fn get_block_number(&self, tag: BlockNumberOrTag) -> Result<u64, RpcError>;
        async fn get_block_ref(&self, tag: BlockNumberOrTag) -> Result<BlockRef, RpcError>;
    }
);

mock!(
    #[derive(Debug)]
    pub Storage {}

    impl CursorStorage for Storage {
        fn load_cursor(&self, initial_start: u64) -> Result<Cursor, StorageError>;
        fn advance_cursor(&self, end_block: u64) -> Result<Cursor, StorageError>;
        fn rewind_cursor(&self, reorg_block: u64) -> Result<Cursor, StorageError>;
    }

    impl RecordImporter for Storage {
        fn import_batch(
            &self,
            records: &[DecodedRecord],
            chunk: ChunkRange,
        ) -> Result<Cursor, StorageError>;
    }

    impl StorageRewinder for Storage {
        fn rollback(&self, reorg_block: u64) -> Result<RollbackOutcome, StorageError>;
    }
);

mock!(
    #[derive(Debug)]
    pub Flags {}

    impl StopFlagStorage for Flags {
        fn is_stopped(&self, source: &SourceId) -> Result<bool, StorageError>;
        fn set_stopped(&self, source: &SourceId, stopped: bool) -> Result<(), StorageError>;
    }
);

/// Builds an `OutputProposed` log as the node would return it.
pub(crate) fn output_proposed_log(
    index: U256,
    l2_block: U256,
    timestamp: U256,
    l1_block: u64,
) -> RawLog {
    RawLog {
        address: Address::repeat_byte(0x01),
        topics: vec![
            event_signature(SourceKind::OutputProposals),
            B256::repeat_byte(0xee),
            B256::from(index.to_be_bytes::<32>()),
            B256::from(l2_block.to_be_bytes::<32>()),
        ],
        data: Bytes::from(timestamp.to_be_bytes_vec()),
        block_number: l1_block,
        transaction_hash: B256::repeat_byte(0x0f),
        log_index: 0,
    }
}

/// Builds a `WithdrawalProven` log.
pub(crate) fn withdrawal_proven_log(l1_block: u64, log_index: u64) -> RawLog {
    RawLog {
        address: Address::repeat_byte(0x02),
        topics: vec![
            event_signature(SourceKind::ProvenWithdrawals),
            B256::repeat_byte(log_index as u8),
            Address::repeat_byte(0xaa).into_word(),
            Address::repeat_byte(0xbb).into_word(),
        ],
        data: Bytes::new(),
        block_number: l1_block,
        transaction_hash: B256::repeat_byte(0x0f),
        log_index,
    }
}

/// One `OutputProposed` log per block of `range`, the output index being the block number.
pub(crate) fn output_logs(range: ChunkRange) -> Vec<RawLog> {
    (range.start..=range.end)
        .map(|block| {
            let timestamp = U256::from(1_700_000_000 + block);
            output_proposed_log(U256::from(block), U256::from(block * 10), timestamp, block)
        })
        .collect()
}
