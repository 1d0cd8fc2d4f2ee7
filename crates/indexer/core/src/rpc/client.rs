use super::{ChainRpc, RpcError};
use alloy_eips::BlockNumberOrTag;
use alloy_network::Ethereum;
use alloy_primitives::{Address, B256};
use alloy_provider::{Provider, RootProvider};
use alloy_rpc_types_eth::Filter;
use async_trait::async_trait;
use kona_indexer_types::{BlockRef, ChunkRange, RawLog};
use tracing::{error, trace};
use url::Url;

/// [`ChainRpc`] backed by an alloy [`RootProvider`].
///
/// Quantities are converted from their hex wire encoding by alloy; this type only maps the
/// responses onto the indexer types.
#[derive(Debug, Clone)]
pub struct AlloyChainRpc {
    provider: RootProvider<Ethereum>,
}

impl AlloyChainRpc {
    /// Creates a new [`AlloyChainRpc`] over the given provider.
    pub const fn new(provider: RootProvider<Ethereum>) -> Self {
        Self { provider }
    }

    /// Creates a new [`AlloyChainRpc`] talking HTTP to `url`.
    pub fn new_http(url: Url) -> Self {
        Self::new(RootProvider::new_http(url))
    }
}

#[async_trait]
impl ChainRpc for AlloyChainRpc {
    async fn get_logs(
        &self,
        range: ChunkRange,
        address: Address,
        topic0: B256,
    ) -> Result<Vec<RawLog>, RpcError> {
        let filter = Filter::new()
            .from_block(range.start)
            .to_block(range.end)
            .address(address)
            .event_signature(topic0);

        let logs = self.provider.get_logs(&filter).await?;
        trace!(target: "indexer::rpc", %range, count = logs.len(), "Fetched logs");

        logs.into_iter()
            .map(|log| {
                RawLog::from_rpc(log).ok_or_else(|| {
                    error!(target: "indexer::rpc", %range, "Node returned a log without position");
                    RpcError::IncompleteLog(range)
                })
            })
            .collect()
    }

    async fn get_block_number(&self, tag: BlockNumberOrTag) -> Result<u64, RpcError> {
        match tag {
            BlockNumberOrTag::Number(number) => Ok(number),
            BlockNumberOrTag::Latest => Ok(self.provider.get_block_number().await?),
            tag => self.get_block_ref(tag).await.map(|block| block.number),
        }
    }

    async fn get_block_ref(&self, tag: BlockNumberOrTag) -> Result<BlockRef, RpcError> {
        let block = self
            .provider
            .get_block_by_number(tag)
            .await?
            .ok_or(RpcError::BlockNotFound(tag))?;

        Ok(BlockRef {
            number: block.header.number,
            hash: block.header.hash,
            parent_hash: block.header.parent_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{LogData, U64, b256, bytes};
    use alloy_rpc_client::RpcClient;
    use alloy_rpc_types_eth::{Block, Header, Log};
    use alloy_transport::mock::{Asserter, MockTransport};

    fn mock_rpc() -> (Asserter, AlloyChainRpc) {
        let asserter = Asserter::new();
        let transport = MockTransport::new(asserter.clone());
        let provider = RootProvider::<Ethereum>::new(RpcClient::new(transport, false));
        (asserter, AlloyChainRpc::new(provider))
    }

    fn block(number: u64, hash: B256, parent_hash: B256) -> Block {
        Block {
            header: Header {
                hash,
                inner: alloy_consensus::Header { number, parent_hash, ..Default::default() },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn rpc_log(block_number: Option<u64>, log_index: u64) -> Log {
        Log {
            inner: alloy_primitives::Log {
                address: Address::repeat_byte(0x11),
                data: LogData::new_unchecked(vec![B256::repeat_byte(0xaa)], bytes!("0102")),
            },
            block_number,
            transaction_hash: Some(B256::repeat_byte(0x22)),
            log_index: Some(log_index),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_get_logs_converts_logs() {
        let (asserter, rpc) = mock_rpc();
        asserter.push_success(&vec![rpc_log(Some(100), 0), rpc_log(Some(101), 3)]);

        let logs = rpc
            .get_logs(ChunkRange::new(100, 101), Address::repeat_byte(0x11), B256::repeat_byte(0xaa))
            .await
            .unwrap();

        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].block_number, 101);
        assert_eq!(logs[1].log_index, 3);
        assert_eq!(logs[1].signature(), Some(B256::repeat_byte(0xaa)));
    }

    #[tokio::test]
    async fn test_get_logs_rejects_pending_logs() {
        let (asserter, rpc) = mock_rpc();
        asserter.push_success(&vec![rpc_log(None, 0)]);

        let err = rpc
            .get_logs(ChunkRange::new(1, 1), Address::ZERO, B256::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::IncompleteLog(range) if range == ChunkRange::new(1, 1)));
    }

    #[tokio::test]
    async fn test_get_block_number_latest() {
        let (asserter, rpc) = mock_rpc();
        asserter.push_success(&U64::from(105));

        assert_eq!(rpc.get_block_number(BlockNumberOrTag::Latest).await.unwrap(), 105);
    }

    #[tokio::test]
    async fn test_get_block_number_explicit_number_skips_rpc() {
        let (_asserter, rpc) = mock_rpc();
        assert_eq!(rpc.get_block_number(BlockNumberOrTag::Number(42)).await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_get_block_number_finalized_reads_header() {
        let (asserter, rpc) = mock_rpc();
        asserter.push_success(&block(90, B256::ZERO, B256::ZERO));

        assert_eq!(rpc.get_block_number(BlockNumberOrTag::Finalized).await.unwrap(), 90);
    }

    #[tokio::test]
    async fn test_get_block_ref() {
        let (asserter, rpc) = mock_rpc();
        let hash = b256!("0x00000000000000000000000000000000000000000000000000000000000000bb");
        let parent_hash = B256::repeat_byte(0xcc);
        asserter.push_success(&block(7, hash, parent_hash));

        let block = rpc.get_block_ref(BlockNumberOrTag::Number(7)).await.unwrap();
        assert_eq!(block, BlockRef { number: 7, hash, parent_hash });
    }

    #[tokio::test]
    async fn test_get_block_ref_missing_block() {
        let (asserter, rpc) = mock_rpc();
        asserter.push_success(&Option::<Block>::None);

        let err = rpc.get_block_ref(BlockNumberOrTag::Number(7)).await.unwrap_err();
        assert!(matches!(err, RpcError::BlockNotFound(BlockNumberOrTag::Number(7))));
    }
}
