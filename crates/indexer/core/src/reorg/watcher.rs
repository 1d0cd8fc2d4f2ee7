use super::{Metrics, ReorgRouter};
use crate::{ChainRpc, RpcError};
use alloy_eips::BlockNumberOrTag;
use kona_indexer_types::{BlockRef, ReorgSignal, ReorgTopic};
use std::{collections::BTreeMap, sync::Arc, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Configuration of a [`HeadWatcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadWatcherConfig {
    /// Interval between two head queries.
    pub poll_interval: Duration,
    /// Number of recent blocks kept to locate the common ancestor of a reorg.
    pub depth: usize,
    /// Block tag followed as the chain head.
    pub tag: BlockNumberOrTag,
}

impl Default for HeadWatcherConfig {
    fn default() -> Self {
        Self { poll_interval: Duration::from_secs(12), depth: 64, tag: BlockNumberOrTag::Latest }
    }
}

/// Follows the head of one chain and signals reorgs to the drivers ingesting from it.
///
/// The watcher keeps the last `depth` heads it observed. A head whose parent hash does not
/// match the stored block below it, or a head that replaces an already seen height, is a reorg:
/// the watcher walks back to the highest stored block that is still canonical and signals
/// `ancestor + 1` to every watched [`ReorgTopic`]. Heads already in the window, or older than
/// it, come from a lagging node and are ignored.
#[derive(Debug)]
pub struct HeadWatcher<R> {
    rpc: R,
    router: Arc<ReorgRouter>,
    topics: Vec<ReorgTopic>,
    config: HeadWatcherConfig,
    cancellation: CancellationToken,
    window: BTreeMap<u64, BlockRef>,
    metrics_enabled: bool,
}

impl<R> HeadWatcher<R>
where
    R: ChainRpc,
{
    /// Creates a new [`HeadWatcher`] signalling the given topics, all read from the endpoint
    /// behind `rpc`.
    pub const fn new(
        rpc: R,
        router: Arc<ReorgRouter>,
        topics: Vec<ReorgTopic>,
        config: HeadWatcherConfig,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            rpc,
            router,
            topics,
            config,
            cancellation,
            window: BTreeMap::new(),
            metrics_enabled: false,
        }
    }

    /// Enables reorg metrics.
    pub fn with_metrics(mut self) -> Self {
        self.metrics_enabled = true;
        Metrics::init();
        self
    }

    /// Polls the chain head until cancelled.
    pub async fn run(mut self) {
        info!(target: "indexer::reorg", topics = ?self.topics, tag = %self.config.tag, "Head watcher started");
        loop {
            tokio::select! {
                _ = self.cancellation.cancelled() => {
                    info!(target: "indexer::reorg", "Head watcher cancellation requested, stopping");
                    break;
                }
                _ = tokio::time::sleep(self.config.poll_interval) => {
                    match self.rpc.get_block_ref(self.config.tag).await {
                        Ok(head) => {
                            if let Err(err) = self.handle_head(head).await {
                                error!(target: "indexer::reorg", %err, "Failed to process chain head");
                            }
                        }
                        Err(RpcError::Cancelled) => break,
                        Err(err) => {
                            error!(target: "indexer::reorg", %err, "Failed to fetch chain head");
                        }
                    }
                }
            }
        }
    }

    /// Processes a new head and returns the signalled reorg block, if any.
    pub async fn handle_head(&mut self, head: BlockRef) -> Result<Option<u64>, RpcError> {
        if self.metrics_enabled {
            Metrics::record_head(head.number);
        }

        let Some((_, tip)) = self.window.last_key_value() else {
            self.remember(head);
            return Ok(None);
        };
        let tip = *tip;

        if self.window.get(&head.number).is_some_and(|stored| stored.hash == head.hash) {
            if head.number < tip.number {
                debug!(target: "indexer::reorg", number = head.number, tip = tip.number, "Stale head received");
            }
            return Ok(None);
        }

        if self.window.first_key_value().is_some_and(|(oldest, _)| head.number < *oldest) {
            debug!(target: "indexer::reorg", number = head.number, tip = tip.number, "Head older than the window, ignoring");
            return Ok(None);
        }

        if head.number == tip.number + 1 && head.parent_hash == tip.hash {
            trace!(target: "indexer::reorg", number = head.number, "Sequential head received");
            self.remember(head);
            return Ok(None);
        }

        // Heads were skipped: the chain is consistent if our tip is still canonical.
        if head.number > tip.number + 1 &&
            self.rpc.get_block_ref(BlockNumberOrTag::Number(tip.number)).await?.hash == tip.hash
        {
            debug!(target: "indexer::reorg", from = tip.number, to = head.number, "Head advanced past skipped blocks");
            self.remember(head);
            return Ok(None);
        }

        let ancestor = self.find_common_ancestor(head.number.saturating_sub(1)).await?;
        let reorg_block = ancestor + 1;
        let depth = tip.number.saturating_sub(ancestor);

        self.window.retain(|number, _| *number <= ancestor);
        self.remember(head);

        warn!(
            target: "indexer::reorg",
            reorg_block,
            depth,
            previous_tip = %tip.hash,
            new_head = %head.hash,
            "Chain reorg detected"
        );
        if self.metrics_enabled {
            Metrics::record_depth(depth);
        }
        for topic in &self.topics {
            self.router.notify(ReorgSignal { topic: topic.clone(), reorg_block });
        }
        Ok(Some(reorg_block))
    }

    /// Returns the highest stored block at or below `from` that is still canonical.
    ///
    /// If no stored block is canonical the block below the oldest stored one is assumed to be.
    async fn find_common_ancestor(&self, from: u64) -> Result<u64, RpcError> {
        for (number, stored) in self.window.range(..=from).rev() {
            let canonical = self.rpc.get_block_ref(BlockNumberOrTag::Number(*number)).await?;
            if canonical.hash == stored.hash {
                return Ok(*number);
            }
        }

        let oldest = self.window.first_key_value().map_or(from, |(number, _)| *number);
        warn!(target: "indexer::reorg", oldest, "Reorg deeper than the watched window");
        Ok(oldest.saturating_sub(1))
    }

    fn remember(&mut self, block: BlockRef) {
        self.window.insert(block.number, block);
        while self.window.len() > self.config.depth.max(1) {
            self.window.pop_first();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockRpc;
    use alloy_primitives::B256;
    use kona_indexer_types::SourceKind;
    use mockall::predicate::eq;
    use url::Url;

    const MAINNET: &str = "http://mainnet.local:8545";
    const SEPOLIA: &str = "http://sepolia.local:8545";

    fn hash(number: u64, fork: u8) -> B256 {
        let mut bytes = [fork; 32];
        bytes[24..].copy_from_slice(&number.to_be_bytes());
        B256::from(bytes)
    }

    fn block(number: u64, fork: u8, parent_fork: u8) -> BlockRef {
        BlockRef { number, hash: hash(number, fork), parent_hash: hash(number - 1, parent_fork) }
    }

    fn topic(endpoint: &str, kind: SourceKind) -> ReorgTopic {
        ReorgTopic::new(Url::parse(endpoint).unwrap(), kind)
    }

    /// A watcher of the mainnet endpoint signalling `kinds`.
    fn watcher(rpc: MockRpc, kinds: &[SourceKind]) -> (Arc<ReorgRouter>, HeadWatcher<MockRpc>) {
        let router = Arc::new(ReorgRouter::new());
        let config = HeadWatcherConfig { depth: 8, ..Default::default() };
        let topics = kinds.iter().map(|kind| topic(MAINNET, *kind)).collect();
        let watcher = HeadWatcher::new(rpc, router.clone(), topics, config, CancellationToken::new());
        (router, watcher)
    }

    /// An endpoint whose canonical chain is fork 0 at every height.
    fn canonical_rpc() -> MockRpc {
        let mut rpc = MockRpc::new();
        rpc.expect_get_block_ref().returning(|tag| match tag {
            BlockNumberOrTag::Number(number) => Ok(block(number, 0, 0)),
            _ => Err(RpcError::BlockNotFound(tag)),
        });
        rpc
    }

    #[tokio::test]
    async fn test_sequential_heads_do_not_signal() {
        let (router, mut watcher) = watcher(MockRpc::new(), &[SourceKind::OutputProposals]);
        let mut inbox = router.subscribe(topic(MAINNET, SourceKind::OutputProposals));

        for number in 10..15 {
            assert_eq!(watcher.handle_head(block(number, 0, 0)).await.unwrap(), None);
        }
        // Same head twice.
        assert_eq!(watcher.handle_head(block(14, 0, 0)).await.unwrap(), None);
        assert_eq!(inbox.poll(), None);
    }

    #[tokio::test]
    async fn test_parent_hash_mismatch_signals_ancestor_plus_one() {
        let mut rpc = MockRpc::new();
        // Blocks 13 and 12 were replaced, 11 is still canonical.
        rpc.expect_get_block_ref()
            .with(eq(BlockNumberOrTag::Number(13)))
            .returning(|_| Ok(block(13, 1, 1)));
        rpc.expect_get_block_ref()
            .with(eq(BlockNumberOrTag::Number(12)))
            .returning(|_| Ok(block(12, 1, 0)));
        rpc.expect_get_block_ref()
            .with(eq(BlockNumberOrTag::Number(11)))
            .returning(|_| Ok(block(11, 0, 0)));

        let (router, mut watcher) =
            watcher(rpc, &[SourceKind::OutputProposals, SourceKind::ProvenWithdrawals]);
        let mut outputs = router.subscribe(topic(MAINNET, SourceKind::OutputProposals));
        let mut withdrawals = router.subscribe(topic(MAINNET, SourceKind::ProvenWithdrawals));

        for number in 10..=13 {
            watcher.handle_head(block(number, 0, 0)).await.unwrap();
        }

        let reorg = watcher.handle_head(block(14, 1, 1)).await.unwrap();
        assert_eq!(reorg, Some(12));
        assert_eq!(outputs.poll(), Some(12));
        assert_eq!(withdrawals.poll(), Some(12));

        // The new fork continues sequentially.
        assert_eq!(watcher.handle_head(block(15, 1, 1)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reorg_only_reaches_sources_of_the_watched_endpoint() {
        let mut rpc = MockRpc::new();
        rpc.expect_get_block_ref()
            .with(eq(BlockNumberOrTag::Number(13)))
            .returning(|_| Ok(block(13, 1, 0)));
        rpc.expect_get_block_ref()
            .with(eq(BlockNumberOrTag::Number(12)))
            .returning(|_| Ok(block(12, 0, 0)));

        let (router, mut watcher) = watcher(rpc, &[SourceKind::OutputProposals]);
        let mut mainnet = router.subscribe(topic(MAINNET, SourceKind::OutputProposals));
        let mut sepolia = router.subscribe(topic(SEPOLIA, SourceKind::OutputProposals));

        for number in 10..=13 {
            watcher.handle_head(block(number, 0, 0)).await.unwrap();
        }

        assert_eq!(watcher.handle_head(block(14, 1, 1)).await.unwrap(), Some(13));
        assert_eq!(mainnet.poll(), Some(13));
        assert_eq!(sepolia.poll(), None);
    }

    #[tokio::test]
    async fn test_stale_head_from_lagging_node_is_ignored() {
        let (router, mut watcher) = watcher(canonical_rpc(), &[SourceKind::OutputProposals]);
        let mut inbox = router.subscribe(topic(MAINNET, SourceKind::OutputProposals));

        for number in 10..=13 {
            watcher.handle_head(block(number, 0, 0)).await.unwrap();
        }

        assert_eq!(watcher.handle_head(block(11, 0, 0)).await.unwrap(), None);
        assert_eq!(inbox.poll(), None);

        // The window still holds 12 and 13, so the chain continues from the real tip.
        assert_eq!(watcher.handle_head(block(14, 0, 0)).await.unwrap(), None);
        assert_eq!(inbox.poll(), None);
    }

    #[tokio::test]
    async fn test_head_older_than_window_is_ignored() {
        let (router, mut watcher) = watcher(canonical_rpc(), &[SourceKind::OutputProposals]);
        let mut inbox = router.subscribe(topic(MAINNET, SourceKind::OutputProposals));

        for number in 100..=103 {
            watcher.handle_head(block(number, 0, 0)).await.unwrap();
        }

        assert_eq!(watcher.handle_head(block(42, 0, 0)).await.unwrap(), None);
        assert_eq!(inbox.poll(), None);
    }

    #[tokio::test]
    async fn test_replaced_head_at_same_height() {
        let mut rpc = MockRpc::new();
        rpc.expect_get_block_ref()
            .with(eq(BlockNumberOrTag::Number(10)))
            .returning(|_| Ok(block(10, 0, 0)));

        let (router, mut watcher) = watcher(rpc, &[SourceKind::ProvenWithdrawals]);
        let mut inbox = router.subscribe(topic(MAINNET, SourceKind::ProvenWithdrawals));

        watcher.handle_head(block(10, 0, 0)).await.unwrap();
        watcher.handle_head(block(11, 0, 0)).await.unwrap();

        assert_eq!(watcher.handle_head(block(11, 2, 0)).await.unwrap(), Some(11));
        assert_eq!(inbox.poll(), Some(11));
    }

    #[tokio::test]
    async fn test_skipped_heads_on_canonical_tip() {
        let mut rpc = MockRpc::new();
        rpc.expect_get_block_ref()
            .with(eq(BlockNumberOrTag::Number(11)))
            .times(1)
            .returning(|_| Ok(block(11, 0, 0)));

        let (_router, mut watcher) = watcher(rpc, &[SourceKind::OutputProposals]);
        watcher.handle_head(block(10, 0, 0)).await.unwrap();
        watcher.handle_head(block(11, 0, 0)).await.unwrap();

        assert_eq!(watcher.handle_head(block(20, 0, 0)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reorg_deeper_than_window() {
        let mut rpc = MockRpc::new();
        rpc.expect_get_block_ref().returning(|tag| match tag {
            BlockNumberOrTag::Number(number) => Ok(block(number, 3, 3)),
            _ => Err(RpcError::BlockNotFound(tag)),
        });

        let (_router, mut watcher) = watcher(rpc, &[SourceKind::OutputProposals]);
        for number in 100..=103 {
            watcher.handle_head(block(number, 0, 0)).await.unwrap();
        }

        assert_eq!(watcher.handle_head(block(104, 3, 3)).await.unwrap(), Some(100));
    }

    #[tokio::test]
    async fn test_run_stops_on_cancellation() {
        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let watcher = HeadWatcher::new(
            MockRpc::new(),
            Arc::new(ReorgRouter::new()),
            vec![topic(MAINNET, SourceKind::OutputProposals)],
            HeadWatcherConfig::default(),
            cancellation,
        )
        .with_metrics();
        watcher.run().await;
    }
}
