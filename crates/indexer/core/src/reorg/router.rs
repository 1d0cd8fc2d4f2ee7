use super::Metrics;
use kona_indexer_types::{ReorgSignal, ReorgTopic};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Inbox shared between the supervisor and the successive runs of one driver, so a pending
/// signal survives driver restarts.
pub type SharedInbox = Arc<tokio::sync::Mutex<ReorgInbox>>;

/// Fan-out of reorg signals to the drivers of each ingestion class, per chain endpoint.
#[derive(Debug, Default)]
pub struct ReorgRouter {
    subscribers: Mutex<HashMap<ReorgTopic, Vec<mpsc::UnboundedSender<u64>>>>,
}

impl ReorgRouter {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new inbox receiving every signal addressed to `topic`.
    pub fn subscribe(&self, topic: ReorgTopic) -> ReorgInbox {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(topic.clone())
            .or_default()
            .push(sender);
        ReorgInbox { topic, receiver, pending: None }
    }

    /// Delivers `signal` to every live inbox of its topic and returns how many received it.
    ///
    /// Signals for block `0` carry no rollback and are ignored. Inboxes that were dropped are
    /// unsubscribed.
    pub fn notify(&self, signal: ReorgSignal) -> usize {
        if signal.reorg_block == 0 {
            trace!(target: "indexer::reorg", topic = %signal.topic, "Ignoring reorg signal for block 0");
            return 0;
        }

        let mut subscribers = self.subscribers.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(senders) = subscribers.get_mut(&signal.topic) else {
            return 0;
        };
        senders.retain(|sender| sender.send(signal.reorg_block).is_ok());

        debug!(
            target: "indexer::reorg",
            topic = %signal.topic,
            reorg_block = signal.reorg_block,
            receivers = senders.len(),
            "Reorg signal routed"
        );
        Metrics::record_signal(signal.topic.kind);
        senders.len()
    }
}

/// Receiving end of a driver's reorg signals.
#[derive(Debug)]
pub struct ReorgInbox {
    topic: ReorgTopic,
    receiver: mpsc::UnboundedReceiver<u64>,
    /// Lowest reorg block received and not yet rolled back.
    pending: Option<u64>,
}

impl ReorgInbox {
    /// Wraps the inbox for sharing across driver runs.
    pub fn shared(self) -> SharedInbox {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    /// The topic this inbox is subscribed to.
    pub const fn topic(&self) -> &ReorgTopic {
        &self.topic
    }

    /// Drains every queued signal without blocking and returns the pending rollback target.
    ///
    /// Several signals coalesce into the lowest block, as rolling back to it also covers the
    /// higher ones.
    pub fn poll(&mut self) -> Option<u64> {
        while let Ok(block) = self.receiver.try_recv() {
            self.pending = Some(self.pending.map_or(block, |pending| pending.min(block)));
        }
        self.pending
    }

    /// Pending rollback target, without draining the queue.
    pub const fn pending(&self) -> Option<u64> {
        self.pending
    }

    /// Clears the pending signal once a rollback to `reorg_block` committed.
    pub fn acknowledge(&mut self, reorg_block: u64) {
        if self.pending.is_some_and(|pending| pending >= reorg_block) {
            self.pending = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kona_indexer_types::SourceKind;
    use url::Url;

    const MAINNET: &str = "http://mainnet.local:8545";
    const SEPOLIA: &str = "http://sepolia.local:8545";

    fn topic(endpoint: &str, kind: SourceKind) -> ReorgTopic {
        ReorgTopic::new(Url::parse(endpoint).unwrap(), kind)
    }

    fn signal(kind: SourceKind, reorg_block: u64) -> ReorgSignal {
        ReorgSignal { topic: topic(MAINNET, kind), reorg_block }
    }

    #[test]
    fn test_signals_are_routed_per_kind() {
        let router = ReorgRouter::new();
        let mut outputs = router.subscribe(topic(MAINNET, SourceKind::OutputProposals));
        let mut withdrawals = router.subscribe(topic(MAINNET, SourceKind::ProvenWithdrawals));

        assert_eq!(router.notify(signal(SourceKind::OutputProposals, 7)), 1);

        assert_eq!(outputs.poll(), Some(7));
        assert_eq!(withdrawals.poll(), None);
    }

    #[test]
    fn test_signals_are_scoped_to_their_endpoint() {
        let router = ReorgRouter::new();
        let mut mainnet = router.subscribe(topic(MAINNET, SourceKind::OutputProposals));
        let mut sepolia = router.subscribe(topic(SEPOLIA, SourceKind::OutputProposals));

        let reorg = ReorgSignal {
            topic: topic(SEPOLIA, SourceKind::OutputProposals),
            reorg_block: 5_000_000,
        };
        assert_eq!(router.notify(reorg), 1);

        assert_eq!(sepolia.poll(), Some(5_000_000));
        assert_eq!(mainnet.poll(), None);
        assert_eq!(mainnet.topic(), &topic(MAINNET, SourceKind::OutputProposals));
    }

    #[test]
    fn test_every_inbox_of_a_topic_receives_the_signal() {
        let router = ReorgRouter::new();
        let mut first = router.subscribe(topic(MAINNET, SourceKind::OutputProposals));
        let mut second = router.subscribe(topic(MAINNET, SourceKind::OutputProposals));

        assert_eq!(router.notify(signal(SourceKind::OutputProposals, 9)), 2);
        assert_eq!(first.poll(), Some(9));
        assert_eq!(second.poll(), Some(9));
    }

    #[test]
    fn test_zero_block_is_ignored() {
        let router = ReorgRouter::new();
        let mut inbox = router.subscribe(topic(MAINNET, SourceKind::OutputProposals));

        assert_eq!(router.notify(signal(SourceKind::OutputProposals, 0)), 0);
        assert_eq!(inbox.poll(), None);
    }

    #[test]
    fn test_poll_coalesces_to_lowest_block() {
        let router = ReorgRouter::new();
        let mut inbox = router.subscribe(topic(MAINNET, SourceKind::ProvenWithdrawals));

        for block in [12, 7, 9] {
            router.notify(signal(SourceKind::ProvenWithdrawals, block));
        }
        assert_eq!(inbox.poll(), Some(7));
        // Pending until acknowledged.
        assert_eq!(inbox.poll(), Some(7));

        inbox.acknowledge(7);
        assert_eq!(inbox.poll(), None);
    }

    #[test]
    fn test_acknowledge_keeps_lower_signal() {
        let router = ReorgRouter::new();
        let mut inbox = router.subscribe(topic(MAINNET, SourceKind::ProvenWithdrawals));
        router.notify(signal(SourceKind::ProvenWithdrawals, 5));
        inbox.poll();

        inbox.acknowledge(8);
        assert_eq!(inbox.pending(), Some(5));
    }

    #[test]
    fn test_dropped_inboxes_are_pruned() {
        let router = ReorgRouter::new();
        let inbox = router.subscribe(topic(MAINNET, SourceKind::OutputProposals));
        let mut live = router.subscribe(topic(MAINNET, SourceKind::OutputProposals));
        drop(inbox);

        assert_eq!(router.notify(signal(SourceKind::OutputProposals, 3)), 1);
        assert_eq!(live.poll(), Some(3));
    }
}
