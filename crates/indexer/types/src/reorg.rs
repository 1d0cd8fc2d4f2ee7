use crate::SourceKind;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use url::Url;

/// Address of a reorg channel: one ingestion class on one chain endpoint.
///
/// Sources of the same kind reading from different endpoints never share a channel, so a
/// reorg observed on one chain can not roll back rows fetched from another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display("{kind}@{endpoint}")]
pub struct ReorgTopic {
    /// RPC endpoint the class is ingested from.
    pub endpoint: Url,
    /// Ingestion class.
    pub kind: SourceKind,
}

impl ReorgTopic {
    /// Creates a new [`ReorgTopic`].
    pub const fn new(endpoint: Url, kind: SourceKind) -> Self {
        Self { endpoint, kind }
    }
}

/// Notification that the chain replaced every block at or above `reorg_block`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReorgSignal {
    /// Channel the signal is addressed to.
    pub topic: ReorgTopic,
    /// First invalidated block.
    pub reorg_block: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_display() {
        let topic = ReorgTopic::new(
            Url::parse("http://localhost:8545").unwrap(),
            SourceKind::OutputProposals,
        );
        assert_eq!(topic.to_string(), "output_proposals@http://localhost:8545/");
    }
}
