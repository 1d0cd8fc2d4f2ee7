use alloy_eips::BlockNumberOrTag;
use alloy_transport::TransportError;
use kona_indexer_types::ChunkRange;
use std::time::Duration;
use thiserror::Error;

/// Errors returned by [`ChainRpc`](super::ChainRpc) implementations.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The transport or the node failed to serve the request.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A single request exceeded its deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The node does not know the requested block (yet).
    #[error("block not found: {0}")]
    BlockNotFound(BlockNumberOrTag),

    /// The node returned a log without block, transaction or index metadata.
    #[error("incomplete log returned for range {0}")]
    IncompleteLog(ChunkRange),

    /// The request was abandoned because the indexer is shutting down.
    #[error("request cancelled")]
    Cancelled,
}

impl RpcError {
    /// Whether retrying the same request may succeed.
    ///
    /// Network failures, node error responses, timeouts and blocks that are not available yet
    /// are transient. Errors raised locally while building the request and cancellation are not.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Transport(err) => !matches!(
                err,
                TransportError::SerError(_) |
                    TransportError::LocalUsageError(_) |
                    TransportError::UnsupportedFeature(_)
            ),
            Self::Timeout(_) | Self::BlockNotFound(_) | Self::IncompleteLog(_) => true,
            Self::Cancelled => false,
        }
    }
}
