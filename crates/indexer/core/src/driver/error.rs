use crate::{DecodeError, RpcError};
use kona_indexer_storage::StorageError;
use thiserror::Error;

/// Deliberate termination of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverExit {
    /// The stop flag of the source is set. The driver must not be restarted.
    Stopped,
    /// The indexer is shutting down.
    Cancelled,
}

/// Errors terminating a driver run.
///
/// Storage errors only abort the current cycle and never escape a run; they appear here when
/// raised while reading or persisting the stop flag.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A non transient RPC error, or retries were exhausted.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// A fetched log could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
