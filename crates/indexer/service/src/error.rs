use crate::ConfigError;
use kona_indexer_storage::StorageError;
use thiserror::Error;

/// Errors raised while wiring the indexer service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The source table is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A database could not be opened.
    #[error(transparent)]
    Storage(#[from] StorageError),
}
