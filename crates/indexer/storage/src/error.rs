use reth_db::DatabaseError;
use thiserror::Error;

/// Errors that may occur while interacting with indexer storage.
///
/// This enum is used across all implementations of the storage traits.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Represents a database error that occurred while interacting with storage.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Represents an error that occurred while initializing the database.
    #[error(transparent)]
    DatabaseInit(#[from] eyre::Report),

    /// A lock guarding the database registry was poisoned.
    #[error("lock poisoned")]
    LockPoisoned,

    /// No database was opened for the source.
    #[error("database not initialised for source {0}")]
    DatabaseNotInitialised(String),

    /// The cursor of the source has not been initialised yet.
    #[error("cursor not initialised for source {0}")]
    CursorNotInitialised(String),

    /// The cursor would move backwards outside of a rollback.
    #[error("cursor regression: current end {current}, requested end {requested}")]
    CursorRegression {
        /// The last processed block currently stored.
        current: u64,
        /// The requested last processed block.
        requested: u64,
    },

    /// A chunk does not start where the cursor stands, which would leave a gap.
    #[error("chunk starting at {chunk_start} does not continue cursor at {cursor_start}")]
    CursorGap {
        /// The next block expected by the cursor.
        cursor_start: u64,
        /// The first block of the imported chunk.
        chunk_start: u64,
    },
}

impl PartialEq for StorageError {
    fn eq(&self, other: &Self) -> bool {
        use StorageError::*;
        match (self, other) {
            (Database(a), Database(b)) => a == b,
            (DatabaseInit(a), DatabaseInit(b)) => format!("{a}") == format!("{b}"),
            (LockPoisoned, LockPoisoned) => true,
            (DatabaseNotInitialised(a), DatabaseNotInitialised(b)) => a == b,
            (CursorNotInitialised(a), CursorNotInitialised(b)) => a == b,
            (
                CursorRegression { current: a, requested: b },
                CursorRegression { current: c, requested: d },
            ) => a == c && b == d,
            (
                CursorGap { cursor_start: a, chunk_start: b },
                CursorGap { cursor_start: c, chunk_start: d },
            ) => a == c && b == d,
            _ => false,
        }
    }
}

impl Eq for StorageError {}
