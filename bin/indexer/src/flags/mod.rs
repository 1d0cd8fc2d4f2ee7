//! CLI flags of the indexer.

mod indexer;
pub use indexer::IndexerArgs;
