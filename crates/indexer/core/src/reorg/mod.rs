//! Reorg notification and detection.
//!
//! A [`ReorgRouter`] carries "the chain reorganized down to block N" signals from producers,
//! such as the [`HeadWatcher`], to the [`ReorgInbox`] of every ingestion driver subscribed to
//! the affected [`ReorgTopic`](kona_indexer_types::ReorgTopic), that is the same ingestion class
//! on the same endpoint.

mod router;
pub use router::{ReorgInbox, ReorgRouter, SharedInbox};

mod watcher;
pub use watcher::{HeadWatcher, HeadWatcherConfig};

mod metrics;
pub(crate) use metrics::Metrics;
