//! [IndexerActor] services for the indexer.
//!
//! [IndexerActor]: super::IndexerActor

mod traits;
pub use traits::IndexerActor;

mod metric;
pub use metric::MetricWorker;

mod source;
pub use source::SourceActor;

mod utils;
pub use utils::RestartPolicy;
