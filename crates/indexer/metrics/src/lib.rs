//! Metric helpers shared by the indexer crates.

mod call;
pub use call::CallMetrics;

mod macros;

mod reporter;
pub use reporter::MetricsReporter;
