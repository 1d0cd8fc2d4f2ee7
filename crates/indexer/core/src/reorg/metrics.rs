use kona_indexer_types::SourceKind;

/// Metrics for reorg detection and routing.
#[derive(Debug, Clone)]
pub(crate) struct Metrics;

impl Metrics {
    pub(crate) const REORG_SIGNALS_TOTAL: &'static str = "kona_indexer_reorg_signals_total";
    pub(crate) const REORG_DEPTH: &'static str = "kona_indexer_reorg_depth";
    pub(crate) const HEAD_BLOCK: &'static str = "kona_indexer_head_block";

    pub(crate) fn init() {
        metrics::describe_counter!(
            Self::REORG_SIGNALS_TOTAL,
            metrics::Unit::Count,
            "Total number of reorg signals routed to ingestion drivers",
        );
        metrics::describe_histogram!(
            Self::REORG_DEPTH,
            metrics::Unit::Count,
            "Number of blocks replaced by detected reorgs",
        );
        metrics::describe_gauge!(
            Self::HEAD_BLOCK,
            metrics::Unit::Count,
            "Latest chain head observed by the head watcher",
        );
        for kind in SourceKind::ALL {
            metrics::counter!(Self::REORG_SIGNALS_TOTAL, "kind" => kind.as_str()).increment(0);
        }
    }

    pub(crate) fn record_signal(kind: SourceKind) {
        metrics::counter!(Self::REORG_SIGNALS_TOTAL, "kind" => kind.as_str()).increment(1);
    }

    pub(crate) fn record_depth(depth: u64) {
        metrics::histogram!(Self::REORG_DEPTH).record(depth as f64);
    }

    pub(crate) fn record_head(number: u64) {
        metrics::gauge!(Self::HEAD_BLOCK).set(number as f64);
    }
}
