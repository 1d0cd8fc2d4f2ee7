use kona_indexer_metrics::CallMetrics;
use kona_indexer_types::SourceId;
use metrics::Label;

/// Container for storage metrics.
#[derive(Debug, Clone)]
pub(crate) struct Metrics;

impl Metrics {
    pub(crate) const STORAGE: CallMetrics = CallMetrics {
        success_total: "kona_indexer_storage_success_total",
        error_total: "kona_indexer_storage_error_total",
        duration_seconds: "kona_indexer_storage_duration_seconds",
    };

    pub(crate) const CURSOR_START_BLOCK: &'static str = "kona_indexer_storage_cursor_start_block";
    pub(crate) const STORED_ROWS: &'static str = "kona_indexer_storage_rows";

    pub(crate) const METHOD_LOAD_CURSOR: &'static str = "load_cursor";
    pub(crate) const METHOD_ADVANCE_CURSOR: &'static str = "advance_cursor";
    pub(crate) const METHOD_REWIND_CURSOR: &'static str = "rewind_cursor";
    pub(crate) const METHOD_IMPORT_BATCH: &'static str = "import_batch";
    pub(crate) const METHOD_ROLLBACK: &'static str = "rollback";
    pub(crate) const METHOD_OUTPUT_PROPOSALS: &'static str = "output_proposals";
    pub(crate) const METHOD_PROVEN_WITHDRAWALS: &'static str = "proven_withdrawals";
    pub(crate) const METHOD_LATEST_IMPORTED_BLOCK: &'static str = "latest_imported_block";
    pub(crate) const METHOD_IS_STOPPED: &'static str = "is_stopped";
    pub(crate) const METHOD_SET_STOPPED: &'static str = "set_stopped";

    const SOURCE_METHODS: [&'static str; 8] = [
        Self::METHOD_LOAD_CURSOR,
        Self::METHOD_ADVANCE_CURSOR,
        Self::METHOD_REWIND_CURSOR,
        Self::METHOD_IMPORT_BATCH,
        Self::METHOD_ROLLBACK,
        Self::METHOD_OUTPUT_PROPOSALS,
        Self::METHOD_PROVEN_WITHDRAWALS,
        Self::METHOD_LATEST_IMPORTED_BLOCK,
    ];

    /// Describes the storage series and zeroes those of `source_id`.
    pub(crate) fn init(source_id: &SourceId) {
        Self::describe();
        let labels = [Label::new("source", source_id.to_string())];
        for method in Self::SOURCE_METHODS {
            Self::STORAGE.zero(method, &labels);
        }
    }

    /// Describes the storage series and zeroes the settings methods.
    pub(crate) fn init_settings() {
        Self::describe();
        Self::STORAGE.zero(Self::METHOD_IS_STOPPED, &[]);
        Self::STORAGE.zero(Self::METHOD_SET_STOPPED, &[]);
    }

    fn describe() {
        Self::STORAGE.describe("Kona Indexer Storage");
        metrics::describe_gauge!(
            Self::CURSOR_START_BLOCK,
            metrics::Unit::Count,
            "Next block to be fetched per source"
        );
        metrics::describe_gauge!(
            Self::STORED_ROWS,
            metrics::Unit::Count,
            "Number of materialized rows per source"
        );
    }
}
