use kona_indexer_types::SourceId;

/// Metrics of the ingestion drivers, labelled by source.
#[derive(Debug, Clone)]
pub(crate) struct Metrics;

impl Metrics {
    pub(crate) const BLOCKS_PROCESSED_TOTAL: &'static str =
        "kona_indexer_driver_blocks_processed_total";
    pub(crate) const ROWS_IMPORTED_TOTAL: &'static str = "kona_indexer_driver_rows_imported_total";
    pub(crate) const ROLLBACKS_TOTAL: &'static str = "kona_indexer_driver_rollbacks_total";
    pub(crate) const ROLLED_BACK_ROWS_TOTAL: &'static str =
        "kona_indexer_driver_rolled_back_rows_total";
    pub(crate) const CYCLE_ERRORS_TOTAL: &'static str = "kona_indexer_driver_cycle_errors_total";
    pub(crate) const CURSOR_BLOCK: &'static str = "kona_indexer_driver_cursor_block";

    pub(crate) fn init(source_id: &SourceId) {
        Self::describe();
        Self::zero(source_id);
    }

    fn describe() {
        metrics::describe_counter!(
            Self::BLOCKS_PROCESSED_TOTAL,
            metrics::Unit::Count,
            "Total number of blocks scanned for events",
        );
        metrics::describe_counter!(
            Self::ROWS_IMPORTED_TOTAL,
            metrics::Unit::Count,
            "Total number of decoded records imported",
        );
        metrics::describe_counter!(
            Self::ROLLBACKS_TOTAL,
            metrics::Unit::Count,
            "Total number of committed reorg rollbacks",
        );
        metrics::describe_counter!(
            Self::ROLLED_BACK_ROWS_TOTAL,
            metrics::Unit::Count,
            "Total number of rows deleted by reorg rollbacks",
        );
        metrics::describe_counter!(
            Self::CYCLE_ERRORS_TOTAL,
            metrics::Unit::Count,
            "Total number of cycles aborted by a storage error",
        );
        metrics::describe_gauge!(
            Self::CURSOR_BLOCK,
            metrics::Unit::Count,
            "Last block processed by the driver",
        );
    }

    fn zero(source_id: &SourceId) {
        for counter in [
            Self::BLOCKS_PROCESSED_TOTAL,
            Self::ROWS_IMPORTED_TOTAL,
            Self::ROLLBACKS_TOTAL,
            Self::ROLLED_BACK_ROWS_TOTAL,
            Self::CYCLE_ERRORS_TOTAL,
        ] {
            metrics::counter!(counter, "source" => source_id.to_string()).increment(0);
        }
    }

    pub(crate) fn record_chunk(source_id: &SourceId, blocks: u64, rows: usize, cursor_end: u64) {
        let source = source_id.to_string();
        metrics::counter!(Self::BLOCKS_PROCESSED_TOTAL, "source" => source.clone()).increment(blocks);
        metrics::counter!(Self::ROWS_IMPORTED_TOTAL, "source" => source.clone())
            .increment(rows as u64);
        metrics::gauge!(Self::CURSOR_BLOCK, "source" => source).set(cursor_end as f64);
    }

    pub(crate) fn record_rollback(source_id: &SourceId, deleted_rows: usize, cursor_end: u64) {
        let source = source_id.to_string();
        metrics::counter!(Self::ROLLBACKS_TOTAL, "source" => source.clone()).increment(1);
        metrics::counter!(Self::ROLLED_BACK_ROWS_TOTAL, "source" => source.clone())
            .increment(deleted_rows as u64);
        metrics::gauge!(Self::CURSOR_BLOCK, "source" => source).set(cursor_end as f64);
    }

    pub(crate) fn record_cycle_error(source_id: &SourceId) {
        metrics::counter!(Self::CYCLE_ERRORS_TOTAL, "source" => source_id.to_string()).increment(1);
    }
}
