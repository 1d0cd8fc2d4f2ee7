use kona_indexer_metrics::CallMetrics;

/// Container for RPC metrics.
#[derive(Debug, Clone)]
pub(crate) struct Metrics;

impl Metrics {
    pub(crate) const RPC: CallMetrics = CallMetrics {
        success_total: "kona_indexer_rpc_success_total",
        error_total: "kona_indexer_rpc_error_total",
        duration_seconds: "kona_indexer_rpc_duration_seconds",
    };

    pub(crate) const RPC_RETRIES_TOTAL: &'static str = "kona_indexer_rpc_retries_total";

    pub(crate) const METHOD_GET_LOGS: &'static str = "get_logs";
    pub(crate) const METHOD_GET_BLOCK_NUMBER: &'static str = "get_block_number";
    pub(crate) const METHOD_GET_BLOCK_REF: &'static str = "get_block_ref";

    /// Describes the RPC series and registers them with zero values.
    pub(crate) fn init() {
        Self::RPC.describe("indexer RPC");
        metrics::describe_counter!(
            Self::RPC_RETRIES_TOTAL,
            metrics::Unit::Count,
            "Total number of retried RPC requests"
        );
        for method in [Self::METHOD_GET_LOGS, Self::METHOD_GET_BLOCK_NUMBER, Self::METHOD_GET_BLOCK_REF]
        {
            Self::RPC.zero(method, &[]);
            metrics::counter!(Self::RPC_RETRIES_TOTAL, "method" => method).increment(0);
        }
    }

    pub(crate) fn record_retry(method: &'static str) {
        metrics::counter!(Self::RPC_RETRIES_TOTAL, "method" => method).increment(1);
    }
}
