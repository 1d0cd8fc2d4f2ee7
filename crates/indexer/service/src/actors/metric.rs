use async_trait::async_trait;
use kona_indexer_metrics::MetricsReporter;
use std::{convert::Infallible, sync::Arc, time::Duration};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::IndexerActor;

/// Periodically asks every reporter to publish its gauges.
#[derive(Debug, derive_more::Constructor)]
pub struct MetricWorker<R> {
    interval: Duration,
    // list of reporters
    reporters: Vec<Arc<R>>,
    cancel_token: CancellationToken,
}

#[async_trait]
impl<R> IndexerActor for MetricWorker<R>
where
    R: MetricsReporter + Send + Sync + 'static,
{
    type Error = Infallible;

    async fn start(mut self) -> Result<(), Self::Error> {
        info!(target: "indexer::metrics", interval = ?self.interval, reporters = self.reporters.len(), "Metric worker started");

        while !self.cancel_token.is_cancelled() {
            self.reporters.iter().for_each(|reporter| reporter.report_metrics());
            debug!(target: "indexer::metrics", "Gauges refreshed");

            tokio::select! {
                _ = sleep(self.interval) => {}
                _ = self.cancel_token.cancelled() => {}
            }
        }

        info!(target: "indexer::metrics", "Metric worker cancelled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;

    mock! (
        #[derive(Debug)]
        pub Reporter {}

        impl MetricsReporter for Reporter {
            fn report_metrics(&self);
        }
    );

    #[tokio::test(start_paused = true)]
    async fn test_metric_worker_reports_metrics_and_stops_on_cancel() {
        let mut mock_reporter = MockReporter::new();
        mock_reporter.expect_report_metrics().times(3).return_const(());

        let cancel_token = CancellationToken::new();
        let worker = MetricWorker::new(
            Duration::from_millis(50),
            vec![Arc::new(mock_reporter)],
            cancel_token.clone(),
        );

        let handle = tokio::spawn(worker.start());

        // reports at 0ms, 50ms and 100ms
        sleep(Duration::from_millis(120)).await;
        cancel_token.cancel();

        assert!(handle.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_metric_worker_stops_immediately_on_cancel() {
        let mut mock_reporter = MockReporter::new();
        mock_reporter.expect_report_metrics().times(0);

        let cancel_token = CancellationToken::new();
        let worker = MetricWorker::new(
            Duration::from_millis(100),
            vec![Arc::new(mock_reporter)],
            cancel_token.clone(),
        );

        cancel_token.cancel();

        assert!(worker.start().await.is_ok());
    }
}
