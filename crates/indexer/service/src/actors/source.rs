use async_trait::async_trait;
use kona_indexer_core::{
    ChainRpc, DecoderRegistry, DriverConfig, DriverError, IngestionDriver, SharedInbox,
};
use kona_indexer_storage::{IngestionStorage, StopFlagStorage};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::{RestartPolicy, utils::supervise};
use crate::IndexerActor;

/// Supervises the [`IngestionDriver`] of one source.
///
/// Every restart builds a fresh driver over the same storage, stop flags and reorg inbox, so the
/// new run resumes from the persisted cursor and still sees signals left pending by the failed
/// one.
#[derive(Debug)]
pub struct SourceActor<R, S, F> {
    config: DriverConfig,
    rpc: R,
    storage: Arc<S>,
    flags: Arc<F>,
    decoders: Arc<DecoderRegistry>,
    inbox: SharedInbox,
    cancel_token: CancellationToken,
    restart_policy: RestartPolicy,
    max_restarts: Option<usize>,
    metrics_enabled: bool,
}

impl<R, S, F> SourceActor<R, S, F>
where
    R: ChainRpc + Clone,
    S: IngestionStorage,
    F: StopFlagStorage,
{
    /// Creates a new [`SourceActor`] with the [`RestartPolicy::Transient`] policy.
    pub const fn new(
        config: DriverConfig,
        rpc: R,
        storage: Arc<S>,
        flags: Arc<F>,
        decoders: Arc<DecoderRegistry>,
        inbox: SharedInbox,
        cancel_token: CancellationToken,
    ) -> Self {
        Self {
            config,
            rpc,
            storage,
            flags,
            decoders,
            inbox,
            cancel_token,
            restart_policy: RestartPolicy::Transient,
            max_restarts: None,
            metrics_enabled: false,
        }
    }

    /// Sets the restart policy and the maximum number of consecutive restarts.
    pub const fn with_restart_policy(
        mut self,
        restart_policy: RestartPolicy,
        max_restarts: Option<usize>,
    ) -> Self {
        self.restart_policy = restart_policy;
        self.max_restarts = max_restarts;
        self
    }

    /// Enables driver metrics.
    pub const fn with_metrics(mut self) -> Self {
        self.metrics_enabled = true;
        self
    }

    fn driver(&self) -> IngestionDriver<R, S, F> {
        let driver = IngestionDriver::new(
            self.config.clone(),
            self.rpc.clone(),
            self.storage.clone(),
            self.flags.clone(),
            self.decoders.clone(),
            self.inbox.clone(),
            self.cancel_token.child_token(),
        );
        if self.metrics_enabled { driver.with_metrics() } else { driver }
    }
}

#[async_trait]
impl<R, S, F> IndexerActor for SourceActor<R, S, F>
where
    R: ChainRpc + Clone + 'static,
    S: IngestionStorage + 'static,
    F: StopFlagStorage + 'static,
{
    type Error = DriverError;

    async fn start(mut self) -> Result<(), Self::Error> {
        let source_id = self.config.source_id.clone();
        info!(
            target: "indexer::supervisor",
            %source_id,
            policy = ?self.restart_policy,
            "Starting source actor"
        );

        let exit = supervise(
            &source_id,
            self.restart_policy,
            self.max_restarts,
            &self.cancel_token,
            || self.driver().run(),
        )
        .await?;

        info!(target: "indexer::supervisor", %source_id, ?exit, "Source actor finished");
        Ok(())
    }
}
