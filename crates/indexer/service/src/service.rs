//! Contains the main indexer service runner.

use anyhow::Result;
use kona_indexer_core::{AlloyChainRpc, DecoderRegistry, HeadWatcher, ReorgRouter, ResilientRpc};
use kona_indexer_storage::SourceDbFactory;
use kona_indexer_types::ReorgTopic;
use std::{collections::HashMap, sync::Arc, time::Duration};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use url::Url;

use crate::{IndexerActor, IndexerConfig, MetricWorker, ServiceError, SourceActor};

// simplify long type signature
type SourceRpc = Arc<ResilientRpc<AlloyChainRpc>>;

/// Interval between two gauge reports of the storage.
const METRICS_REPORT_INTERVAL: Duration = Duration::from_secs(30);

/// The main service structure of the indexer. Orchestrates the ingestion of every configured
/// source.
///
/// - One supervised [`SourceActor`] per source.
/// - One [`HeadWatcher`] per distinct RPC endpoint, signalling reorgs to the classes ingested from
///   it.
/// - One [`MetricWorker`] when metrics are enabled.
#[derive(Debug)]
pub struct Service {
    config: Arc<IndexerConfig>,

    database_factory: Arc<SourceDbFactory>,
    router: Arc<ReorgRouter>,
    decoders: Arc<DecoderRegistry>,
    rpcs: HashMap<Url, SourceRpc>,

    cancel_token: CancellationToken,
    // ingestion tasks, the service is done once they all finished
    sources: JoinSet<Result<(), anyhow::Error>>,
    // watchers and reporters, only stopped by cancellation
    background: JoinSet<Result<(), anyhow::Error>>,
}

impl Service {
    /// Creates a new indexer service instance, opening the settings database.
    pub fn new(cfg: IndexerConfig) -> Result<Self, ServiceError> {
        cfg.validate()?;

        let mut database_factory = SourceDbFactory::new(cfg.datadir.clone())?;
        if cfg.metrics_enabled {
            database_factory = database_factory.with_metrics();
        }

        Ok(Self {
            config: Arc::new(cfg),

            database_factory: Arc::new(database_factory),
            router: Arc::new(ReorgRouter::new()),
            decoders: Arc::new(DecoderRegistry::with_defaults()),
            rpcs: HashMap::new(),

            cancel_token: CancellationToken::new(),
            sources: JoinSet::new(),
            background: JoinSet::new(),
        })
    }

    /// Initialises the indexer service and spawns all of its tasks.
    pub fn initialise(&mut self) -> Result<(), ServiceError> {
        self.init_databases()?;
        self.init_sources()?;
        self.init_head_watchers();

        if self.config.metrics_enabled {
            self.init_metric_reporter();
        }
        Ok(())
    }

    fn init_databases(&self) -> Result<(), ServiceError> {
        info!(target: "indexer::service", "Initialising databases for all sources...");

        for source in &self.config.sources {
            self.database_factory.get_or_create_db(&source.id)?;
            info!(target: "indexer::service", source_id = %source.id, "Database initialized successfully");
        }
        Ok(())
    }

    /// Returns the RPC client of `url`, shared by every task talking to the same endpoint.
    fn rpc(&mut self, url: &Url) -> SourceRpc {
        self.rpcs
            .entry(url.clone())
            .or_insert_with(|| {
                let rpc = ResilientRpc::new(
                    AlloyChainRpc::new_http(url.clone()),
                    self.config.retry.clone(),
                    self.cancel_token.clone(),
                );
                Arc::new(if self.config.metrics_enabled { rpc.with_metrics() } else { rpc })
            })
            .clone()
    }

    fn init_sources(&mut self) -> Result<(), ServiceError> {
        info!(target: "indexer::service", "Initialising source actors...");

        let config = self.config.clone();
        for source in &config.sources {
            let db = self.database_factory.get_db(&source.id)?;
            let rpc = self.rpc(&source.rpc_url);
            let inbox = self.router.subscribe(source.reorg_topic()).shared();

            let mut actor = SourceActor::new(
                source.to_driver_config(),
                rpc,
                db,
                self.database_factory.settings(),
                self.decoders.clone(),
                inbox,
                self.cancel_token.clone(),
            )
            .with_restart_policy(config.restart_policy, config.max_restarts);
            if config.metrics_enabled {
                actor = actor.with_metrics();
            }

            info!(
                target: "indexer::service",
                source_id = %source.id,
                kind = %source.kind,
                rpc_url = %source.rpc_url,
                "Spawning source actor"
            );
            self.sources.spawn(async move {
                if let Err(err) = actor.start().await {
                    Err(anyhow::anyhow!(err))
                } else {
                    Ok(())
                }
            });
        }
        Ok(())
    }

    fn init_head_watchers(&mut self) {
        let Some(watcher_config) = self.config.watcher else {
            info!(target: "indexer::service", "Head watchers disabled, reorgs will not be detected");
            return;
        };

        for (url, kinds) in self.config.watched_kinds() {
            info!(target: "indexer::service", rpc_url = %url, ?kinds, "Initialising head watcher...");

            let topics =
                kinds.into_iter().map(|kind| ReorgTopic::new(url.clone(), kind)).collect();
            let mut watcher = HeadWatcher::new(
                self.rpc(&url),
                self.router.clone(),
                topics,
                watcher_config,
                self.cancel_token.clone(),
            );
            if self.config.metrics_enabled {
                watcher = watcher.with_metrics();
            }
            self.background.spawn(async move {
                watcher.run().await;
                Ok(())
            });
        }
    }

    fn init_metric_reporter(&mut self) {
        // Initialize the metric reporter actor.
        let database_factory = self.database_factory.clone();
        let cancel_token = self.cancel_token.clone();
        self.background.spawn(async move {
            if let Err(err) =
                MetricWorker::new(METRICS_REPORT_INTERVAL, vec![database_factory], cancel_token)
                    .start()
                    .await
            {
                Err(anyhow::anyhow!("metric worker failed: {err:?}"))
            } else {
                Ok(())
            }
        });
    }

    /// Runs the indexer service.
    ///
    /// Returns once every source finished, either stopped or cancelled, or as soon as one source
    /// fails for good.
    pub async fn run(&mut self) -> Result<()> {
        self.initialise()?;

        loop {
            match self.sources.join_next().await {
                Some(Ok(Ok(()))) => {
                    info!(target: "indexer::service", "Source task completed successfully.");
                }
                Some(Ok(Err(err))) => {
                    error!(target: "indexer::service", %err, "A source task encountered an error.");
                    self.cancel_token.cancel();
                    return Err(anyhow::anyhow!("A source task failed: {}", err));
                }
                Some(Err(err)) => {
                    error!(target: "indexer::service", %err, "A source task panicked.");
                    self.cancel_token.cancel();
                    return Err(anyhow::anyhow!("A source task failed: {}", err));
                }
                None => {
                    info!(target: "indexer::service", "All sources finished.");
                    break;
                }
            }
        }
        Ok(())
    }

    /// Cancels every task and waits for them to finish.
    pub async fn shutdown(mut self) -> Result<()> {
        self.cancel_token.cancel(); // Signal cancellation to all tasks

        for tasks in [&mut self.sources, &mut self.background] {
            while let Some(res) = tasks.join_next().await {
                match res {
                    Ok(Ok(_)) => {
                        info!(target: "indexer::service", "Task completed successfully during shutdown.");
                    }
                    Ok(Err(err)) => {
                        error!(target: "indexer::service", %err, "A task encountered an error during shutdown.");
                    }
                    Err(err) => {
                        error!(target: "indexer::service", %err, "A task encountered an error during shutdown.");
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConfigError, HeadTag, RestartPolicy, SourceConfig};
    use alloy_primitives::Address;
    use kona_indexer_core::{HeadWatcherConfig, RetryPolicy};
    use kona_indexer_storage::StopFlagStorage;
    use kona_indexer_types::{SourceId, SourceKind};
    use std::path::Path;

    fn source(id: &str, kind: SourceKind) -> SourceConfig {
        SourceConfig {
            id: SourceId::new(id),
            kind,
            // nothing listens here
            rpc_url: Url::parse("http://127.0.0.1:1").unwrap(),
            address: Address::repeat_byte(0x22),
            start_block: 1,
            max_range_size: crate::DEFAULT_MAX_RANGE_SIZE,
            poll_interval_secs: 1,
            head_tag: HeadTag::Latest,
            stop_at_block: None,
        }
    }

    fn make_test_config(
        datadir: &Path,
        sources: Vec<SourceConfig>,
        watcher: Option<HeadWatcherConfig>,
    ) -> IndexerConfig {
        IndexerConfig::new(
            datadir.to_path_buf(),
            false,
            sources,
            RetryPolicy::default(),
            watcher,
            RestartPolicy::Transient,
            None,
        )
    }

    fn stop_sources(datadir: &Path, ids: &[&str]) {
        let factory = SourceDbFactory::new(datadir.to_path_buf()).unwrap();
        for id in ids {
            factory.settings().set_stopped(&SourceId::new(*id), true).unwrap();
        }
    }

    #[test]
    fn test_new_rejects_empty_source_table() {
        let dir = tempfile::tempdir().unwrap();
        let err = Service::new(make_test_config(dir.path(), vec![], None)).unwrap_err();
        assert!(matches!(err, ServiceError::Config(ConfigError::NoSources)));
    }

    #[tokio::test]
    async fn test_run_returns_once_all_sources_stopped() {
        let dir = tempfile::tempdir().unwrap();
        stop_sources(dir.path(), &["outputs", "withdrawals"]);

        let sources = vec![
            source("outputs", SourceKind::OutputProposals),
            source("withdrawals", SourceKind::ProvenWithdrawals),
        ];
        let mut service = Service::new(make_test_config(dir.path(), sources, None)).unwrap();

        service.run().await.unwrap();
        assert_eq!(service.rpcs.len(), 1, "sources on one endpoint share a client");
        service.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_stops_head_watchers() {
        let dir = tempfile::tempdir().unwrap();
        stop_sources(dir.path(), &["outputs"]);

        let watcher =
            HeadWatcherConfig { poll_interval: Duration::from_secs(3600), ..Default::default() };
        let sources = vec![source("outputs", SourceKind::OutputProposals)];
        let mut service =
            Service::new(make_test_config(dir.path(), sources, Some(watcher))).unwrap();

        service.run().await.unwrap();
        assert_eq!(service.background.len(), 1);

        tokio::time::timeout(Duration::from_secs(5), service.shutdown())
            .await
            .expect("shutdown must not wait for the watcher interval")
            .unwrap();
    }
}
