//! Contains the indexer CLI.

use crate::{flags::IndexerArgs, metrics::VersionInfo};
use anyhow::Result;
use clap::Parser;
use kona_cli::{LogArgs, LogConfig, MetricsArgs, cli_styles};
use kona_indexer_service::Service;
use tracing::{error, info};

/// CLI of the kona log indexer.
#[derive(Parser, Debug)]
#[command(name = "kona-indexer", about = "Continuous chunked log indexer", styles = cli_styles())]
pub struct Cli {
    /// Global args
    #[command(flatten)]
    pub global: LogArgs,

    /// Prometheus metrics args
    #[command(flatten)]
    pub metrics: MetricsArgs,

    /// Indexer args
    #[command(flatten)]
    pub indexer: IndexerArgs,
}

impl Cli {
    /// Runs the CLI.
    pub fn run(self) -> Result<()> {
        let version = VersionInfo::from_build();
        self.metrics.init_metrics()?;
        if self.metrics.enabled {
            version.register_version_metrics();
        }

        self.init_logs(&self.global)?;
        info!(target: "indexer", %version, "Starting kona-indexer");

        Self::run_until_ctrl_c(async move {
            let config = self.indexer.init_config(self.metrics.enabled)?;
            let mut service = Service::new(config)?;

            tokio::select! {
                res = service.run() => {
                    if let Err(err) = res {
                        error!(target: "indexer", %err, "Error running indexer service");
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!(target: "indexer", "Ctrl+C received, initiating service shutdown...");
                }
            }

            service.shutdown().await?;
            info!(target: "indexer", "Indexer service shut down gracefully.");
            Ok(())
        })
    }

    /// Run until ctrl-c is pressed.
    pub fn run_until_ctrl_c<F>(fut: F) -> Result<()>
    where
        F: std::future::Future<Output = Result<()>>,
    {
        let rt = Self::tokio_runtime().map_err(|e| anyhow::anyhow!(e))?;
        rt.block_on(fut)
    }

    /// Creates a new default tokio multi-thread [`Runtime`](tokio::runtime::Runtime) with all
    /// features enabled
    pub fn tokio_runtime() -> Result<tokio::runtime::Runtime, std::io::Error> {
        tokio::runtime::Builder::new_multi_thread().enable_all().build()
    }

    /// Initializes the tracing subscriber.
    pub fn init_logs(&self, args: &LogArgs) -> anyhow::Result<()> {
        let filter = tracing_subscriber::EnvFilter::from_default_env();

        LogConfig::new(args.clone()).init_tracing_subscriber(Some(filter))?;
        Ok(())
    }
}
