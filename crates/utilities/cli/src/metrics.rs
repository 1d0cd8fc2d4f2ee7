//! Prometheus metrics CLI args and exporter setup.

use clap::Args;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use thiserror::Error;

/// Prometheus metrics flags.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct MetricsArgs {
    /// Controls whether Prometheus metrics are enabled. Disabled by default.
    #[arg(
        long = "metrics.enabled",
        global = true,
        default_value_t = false,
        env = "KONA_METRICS_ENABLED"
    )]
    pub enabled: bool,

    /// The IP address to use for Prometheus metrics.
    #[arg(long = "metrics.addr", global = true, default_value = "0.0.0.0", env = "KONA_METRICS_ADDR")]
    pub addr: IpAddr,

    /// The port to use for Prometheus metrics.
    #[arg(long = "metrics.port", global = true, default_value_t = 9090, env = "KONA_METRICS_PORT")]
    pub port: u16,
}

impl Default for MetricsArgs {
    fn default() -> Self {
        Self { enabled: false, addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED), port: 9090 }
    }
}

impl MetricsArgs {
    /// Installs the Prometheus exporter if metrics are enabled.
    pub fn init_metrics(&self) -> Result<(), MetricsError> {
        if self.enabled {
            init_prometheus_server(self.addr, self.port)?;
        }
        Ok(())
    }
}

/// Errors raised while installing the metrics exporter.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The Prometheus exporter could not be installed.
    #[error("failed to install prometheus exporter: {0}")]
    Prometheus(#[from] BuildError),
}

/// Starts the Prometheus HTTP listener on `addr:port` and installs it as the global recorder.
///
/// Also registers the process metrics (CPU, memory, open file descriptors) of the binary.
pub fn init_prometheus_server(addr: IpAddr, port: u16) -> Result<(), MetricsError> {
    let prometheus_addr = SocketAddr::new(addr, port);
    PrometheusBuilder::new().with_http_listener(prometheus_addr).install()?;

    let collector = metrics_process::Collector::default();
    collector.describe();
    collector.collect();

    ::tracing::info!(target: "prometheus", "Serving metrics at: http://{}", prometheus_addr);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    /// A mock command that uses the MetricsArgs.
    #[derive(Parser, Debug, Clone)]
    #[command(about = "Mock command")]
    struct MockCommand {
        /// Metrics CLI Flags
        #[clap(flatten)]
        pub metrics: MetricsArgs,
    }

    #[test]
    fn test_metrics_args_defaults() {
        let args = MockCommand::parse_from(["test"]);
        assert_eq!(args.metrics, MetricsArgs::default());
    }

    #[test]
    fn test_metrics_args_listen_enabled() {
        let args = MockCommand::parse_from(["test", "--metrics.enabled"]);
        assert!(args.metrics.enabled);
    }

    #[test]
    fn test_metrics_args_listen_ip() {
        let args = MockCommand::parse_from(["test", "--metrics.addr", "127.0.0.1"]);
        let expected: IpAddr = "127.0.0.1".parse().unwrap();
        assert_eq!(args.metrics.addr, expected);
    }

    #[test]
    fn test_metrics_args_listen_port() {
        let args = MockCommand::parse_from(["test", "--metrics.port", "1234"]);
        assert_eq!(args.metrics.port, 1234);
    }

    #[test]
    fn test_disabled_metrics_install_nothing() {
        assert!(MetricsArgs::default().init_metrics().is_ok());
    }
}
