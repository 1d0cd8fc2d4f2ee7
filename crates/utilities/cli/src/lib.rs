//! Shared CLI utilities of the kona binaries: log and metrics flags, the tracing subscriber and
//! the clap color theme.

mod log;
pub use log::{DEFAULT_LOG_FILE_NAME, FileLogConfig, LogArgs, LogConfig, LogRotation, StdoutLogConfig};

mod tracing;
pub use tracing::{LogFormat, init_test_tracing};

mod metrics;
pub use metrics::{MetricsArgs, MetricsError, init_prometheus_server};

mod styles;
pub use styles::cli_styles;
