//! Log flags and the resulting subscriber configuration.

use crate::LogFormat;
use clap::{ArgAction, Args};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Default name of the log file.
pub const DEFAULT_LOG_FILE_NAME: &str = "kona-indexer.log";

/// Log flags shared by every kona binary.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct LogArgs {
    /// Verbosity level (0-5).
    /// If set to 0, no logs are printed.
    /// By default, the verbosity level is set to 3 (info level).
    #[arg(short = 'v', long = "verbosity", action = ArgAction::Count, default_value = "3", global = true)]
    pub level: u8,

    /// If set, no logs are printed to stdout.
    #[arg(long = "log.stdout.quiet", short = 'q', global = true, default_value_t = false)]
    pub stdout_quiet: bool,

    /// The format of the logs printed to stdout.
    #[arg(long = "log.stdout.format", global = true, default_value = "full")]
    pub stdout_format: LogFormat,

    /// Directory of the log files. File logging is disabled when unset.
    #[arg(long = "log.file.directory", global = true)]
    pub file_directory: Option<PathBuf>,

    /// Name of the log file, suffixed with the rotation date.
    #[arg(long = "log.file.name", global = true, default_value = DEFAULT_LOG_FILE_NAME)]
    pub file_name: String,

    /// The format of the logs written to files.
    #[arg(long = "log.file.format", global = true, default_value = "full")]
    pub file_format: LogFormat,

    /// Rotation of the log files.
    #[arg(long = "log.file.rotation", global = true, default_value = "never")]
    pub file_rotation: LogRotation,
}

impl Default for LogArgs {
    fn default() -> Self {
        Self {
            level: 3,
            stdout_quiet: false,
            stdout_format: LogFormat::Full,
            file_directory: None,
            file_name: DEFAULT_LOG_FILE_NAME.to_string(),
            file_format: LogFormat::Full,
            file_rotation: LogRotation::Never,
        }
    }
}

/// Rotation period of the log files.
#[derive(
    Default, Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[clap(rename_all = "lowercase")]
pub enum LogRotation {
    /// A new file every minute.
    Minutely,
    /// A new file every hour.
    Hourly,
    /// A new file every day.
    Daily,
    /// A single file.
    #[default]
    Never,
}

/// Configuration of the stdout layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StdoutLogConfig {
    /// Format of the lines.
    pub format: LogFormat,
}

/// Configuration of the file layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLogConfig {
    /// Directory of the log files.
    pub directory_path: PathBuf,
    /// Name of the log file.
    pub file_name: String,
    /// Format of the lines.
    pub format: LogFormat,
    /// Rotation period.
    pub rotation: LogRotation,
}

/// Subscriber configuration derived from [`LogArgs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Most verbose level printed by any layer.
    pub global_level: LevelFilter,
    /// The stdout layer, if enabled.
    pub stdout_logs: Option<StdoutLogConfig>,
    /// The file layer, if enabled.
    pub file_logs: Option<FileLogConfig>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new(LogArgs::default())
    }
}

impl LogConfig {
    /// Creates a new [`LogConfig`] from the parsed flags.
    pub fn new(args: LogArgs) -> Self {
        let global_level = match args.level {
            0 => LevelFilter::OFF,
            1 => LevelFilter::ERROR,
            2 => LevelFilter::WARN,
            3 => LevelFilter::INFO,
            4 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        };

        let stdout_logs =
            (!args.stdout_quiet).then_some(StdoutLogConfig { format: args.stdout_format });
        let file_logs = args.file_directory.map(|directory_path| FileLogConfig {
            directory_path,
            file_name: args.file_name,
            format: args.file_format,
            rotation: args.file_rotation,
        });

        Self { global_level, stdout_logs, file_logs }
    }
}
