//! The per-source fetch loop.

mod config;
pub use config::DriverConfig;

mod error;
pub use error::{DriverError, DriverExit};

mod metrics;
pub(crate) use metrics::Metrics;

mod ingestion;
pub use ingestion::{IngestionDriver, poll_delay};
