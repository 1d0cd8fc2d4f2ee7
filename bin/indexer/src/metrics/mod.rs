//! Global metrics for `kona-indexer`

mod version;
pub use version::VersionInfo;
