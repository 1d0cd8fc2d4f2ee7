//! Build information gauge.

use metrics::gauge;
use std::fmt;

/// Name of the gauge carrying the build labels.
pub const INDEXER_INFO: &str = "kona_indexer_info";

/// Compile-time description of the running binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionInfo {
    /// Package version.
    pub version: &'static str,
    /// When the binary was built.
    pub build_timestamp: &'static str,
    /// Enabled cargo features, comma separated.
    pub cargo_features: &'static str,
    /// Short commit hash.
    pub git_sha: &'static str,
    /// Target triple.
    pub target_triple: &'static str,
    /// Cargo profile, `debug` or `release` usually.
    pub build_profile: &'static str,
}

impl VersionInfo {
    /// Collects the values emitted by the build script.
    pub const fn from_build() -> Self {
        use crate::version::*;

        Self {
            version: CARGO_PKG_VERSION,
            build_timestamp: VERGEN_BUILD_TIMESTAMP,
            cargo_features: VERGEN_CARGO_FEATURES,
            git_sha: GIT_SHA,
            target_triple: VERGEN_CARGO_TARGET_TRIPLE,
            build_profile: BUILD_PROFILE_NAME,
        }
    }

    /// Label pairs of the [`INDEXER_INFO`] gauge.
    pub fn labels(&self) -> [(&'static str, &'static str); 6] {
        let features = if self.cargo_features.is_empty() { "none" } else { self.cargo_features };
        [
            ("version", self.version),
            ("build_timestamp", self.build_timestamp),
            ("cargo_features", features),
            ("git_sha", self.git_sha),
            ("target_triple", self.target_triple),
            ("build_profile", self.build_profile),
        ]
    }

    /// Sets the [`INDEXER_INFO`] gauge to 1 with the build labels.
    pub fn register_version_metrics(&self) {
        gauge!(INDEXER_INFO, &self.labels()).set(1);
    }
}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} {})",
            self.version, self.git_sha, self.target_triple, self.build_profile
        )
    }
}
