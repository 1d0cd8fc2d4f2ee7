use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Stable identifier of an ingestion source.
///
/// The identifier names the on-disk database of the source and keys its stop flag, so it must
/// not change between restarts.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    /// Creates a new [`SourceId`].
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The ingestion class of a source.
///
/// Every source of the same class ingests the same event and shares the same reorg channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// `OutputProposed` events of an `L2OutputOracle`.
    OutputProposals,
    /// `WithdrawalProven` events of an `OptimismPortal`.
    ProvenWithdrawals,
}

impl SourceKind {
    /// All known source kinds.
    pub const ALL: [Self; 2] = [Self::OutputProposals, Self::ProvenWithdrawals];

    /// Returns the snake case name of the kind, as used in config files and metric labels.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OutputProposals => "output_proposals",
            Self::ProvenWithdrawals => "proven_withdrawals",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`SourceKind`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown source kind: {0}")]
pub struct ParseSourceKindError(String);

impl FromStr for SourceKind {
    type Err = ParseSourceKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseSourceKindError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!("output_proposals".parse::<SourceKind>(), Ok(SourceKind::OutputProposals));
        assert_eq!("proven_withdrawals".parse::<SourceKind>(), Ok(SourceKind::ProvenWithdrawals));
        assert!("dispute_games".parse::<SourceKind>().is_err());
    }

    #[test]
    fn test_source_kind_serde_matches_display() {
        for kind in SourceKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }

    #[test]
    fn test_source_id_is_transparent() {
        let id: SourceId = serde_json::from_str("\"optimism-outputs\"").unwrap();
        assert_eq!(id.as_str(), "optimism-outputs");
        assert_eq!(id.to_string(), "optimism-outputs");
    }
}
