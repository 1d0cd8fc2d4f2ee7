use crate::SourceKind;
use alloy_primitives::{Address, B256};
use derive_more::From;
use serde::{Deserialize, Serialize};

/// An L2 output root proposed to the `L2OutputOracle`.
///
/// Materialized under the natural key `l2_output_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputProposal {
    /// Index of the output in the oracle.
    pub l2_output_index: u64,
    /// L2 block the output commits to.
    pub l2_block_number: u64,
    /// The proposed output root.
    pub output_root: B256,
    /// Timestamp of the proposal, seconds since Unix epoch.
    pub l1_timestamp: u64,
    /// L1 block containing the proposal.
    pub l1_block_number: u64,
    /// L1 transaction containing the proposal.
    pub l1_transaction_hash: B256,
}

/// A withdrawal proven on the `OptimismPortal`.
///
/// Materialized under the natural key `(l1_block_number, log_index)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenWithdrawal {
    /// Hash of the proven withdrawal.
    pub withdrawal_hash: B256,
    /// Sender on L2.
    pub from: Address,
    /// Recipient on L1.
    pub to: Address,
    /// L1 block containing the proof.
    pub l1_block_number: u64,
    /// Index of the log within the L1 block.
    pub log_index: u64,
    /// L1 transaction containing the proof.
    pub l1_transaction_hash: B256,
}

/// A decoded event, ready to be imported.
#[derive(Debug, Clone, PartialEq, Eq, From, Serialize, Deserialize)]
pub enum DecodedRecord {
    /// See [`OutputProposal`].
    OutputProposal(OutputProposal),
    /// See [`ProvenWithdrawal`].
    ProvenWithdrawal(ProvenWithdrawal),
}

impl DecodedRecord {
    /// The L1 block the record was emitted in. Rollbacks discriminate on this value.
    pub const fn l1_block_number(&self) -> u64 {
        match self {
            Self::OutputProposal(proposal) => proposal.l1_block_number,
            Self::ProvenWithdrawal(withdrawal) => withdrawal.l1_block_number,
        }
    }

    /// The ingestion class producing this record.
    pub const fn kind(&self) -> SourceKind {
        match self {
            Self::OutputProposal(_) => SourceKind::OutputProposals,
            Self::ProvenWithdrawal(_) => SourceKind::ProvenWithdrawals,
        }
    }
}
