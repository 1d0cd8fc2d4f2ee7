//! Materialized rows of decoded events.

use super::LogPosition;
use alloy_primitives::{Address, B256};
use bytes::{Buf, BufMut};
use kona_indexer_types::{OutputProposal, ProvenWithdrawal};
use reth_codecs::Compact;
use serde::{Deserialize, Serialize};

/// Stored form of an [`OutputProposal`], the value of [`crate::models::OutputProposals`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Compact)]
pub struct OutputProposalEntry {
    /// Index of the output in the oracle, duplicated from the key.
    pub l2_output_index: u64,
    /// L2 block the output commits to.
    pub l2_block_number: u64,
    /// The proposed output root.
    pub output_root: B256,
    /// Timestamp of the proposal.
    pub l1_timestamp: u64,
    /// L1 block containing the proposal, the rollback discriminant.
    pub l1_block_number: u64,
    /// L1 transaction containing the proposal.
    pub l1_transaction_hash: B256,
}

impl From<&OutputProposal> for OutputProposalEntry {
    fn from(proposal: &OutputProposal) -> Self {
        Self {
            l2_output_index: proposal.l2_output_index,
            l2_block_number: proposal.l2_block_number,
            output_root: proposal.output_root,
            l1_timestamp: proposal.l1_timestamp,
            l1_block_number: proposal.l1_block_number,
            l1_transaction_hash: proposal.l1_transaction_hash,
        }
    }
}

impl From<OutputProposalEntry> for OutputProposal {
    fn from(entry: OutputProposalEntry) -> Self {
        Self {
            l2_output_index: entry.l2_output_index,
            l2_block_number: entry.l2_block_number,
            output_root: entry.output_root,
            l1_timestamp: entry.l1_timestamp,
            l1_block_number: entry.l1_block_number,
            l1_transaction_hash: entry.l1_transaction_hash,
        }
    }
}

/// Stored form of a [`ProvenWithdrawal`], the value of [`crate::models::ProvenWithdrawals`].
///
/// Block number and log index live in the [`LogPosition`] key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProvenWithdrawalEntry {
    /// Hash of the proven withdrawal.
    pub withdrawal_hash: B256,
    /// Sender on L2.
    pub from: Address,
    /// Recipient on L1.
    pub to: Address,
    /// L1 transaction containing the proof.
    pub l1_transaction_hash: B256,
}

impl ProvenWithdrawalEntry {
    /// Rebuilds the domain record from the entry and its key.
    pub const fn into_record(self, position: LogPosition) -> ProvenWithdrawal {
        ProvenWithdrawal {
            withdrawal_hash: self.withdrawal_hash,
            from: self.from,
            to: self.to,
            l1_block_number: position.block_number,
            log_index: position.log_index,
            l1_transaction_hash: self.l1_transaction_hash,
        }
    }
}

impl From<&ProvenWithdrawal> for ProvenWithdrawalEntry {
    fn from(withdrawal: &ProvenWithdrawal) -> Self {
        Self {
            withdrawal_hash: withdrawal.withdrawal_hash,
            from: withdrawal.from,
            to: withdrawal.to,
            l1_transaction_hash: withdrawal.l1_transaction_hash,
        }
    }
}

/// Fixed width encoding for [`ProvenWithdrawalEntry`].
///
/// ## Encoding Layout (ordered):
/// - `withdrawal_hash: B256`
/// - `from: Address`
/// - `to: Address`
/// - `l1_transaction_hash: B256`
impl Compact for ProvenWithdrawalEntry {
    fn to_compact<B>(&self, buf: &mut B) -> usize
    where
        B: BufMut + AsMut<[u8]>,
    {
        let start_len = buf.remaining_mut();

        buf.put_slice(self.withdrawal_hash.as_slice());
        buf.put_slice(self.from.as_slice());
        buf.put_slice(self.to.as_slice());
        buf.put_slice(self.l1_transaction_hash.as_slice());

        start_len - buf.remaining_mut()
    }

    fn from_compact(mut buf: &[u8], _len: usize) -> (Self, &[u8]) {
        assert!(buf.len() >= 104, "ProvenWithdrawalEntry::from_compact: buffer too small");

        let withdrawal_hash = B256::from_slice(&buf[..32]);
        buf.advance(32);
        let from = Address::from_slice(&buf[..20]);
        buf.advance(20);
        let to = Address::from_slice(&buf[..20]);
        buf.advance(20);
        let l1_transaction_hash = B256::from_slice(&buf[..32]);
        buf.advance(32);

        (Self { withdrawal_hash, from, to, l1_transaction_hash }, buf)
    }
}
