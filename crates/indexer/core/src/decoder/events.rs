use super::{DecodeError, EventDecoder};
use alloy_primitives::{B256, LogData, U256};
use alloy_sol_types::{SolEvent, sol};
use kona_indexer_types::{DecodedRecord, OutputProposal, ProvenWithdrawal, RawLog, SourceKind};

sol! {
    /// Emitted by the `L2OutputOracle` when an output root is proposed.
    #[derive(Debug, PartialEq, Eq)]
    event OutputProposed(
        bytes32 indexed outputRoot,
        uint256 indexed l2OutputIndex,
        uint256 indexed l2BlockNumber,
        uint256 l1Timestamp
    );

    /// Emitted by the `OptimismPortal` when a withdrawal is proven.
    #[derive(Debug, PartialEq, Eq)]
    event WithdrawalProven(
        bytes32 indexed withdrawalHash,
        address indexed from,
        address indexed to
    );
}

/// Returns the `topics[0]` of the event ingested by `kind`.
pub const fn event_signature(kind: SourceKind) -> B256 {
    match kind {
        SourceKind::OutputProposals => OutputProposed::SIGNATURE_HASH,
        SourceKind::ProvenWithdrawals => WithdrawalProven::SIGNATURE_HASH,
    }
}

fn to_u64(value: U256, field: &'static str) -> Result<u64, DecodeError> {
    u64::try_from(value).map_err(|_| DecodeError::Overflow { field })
}

fn decode_event<E: SolEvent>(log: &RawLog) -> Result<E, DecodeError> {
    let data = LogData::new_unchecked(log.topics.clone(), log.data.clone());
    Ok(E::decode_log_data(&data)?)
}

/// Decodes `OutputProposed` into [`OutputProposal`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputProposedDecoder;

impl EventDecoder for OutputProposedDecoder {
    fn signature(&self) -> B256 {
        OutputProposed::SIGNATURE_HASH
    }

    fn kind(&self) -> SourceKind {
        SourceKind::OutputProposals
    }

    fn decode(&self, log: &RawLog) -> Result<DecodedRecord, DecodeError> {
        let event = decode_event::<OutputProposed>(log)?;
        Ok(OutputProposal {
            l2_output_index: to_u64(event.l2OutputIndex, "l2OutputIndex")?,
            l2_block_number: to_u64(event.l2BlockNumber, "l2BlockNumber")?,
            output_root: event.outputRoot,
            l1_timestamp: to_u64(event.l1Timestamp, "l1Timestamp")?,
            l1_block_number: log.block_number,
            l1_transaction_hash: log.transaction_hash,
        }
        .into())
    }
}

/// Decodes `WithdrawalProven` into [`ProvenWithdrawal`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WithdrawalProvenDecoder;

impl EventDecoder for WithdrawalProvenDecoder {
    fn signature(&self) -> B256 {
        WithdrawalProven::SIGNATURE_HASH
    }

    fn kind(&self) -> SourceKind {
        SourceKind::ProvenWithdrawals
    }

    fn decode(&self, log: &RawLog) -> Result<DecodedRecord, DecodeError> {
        let event = decode_event::<WithdrawalProven>(log)?;
        Ok(ProvenWithdrawal {
            withdrawal_hash: event.withdrawalHash,
            from: event.from,
            to: event.to,
            l1_block_number: log.block_number,
            log_index: log.log_index,
            l1_transaction_hash: log.transaction_hash,
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{output_proposed_log, withdrawal_proven_log};
    use alloy_primitives::{Address, Bytes, b256};

    #[test]
    fn test_signatures() {
        assert_eq!(
            event_signature(SourceKind::OutputProposals),
            b256!("0xa7aaf2512769da4e444e3de247be2564225c2e7a8f74cfe528e46e17d24868e2")
        );
        assert_eq!(
            event_signature(SourceKind::ProvenWithdrawals),
            b256!("0x67a6208cfcc0801d50f6cbe764733f4fddf66ac0b04442061a8a8c0cb6b63f62")
        );
    }

    #[test]
    fn test_decode_output_proposed() {
        let log = output_proposed_log(U256::from(7), U256::from(1_800), U256::from(1_700_000_123), 105);

        let record = OutputProposedDecoder.decode(&log).unwrap();
        assert_eq!(
            record,
            DecodedRecord::OutputProposal(OutputProposal {
                l2_output_index: 7,
                l2_block_number: 1_800,
                output_root: B256::repeat_byte(0xee),
                l1_timestamp: 1_700_000_123,
                l1_block_number: 105,
                l1_transaction_hash: B256::repeat_byte(0x0f),
            })
        );
    }

    #[test]
    fn test_decode_output_proposed_overflow() {
        let log = output_proposed_log(U256::MAX, U256::from(1), U256::from(1), 1);
        let err = OutputProposedDecoder.decode(&log).unwrap_err();
        assert!(matches!(err, DecodeError::Overflow { field: "l2OutputIndex" }));
    }

    #[test]
    fn test_decode_output_proposed_wrong_topic_count() {
        let mut log = output_proposed_log(U256::from(1), U256::from(1), U256::from(1), 1);
        log.topics.pop();
        assert!(matches!(OutputProposedDecoder.decode(&log), Err(DecodeError::Abi(_))));
    }

    #[test]
    fn test_decode_output_proposed_truncated_data() {
        let mut log = output_proposed_log(U256::from(1), U256::from(1), U256::from(1), 1);
        log.data = Bytes::copy_from_slice(&log.data[..16]);
        assert!(matches!(OutputProposedDecoder.decode(&log), Err(DecodeError::Abi(_))));
    }

    #[test]
    fn test_decode_withdrawal_proven() {
        let record = WithdrawalProvenDecoder.decode(&withdrawal_proven_log(42, 3)).unwrap();
        assert_eq!(
            record,
            DecodedRecord::ProvenWithdrawal(ProvenWithdrawal {
                withdrawal_hash: B256::repeat_byte(3),
                from: Address::repeat_byte(0xaa),
                to: Address::repeat_byte(0xbb),
                l1_block_number: 42,
                log_index: 3,
                l1_transaction_hash: B256::repeat_byte(0x0f),
            })
        );
    }
}
