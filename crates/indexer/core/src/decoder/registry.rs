use super::{DecodeError, EventDecoder, OutputProposedDecoder, WithdrawalProvenDecoder};
use alloy_primitives::B256;
use kona_indexer_types::{DecodedRecord, RawLog};
use std::{collections::HashMap, sync::Arc};

/// Lookup table of [`EventDecoder`]s keyed by event signature.
#[derive(Debug, Clone, Default)]
pub struct DecoderRegistry {
    decoders: HashMap<B256, Arc<dyn EventDecoder>>,
}

impl DecoderRegistry {
    /// Creates a registry holding every built-in decoder.
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(OutputProposedDecoder));
        registry.register(Arc::new(WithdrawalProvenDecoder));
        registry
    }

    /// Registers `decoder`, replacing any decoder of the same signature.
    pub fn register(&mut self, decoder: Arc<dyn EventDecoder>) {
        self.decoders.insert(decoder.signature(), decoder);
    }

    /// Decodes `log` with the decoder registered for its `topics[0]`.
    pub fn decode(&self, log: &RawLog) -> Result<DecodedRecord, DecodeError> {
        let signature = log.signature().ok_or(DecodeError::MissingSignature)?;
        let decoder =
            self.decoders.get(&signature).ok_or(DecodeError::UnknownSignature(signature))?;
        decoder.decode(log)
    }

    /// Decodes every log of a chunk, failing on the first malformed one.
    pub fn decode_all(&self, logs: &[RawLog]) -> Result<Vec<DecodedRecord>, DecodeError> {
        logs.iter().map(|log| self.decode(log)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{output_proposed_log, withdrawal_proven_log};
    use alloy_primitives::U256;
    use kona_indexer_types::SourceKind;

    #[test]
    fn test_dispatch_on_signature() {
        let registry = DecoderRegistry::with_defaults();
        let records = registry
            .decode_all(&[
                output_proposed_log(U256::from(1), U256::from(10), U256::from(100), 5),
                withdrawal_proven_log(6, 0),
            ])
            .unwrap();

        let kinds: Vec<_> = records.iter().map(DecodedRecord::kind).collect();
        assert_eq!(kinds, vec![SourceKind::OutputProposals, SourceKind::ProvenWithdrawals]);
    }

    #[test]
    fn test_missing_signature() {
        let mut log = withdrawal_proven_log(6, 0);
        log.topics.clear();
        let err = DecoderRegistry::with_defaults().decode(&log).unwrap_err();
        assert!(matches!(err, DecodeError::MissingSignature));
    }

    #[test]
    fn test_unknown_signature() {
        let mut log = withdrawal_proven_log(6, 0);
        log.topics[0] = B256::repeat_byte(0x99);
        let err = DecoderRegistry::with_defaults().decode(&log).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownSignature(sig) if sig == B256::repeat_byte(0x99)));
    }

    #[test]
    fn test_empty_registry_rejects_everything() {
        let err = DecoderRegistry::default().decode(&withdrawal_proven_log(6, 0)).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownSignature(_)));
    }
}
