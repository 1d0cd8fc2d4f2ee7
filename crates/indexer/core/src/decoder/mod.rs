//! Decoding of raw logs into indexer records.
//!
//! Each supported event has an [`EventDecoder`]; the [`DecoderRegistry`] dispatches a log to
//! the decoder registered for its `topics[0]`.

use alloy_primitives::B256;
use kona_indexer_types::{DecodedRecord, RawLog, SourceKind};
use std::fmt::Debug;

mod error;
pub use error::DecodeError;

mod events;
pub use events::{OutputProposedDecoder, WithdrawalProvenDecoder, event_signature};

mod registry;
pub use registry::DecoderRegistry;

/// Decodes the logs of a single event signature.
pub trait EventDecoder: Debug + Send + Sync {
    /// The `topics[0]` handled by this decoder.
    fn signature(&self) -> B256;

    /// The ingestion class producing the decoded records.
    fn kind(&self) -> SourceKind;

    /// Decodes `log`, whose signature is known to match [`EventDecoder::signature`].
    fn decode(&self, log: &RawLog) -> Result<DecodedRecord, DecodeError>;
}
