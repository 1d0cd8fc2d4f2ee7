use alloy_primitives::B256;
use thiserror::Error;

/// Errors raised while decoding a log.
///
/// Every variant indicates that the configured address or signature does not match the
/// contract being indexed; none of them is recoverable by retrying.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The log has no topics, so it can not be attributed to an event.
    #[error("log has no event signature")]
    MissingSignature,

    /// No decoder is registered for the signature.
    #[error("unknown event signature {0}")]
    UnknownSignature(B256),

    /// Topics or data do not match the declared event.
    #[error(transparent)]
    Abi(#[from] alloy_sol_types::Error),

    /// A `uint256` field does not fit the target integer.
    #[error("field {field} overflows u64")]
    Overflow {
        /// Name of the offending event field.
        field: &'static str,
    },
}
