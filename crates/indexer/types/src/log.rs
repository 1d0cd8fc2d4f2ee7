use alloy_primitives::{Address, B256, Bytes};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// A log entry as returned by `eth_getLogs`, restricted to the fields the indexer relies on.
///
/// Unlike the RPC representation every positional field is mandatory: logs of pending blocks
/// can not be attributed to a block and are rejected at the RPC boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLog {
    /// Contract that emitted the log.
    pub address: Address,
    /// Ordered topics, `topics[0]` being the event signature for non-anonymous events.
    pub topics: Vec<B256>,
    /// ABI encoded non-indexed parameters.
    pub data: Bytes,
    /// Block the log was included in.
    pub block_number: u64,
    /// Transaction that emitted the log.
    pub transaction_hash: B256,
    /// Index of the log within its block.
    pub log_index: u64,
}

impl RawLog {
    /// Returns the event signature topic, if any.
    pub fn signature(&self) -> Option<B256> {
        self.topics.first().copied()
    }

    /// Converts an RPC log, returning `None` for logs lacking block, transaction or index
    /// metadata.
    pub fn from_rpc(log: alloy_rpc_types_eth::Log) -> Option<Self> {
        Some(Self {
            address: log.address(),
            topics: log.topics().to_vec(),
            block_number: log.block_number?,
            transaction_hash: log.transaction_hash?,
            log_index: log.log_index?,
            data: log.inner.data.data,
        })
    }
}

/// Minimal block header reference used to follow the chain head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[display("number: {number}, hash: {hash}, parent_hash: {parent_hash}")]
pub struct BlockRef {
    /// The height of the block.
    pub number: u64,
    /// The hash of the block itself.
    pub hash: B256,
    /// The hash of the parent block.
    pub parent_hash: B256,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{LogData, address, b256, bytes};

    fn rpc_log(block_number: Option<u64>) -> alloy_rpc_types_eth::Log {
        alloy_rpc_types_eth::Log {
            inner: alloy_primitives::Log {
                address: address!("0xdfe97868233d1aa22e815a266982f2cf17685a27"),
                data: LogData::new_unchecked(
                    vec![b256!("0xa7aaf2512769da4e444e3de247be2564225c2e7a8f74cfe528e46e17d24868e2")],
                    bytes!("0x01"),
                ),
            },
            block_number,
            transaction_hash: Some(B256::repeat_byte(0x11)),
            log_index: Some(3),
            ..Default::default()
        }
    }

    #[test]
    fn test_from_rpc_log() {
        let log = RawLog::from_rpc(rpc_log(Some(17))).unwrap();
        assert_eq!(log.block_number, 17);
        assert_eq!(log.log_index, 3);
        assert_eq!(log.transaction_hash, B256::repeat_byte(0x11));
        assert_eq!(log.data, bytes!("0x01"));
        assert_eq!(
            log.signature(),
            Some(b256!("0xa7aaf2512769da4e444e3de247be2564225c2e7a8f74cfe528e46e17d24868e2"))
        );
    }

    #[test]
    fn test_from_rpc_pending_log() {
        assert!(RawLog::from_rpc(rpc_log(None)).is_none());
    }
}
