use std::vec::Vec;

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_rlp::{Encodable, Header};

/// The transaction type byte for a cross-domain message transaction.
pub const L1_MESSAGE_TX_TYPE: u8 = 0x7e;

/// A cross-domain message appended to the message queue.
///
/// The message is executed on the other domain as a transaction with
/// `queue_index` as its nonce.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct L1Message {
    /// The index of the message in the queue, used as the transaction nonce.
    pub queue_index: u64,
    /// The gas limit for execution on the other domain.
    pub gas_limit: u64,
    /// The target address on the other domain.
    pub to: Address,
    /// The value carried by the message.
    pub value: U256,
    /// The calldata of the message.
    pub input: Bytes,
    /// The sender of the message on the originating domain.
    pub sender: Address,
}

impl L1Message {
    /// Computes the canonical transaction hash for the message:
    /// `keccak256(0x7E || rlp([queue_index, gas_limit, to, value, input, sender]))`.
    ///
    /// The hash is deterministic from the message fields alone, letting off-chain
    /// relayers predict it before the message is executed.
    pub fn tx_hash(&self) -> B256 {
        let payload_length = self.queue_index.length() +
            self.gas_limit.length() +
            self.to.length() +
            self.value.length() +
            self.input.length() +
            self.sender.length();

        let header = Header { list: true, payload_length };
        let mut bytes = Vec::with_capacity(1 + header.length() + payload_length);
        bytes.push(L1_MESSAGE_TX_TYPE);
        header.encode(&mut bytes);
        self.queue_index.encode(&mut bytes);
        self.gas_limit.encode(&mut bytes);
        self.to.encode(&mut bytes);
        self.value.encode(&mut bytes);
        self.input.encode(&mut bytes);
        self.sender.encode(&mut bytes);

        keccak256(bytes)
    }
}
