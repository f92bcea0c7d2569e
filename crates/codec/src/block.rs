//! Block context implementation.

use crate::{
    constants::{BLOCK_CONTEXT_BYTES_SIZE, BLOCK_CONTEXT_HASH_PREFIX_BYTES_SIZE},
    error::DecodingError,
    from_be_bytes_slice_and_advance_buf,
};

use alloy_primitives::{
    bytes::{Buf, BufMut},
    U256,
};

/// The context of a block inside a chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockContext {
    /// The block number.
    pub number: u64,
    /// The block timestamp.
    pub timestamp: u64,
    /// The block base fee.
    pub base_fee: U256,
    /// The block gas limit.
    pub gas_limit: u64,
    /// The block's total transaction count, L1 messages included.
    pub num_transactions: u16,
    /// The block's L1 message count, a prefix of the transactions.
    pub num_l1_messages: u16,
}

impl BlockContext {
    /// The length of an encoded block context.
    pub const BYTES_LENGTH: usize = BLOCK_CONTEXT_BYTES_SIZE;

    /// Tries to read from the input buffer into the [`BlockContext`].
    ///
    /// Fails with [`DecodingError::TooManyL1Messages`] if the declared L1 message
    /// count exceeds the declared transaction count.
    pub fn try_from_buf(buf: &mut &[u8]) -> Result<Self, DecodingError> {
        if buf.len() < Self::BYTES_LENGTH {
            return Err(DecodingError::Eof)
        }

        let number = from_be_bytes_slice_and_advance_buf!(u64, buf);
        let timestamp = from_be_bytes_slice_and_advance_buf!(u64, buf);

        let base_fee = U256::from_be_slice(&buf[0..32]);
        buf.advance(32);

        let gas_limit = from_be_bytes_slice_and_advance_buf!(u64, buf);
        let num_transactions = from_be_bytes_slice_and_advance_buf!(u16, buf);
        let num_l1_messages = from_be_bytes_slice_and_advance_buf!(u16, buf);

        if num_l1_messages > num_transactions {
            return Err(DecodingError::TooManyL1Messages { num_l1_messages, num_transactions })
        }

        Ok(Self { number, timestamp, base_fee, gas_limit, num_transactions, num_l1_messages })
    }

    /// Writes the canonical byte encoding of the context into the buffer.
    pub fn encode_into(&self, bytes: &mut Vec<u8>) {
        bytes.put_slice(&self.number.to_be_bytes());
        bytes.put_slice(&self.timestamp.to_be_bytes());
        bytes.put_slice(&self.base_fee.to_be_bytes::<32>());
        bytes.put_slice(&self.gas_limit.to_be_bytes());
        bytes.put_slice(&self.num_transactions.to_be_bytes());
        bytes.put_slice(&self.num_l1_messages.to_be_bytes());
    }

    /// Writes the context prefix folded into the chunk data hash.
    pub fn encode_hash_prefix_into(&self, bytes: &mut Vec<u8>) {
        let mut encoded = Vec::with_capacity(Self::BYTES_LENGTH);
        self.encode_into(&mut encoded);
        bytes.put_slice(&encoded[..BLOCK_CONTEXT_HASH_PREFIX_BYTES_SIZE]);
    }

    /// Returns the L2 transaction count for the block, excluding L1 messages.
    pub const fn l2_transactions_count(&self) -> usize {
        self.num_transactions.saturating_sub(self.num_l1_messages) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_round_trip_context() -> eyre::Result<()> {
        let context = BlockContext {
            number: 680,
            timestamp: 1696933798,
            base_fee: U256::from(1000),
            gas_limit: 10_000_000,
            num_transactions: 3,
            num_l1_messages: 1,
        };

        let mut encoded = Vec::new();
        context.encode_into(&mut encoded);
        assert_eq!(encoded.len(), BlockContext::BYTES_LENGTH);

        let decoded = BlockContext::try_from_buf(&mut encoded.as_slice())?;
        assert_eq!(decoded, context);

        Ok(())
    }

    #[test]
    fn test_should_reject_message_count_above_transaction_count() {
        let context = BlockContext { num_transactions: 1, num_l1_messages: 2, ..Default::default() };
        let mut encoded = Vec::new();
        context.encode_into(&mut encoded);

        assert_eq!(
            BlockContext::try_from_buf(&mut encoded.as_slice()),
            Err(DecodingError::TooManyL1Messages { num_l1_messages: 2, num_transactions: 1 })
        );
    }
}
