use crate::{
    constants::TRANSACTION_LENGTH_PREFIX_BYTES_SIZE, error::DecodingError,
    from_be_bytes_slice_and_advance_buf, BlockContext,
};

use alloy_primitives::{
    bytes::{Buf, BufMut},
    Bytes,
};

/// A V0 chunk: block contexts followed by the embedded L2 transaction bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkV0 {
    /// The contexts of the blocks in the chunk.
    pub blocks: Vec<BlockContext>,
    /// The RLP-encoded L2 transactions, grouped per block.
    pub l2_transactions: Vec<Vec<Bytes>>,
}

impl ChunkV0 {
    /// Tries to decode the input buffer into a [`ChunkV0`], consuming it fully.
    pub fn try_from_buf(buf: &mut &[u8]) -> Result<Self, DecodingError> {
        let blocks_count = *buf.first().ok_or(DecodingError::Eof)? as usize;
        if blocks_count == 0 {
            return Err(DecodingError::NoBlockInChunk)
        }
        buf.advance(1);

        let mut blocks = Vec::with_capacity(blocks_count);
        for _ in 0..blocks_count {
            blocks.push(BlockContext::try_from_buf(buf)?);
        }

        let mut l2_transactions = Vec::with_capacity(blocks_count);
        for context in &blocks {
            let mut transactions = Vec::with_capacity(context.l2_transactions_count());
            for _ in 0..context.l2_transactions_count() {
                if buf.len() < TRANSACTION_LENGTH_PREFIX_BYTES_SIZE {
                    return Err(DecodingError::Eof)
                }
                let length = from_be_bytes_slice_and_advance_buf!(u32, buf) as usize;

                if buf.len() < length {
                    return Err(DecodingError::Eof)
                }
                transactions.push(Bytes::copy_from_slice(&buf[..length]));
                buf.advance(length);
            }
            l2_transactions.push(transactions);
        }

        if !buf.is_empty() {
            return Err(DecodingError::LengthMismatch { got: buf.len(), expected: 0 })
        }

        Ok(Self { blocks, l2_transactions })
    }

    /// Returns the canonical byte encoding of the chunk.
    pub fn encoded(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + self.blocks.len() * BlockContext::BYTES_LENGTH);
        bytes.push(self.blocks.len() as u8);
        for context in &self.blocks {
            context.encode_into(&mut bytes);
        }
        for transactions in &self.l2_transactions {
            for transaction in transactions {
                bytes.put_slice(&(transaction.len() as u32).to_be_bytes());
                bytes.put_slice(transaction);
            }
        }

        bytes
    }
}
