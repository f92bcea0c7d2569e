use crate::{error::DecodingError, BlockContext};

use alloy_primitives::bytes::Buf;

/// A V1 chunk: block contexts only, the transaction payload lives in the blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkV1 {
    /// The contexts of the blocks in the chunk.
    pub blocks: Vec<BlockContext>,
}

impl ChunkV1 {
    /// Tries to decode the input buffer into a [`ChunkV1`], consuming it fully.
    pub fn try_from_buf(buf: &mut &[u8]) -> Result<Self, DecodingError> {
        let blocks_count = *buf.first().ok_or(DecodingError::Eof)? as usize;
        if blocks_count == 0 {
            return Err(DecodingError::NoBlockInChunk)
        }
        buf.advance(1);

        let expected = blocks_count * BlockContext::BYTES_LENGTH;
        if buf.len() != expected {
            return Err(DecodingError::LengthMismatch { got: buf.len(), expected })
        }

        let mut blocks = Vec::with_capacity(blocks_count);
        for _ in 0..blocks_count {
            blocks.push(BlockContext::try_from_buf(buf)?);
        }

        Ok(Self { blocks })
    }

    /// Returns the canonical byte encoding of the chunk.
    pub fn encoded(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + self.blocks.len() * BlockContext::BYTES_LENGTH);
        bytes.push(self.blocks.len() as u8);
        for context in &self.blocks {
            context.encode_into(&mut bytes);
        }

        bytes
    }
}
