use crate::{
    constants::SKIPPED_L1_MESSAGE_BITMAP_ITEM_BYTES_SIZE, error::DecodingError,
    from_be_bytes_slice_and_advance_buf, from_slice_and_advance_buf,
};

use alloy_primitives::{
    bytes::{Buf, BufMut},
    keccak256, B256, U256,
};

/// The batch header for V0.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchHeaderV0 {
    /// The batch version.
    pub version: u8,
    /// The index of the batch.
    pub batch_index: u64,
    /// Number of L1 messages popped in the batch.
    pub l1_message_popped: u64,
    /// Number of total L1 messages popped after the batch.
    pub total_l1_message_popped: u64,
    /// The data hash of the batch.
    pub data_hash: B256,
    /// The parent batch hash.
    pub parent_batch_hash: B256,
    /// A bitmap to indicate which L1 messages are skipped in the batch, one
    /// 256-bit word per 256 popped messages.
    pub skipped_l1_message_bitmap: Vec<U256>,
}

impl BatchHeaderV0 {
    /// The length of the fixed-size part of the header.
    pub const BYTES_LENGTH: usize = 89;

    /// Returns a new instance [`BatchHeaderV0`].
    pub const fn new(
        version: u8,
        batch_index: u64,
        l1_message_popped: u64,
        total_l1_message_popped: u64,
        data_hash: B256,
        parent_batch_hash: B256,
        skipped_l1_message_bitmap: Vec<U256>,
    ) -> Self {
        Self {
            version,
            batch_index,
            l1_message_popped,
            total_l1_message_popped,
            data_hash,
            parent_batch_hash,
            skipped_l1_message_bitmap,
        }
    }

    /// Tries to read from the input buffer into the [`BatchHeaderV0`].
    /// Returns [`DecodingError::Eof`] if the buffer.len() < [`BatchHeaderV0::BYTES_LENGTH`].
    pub fn try_from_buf(buf: &mut &[u8]) -> Result<Self, DecodingError> {
        if buf.len() < Self::BYTES_LENGTH {
            return Err(DecodingError::Eof)
        }

        let version = from_be_bytes_slice_and_advance_buf!(u8, buf);
        let batch_index = from_be_bytes_slice_and_advance_buf!(u64, buf);

        let l1_message_popped = from_be_bytes_slice_and_advance_buf!(u64, buf);
        let total_l1_message_popped = from_be_bytes_slice_and_advance_buf!(u64, buf);

        let data_hash = from_slice_and_advance_buf!(B256, buf);
        let parent_batch_hash = from_slice_and_advance_buf!(B256, buf);

        let expected_bitmap_len = (l1_message_popped.div_ceil(256) as usize) *
            SKIPPED_L1_MESSAGE_BITMAP_ITEM_BYTES_SIZE;
        if buf.len() != expected_bitmap_len {
            return Err(DecodingError::IncorrectBitmapLength {
                got: buf.len(),
                expected: expected_bitmap_len,
            })
        }

        let skipped_l1_message_bitmap: Vec<_> = buf
            .chunks(SKIPPED_L1_MESSAGE_BITMAP_ITEM_BYTES_SIZE)
            .map(U256::from_be_slice)
            .collect();
        buf.advance(expected_bitmap_len);

        Ok(Self {
            version,
            batch_index,
            l1_message_popped,
            total_l1_message_popped,
            data_hash,
            parent_batch_hash,
            skipped_l1_message_bitmap,
        })
    }

    /// Returns the canonical byte encoding of the header.
    pub fn encoded(&self) -> Vec<u8> {
        let mut bytes = Vec::<u8>::with_capacity(
            Self::BYTES_LENGTH +
                self.skipped_l1_message_bitmap.len() * SKIPPED_L1_MESSAGE_BITMAP_ITEM_BYTES_SIZE,
        );
        bytes.put_slice(&self.version.to_be_bytes());
        bytes.put_slice(&self.batch_index.to_be_bytes());
        bytes.put_slice(&self.l1_message_popped.to_be_bytes());
        bytes.put_slice(&self.total_l1_message_popped.to_be_bytes());
        bytes.put_slice(&self.data_hash.0);
        bytes.put_slice(&self.parent_batch_hash.0);

        for word in &self.skipped_l1_message_bitmap {
            bytes.put_slice(&word.to_be_bytes::<32>());
        }

        bytes
    }

    /// Computes the hash for the header.
    pub fn hash_slow(&self) -> B256 {
        keccak256(self.encoded())
    }
}
