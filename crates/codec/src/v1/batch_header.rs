use crate::{
    constants::SKIPPED_L1_MESSAGE_BITMAP_ITEM_BYTES_SIZE, error::DecodingError,
    from_be_bytes_slice_and_advance_buf, from_slice_and_advance_buf,
};

use alloy_primitives::{
    bytes::{Buf, BufMut},
    keccak256, B256, U256,
};

/// The batch header for V1.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchHeaderV1 {
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
    /// The blob versioned hash for the batch.
    pub blob_versioned_hash: B256,
    /// The parent batch hash.
    pub parent_batch_hash: B256,
    /// A bitmap to indicate which L1 messages are skipped in the batch.
    pub skipped_l1_message_bitmap: Vec<U256>,
}

impl BatchHeaderV1 {
    /// The length of the fixed-size part of the header.
    pub const BYTES_LENGTH: usize = 121;

    /// Returns a new instance [`BatchHeaderV1`].
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        version: u8,
        batch_index: u64,
        l1_message_popped: u64,
        total_l1_message_popped: u64,
        data_hash: B256,
        blob_versioned_hash: B256,
        parent_batch_hash: B256,
        skipped_l1_message_bitmap: Vec<U256>,
    ) -> Self {
        Self {
            version,
            batch_index,
            l1_message_popped,
            total_l1_message_popped,
            data_hash,
            blob_versioned_hash,
            parent_batch_hash,
            skipped_l1_message_bitmap,
        }
    }

    /// Tries to read from the input buffer into the [`BatchHeaderV1`].
    /// Returns [`DecodingError::Eof`] if the buffer.len() < [`BatchHeaderV1::BYTES_LENGTH`].
    pub fn try_from_buf(buf: &mut &[u8]) -> Result<Self, DecodingError> {
        if buf.len() < Self::BYTES_LENGTH {
            return Err(DecodingError::Eof)
        }

        let version = from_be_bytes_slice_and_advance_buf!(u8, buf);
        let batch_index = from_be_bytes_slice_and_advance_buf!(u64, buf);

        let l1_message_popped = from_be_bytes_slice_and_advance_buf!(u64, buf);
        let total_l1_message_popped = from_be_bytes_slice_and_advance_buf!(u64, buf);

        let data_hash = from_slice_and_advance_buf!(B256, buf);
        let blob_versioned_hash = from_slice_and_advance_buf!(B256, buf);
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
            blob_versioned_hash,
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
        bytes.put_slice(&self.blob_versioned_hash.0);
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

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    fn header() -> BatchHeaderV1 {
        BatchHeaderV1::new(
            1,
            206594,
            0,
            815396,
            b256!("e58ee8f9c15196600f9e618806bc835d1fdc35fe2467ed71adcf1a7c47d4e7eb"),
            b256!("014edb613b68d298710004d463b92eed58aab3af7386b8f32127af53b33fc9be"),
            b256!("a1aece1f54b8a429b121d61619b49f5c9da3b83d924c21c418160531e1319658"),
            vec![],
        )
    }

    #[test]
    fn test_should_round_trip_header() -> eyre::Result<()> {
        let header = header();
        let encoded = header.encoded();
        assert_eq!(encoded.len(), BatchHeaderV1::BYTES_LENGTH);

        let decoded = BatchHeaderV1::try_from_buf(&mut encoded.as_slice())?;
        assert_eq!(decoded, header);

        Ok(())
    }

    #[test]
    fn test_should_round_trip_header_with_bitmap() -> eyre::Result<()> {
        let header = BatchHeaderV1 {
            l1_message_popped: 300,
            skipped_l1_message_bitmap: vec![U256::MAX, U256::from(0xff)],
            ..header()
        };
        let encoded = header.encoded();
        let decoded = BatchHeaderV1::try_from_buf(&mut encoded.as_slice())?;
        assert_eq!(decoded, header);

        Ok(())
    }

    #[test]
    fn test_should_hash_header() {
        // <https://etherscan.io/tx/0x27d73eef6f0de411f8db966f0def9f28c312a0ae5cfb1ac09ec23f8fa18b005b>
        let expected = b256!("46B1C269784F1FC6CC12A04A65496D2D2B24D77EF582E893A510A963D09F4661");
        assert_eq!(header().hash_slow(), expected);
    }

    #[test]
    fn test_should_reject_missing_bitmap() {
        let header = BatchHeaderV1 { l1_message_popped: 1, ..header() };
        let encoded = header.encoded();
        assert_eq!(
            BatchHeaderV1::try_from_buf(&mut encoded.as_slice()),
            Err(DecodingError::IncorrectBitmapLength { got: 0, expected: 32 })
        );
    }
}
