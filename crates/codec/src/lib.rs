//! Versioned codecs for the batch header and chunk wire formats.
//!
//! The byte layouts here are bit-exact contracts: the keccak hash of the
//! header encoding is the chain-of-custody key linking every batch to its
//! parent, so encode/decode must round-trip for every supported version.

pub use block::BlockContext;
pub mod block;

pub mod chunk;
pub use chunk::{ChunkV0, ChunkV1};

pub mod constants;

pub use error::{CodecError, DecodingError};
mod error;

mod macros;

pub use v0::BatchHeaderV0;
pub mod v0;

pub use v1::BatchHeaderV1;
pub mod v1;

pub use v3::BatchHeaderV3;
pub mod v3;

pub use v7::BatchHeaderV7;
pub mod v7;

use alloy_primitives::{B256, U256};

/// The batch header, dispatched on the leading version byte.
///
/// Versions 1 and 2 share the V1 layout, versions 3 through 6 share the V3
/// layout, and version 7 onwards shares the V7 layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchHeader {
    /// The batch header for V0.
    V0(BatchHeaderV0),
    /// The batch header for V1.
    V1(BatchHeaderV1),
    /// The batch header for V3.
    V3(BatchHeaderV3),
    /// The batch header for V7.
    V7(BatchHeaderV7),
}

impl BatchHeader {
    /// Decodes the input into the appropriate batch header version, requiring the
    /// input to be consumed exactly.
    pub fn decode(input: &[u8]) -> Result<Self, CodecError> {
        let buf = &mut &*input;
        let header = Self::try_from_buf(buf)?;
        if !buf.is_empty() {
            return Err(DecodingError::LengthMismatch {
                got: input.len(),
                expected: input.len() - buf.len(),
            }
            .into())
        }

        Ok(header)
    }

    /// Tries to read from the input buffer into the appropriate batch header version.
    /// Returns [`DecodingError::Eof`] if the buffer is empty or does not contain
    /// enough bytes for the specific version.
    pub fn try_from_buf(buf: &mut &[u8]) -> Result<Self, DecodingError> {
        let version = *buf.first().ok_or(DecodingError::MissingCodecVersion)?;

        match version {
            0 => Ok(Self::V0(BatchHeaderV0::try_from_buf(buf)?)),
            1..=2 => Ok(Self::V1(BatchHeaderV1::try_from_buf(buf)?)),
            3..=6 => Ok(Self::V3(BatchHeaderV3::try_from_buf(buf)?)),
            7.. => Ok(Self::V7(BatchHeaderV7::try_from_buf(buf)?)),
        }
    }

    /// Returns the batch version.
    pub const fn version(&self) -> u8 {
        match self {
            Self::V0(header) => header.version,
            Self::V1(header) => header.version,
            Self::V3(header) => header.version,
            Self::V7(header) => header.version,
        }
    }

    /// Returns the index of the batch.
    pub const fn batch_index(&self) -> u64 {
        match self {
            Self::V0(header) => header.batch_index,
            Self::V1(header) => header.batch_index,
            Self::V3(header) => header.batch_index,
            Self::V7(header) => header.batch_index,
        }
    }

    /// Returns the parent batch hash.
    pub const fn parent_batch_hash(&self) -> B256 {
        match self {
            Self::V0(header) => header.parent_batch_hash,
            Self::V1(header) => header.parent_batch_hash,
            Self::V3(header) => header.parent_batch_hash,
            Self::V7(header) => header.parent_batch_hash,
        }
    }

    /// Returns the number of L1 messages popped in the batch, if the version carries it.
    pub const fn l1_message_popped(&self) -> Option<u64> {
        match self {
            Self::V0(header) => Some(header.l1_message_popped),
            Self::V1(header) => Some(header.l1_message_popped),
            Self::V3(header) => Some(header.l1_message_popped),
            Self::V7(_) => None,
        }
    }

    /// Returns the total number of L1 messages popped after the batch, if the version
    /// carries it.
    pub const fn total_l1_message_popped(&self) -> Option<u64> {
        match self {
            Self::V0(header) => Some(header.total_l1_message_popped),
            Self::V1(header) => Some(header.total_l1_message_popped),
            Self::V3(header) => Some(header.total_l1_message_popped),
            Self::V7(_) => None,
        }
    }

    /// Returns the data hash of the batch, if the version carries it.
    pub const fn data_hash(&self) -> Option<B256> {
        match self {
            Self::V0(header) => Some(header.data_hash),
            Self::V1(header) => Some(header.data_hash),
            Self::V3(header) => Some(header.data_hash),
            Self::V7(_) => None,
        }
    }

    /// Returns the blob versioned hash of the batch, if the version carries it.
    pub const fn blob_versioned_hash(&self) -> Option<B256> {
        match self {
            Self::V0(_) => None,
            Self::V1(header) => Some(header.blob_versioned_hash),
            Self::V3(header) => Some(header.blob_versioned_hash),
            Self::V7(header) => Some(header.blob_versioned_hash),
        }
    }

    /// Returns the skipped L1 message bitmap, if the version carries it. Skipping
    /// is disabled from version 3 onwards.
    pub fn skipped_l1_message_bitmap(&self) -> Option<&[U256]> {
        match self {
            Self::V0(header) => Some(&header.skipped_l1_message_bitmap),
            Self::V1(header) => Some(&header.skipped_l1_message_bitmap),
            Self::V3(_) | Self::V7(_) => None,
        }
    }

    /// Returns the canonical byte encoding of the header.
    pub fn encoded(&self) -> Vec<u8> {
        match self {
            Self::V0(header) => header.encoded(),
            Self::V1(header) => header.encoded(),
            Self::V3(header) => header.encoded(),
            Self::V7(header) => header.encoded(),
        }
    }

    /// Computes the hash for the header.
    pub fn hash_slow(&self) -> B256 {
        match self {
            Self::V0(header) => header.hash_slow(),
            Self::V1(header) => header.hash_slow(),
            Self::V3(header) => header.hash_slow(),
            Self::V7(header) => header.hash_slow(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_dispatch_on_version_byte() -> eyre::Result<()> {
        let headers = [
            BatchHeader::V0(BatchHeaderV0 { version: 0, ..Default::default() }),
            BatchHeader::V1(BatchHeaderV1 { version: 2, ..Default::default() }),
            BatchHeader::V3(BatchHeaderV3 { version: 5, ..Default::default() }),
            BatchHeader::V7(BatchHeaderV7::new(7, 0, B256::ZERO, B256::ZERO)),
        ];

        for header in headers {
            let decoded = BatchHeader::decode(&header.encoded())?;
            assert_eq!(decoded, header);
            assert_eq!(decoded.hash_slow(), header.hash_slow());
        }

        Ok(())
    }

    #[test]
    fn test_should_reject_empty_input() {
        assert_eq!(
            BatchHeader::decode(&[]),
            Err(DecodingError::MissingCodecVersion.into())
        );
    }

    #[test]
    fn test_should_reject_trailing_bytes() {
        let mut encoded =
            BatchHeader::V7(BatchHeaderV7::new(7, 0, B256::ZERO, B256::ZERO)).encoded();
        encoded.push(0);

        assert_eq!(
            BatchHeader::decode(&encoded),
            Err(DecodingError::LengthMismatch { got: 74, expected: 73 }.into())
        );
    }
}
