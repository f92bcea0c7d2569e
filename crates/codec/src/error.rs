/// An error occurring during the codec process.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    /// An error occurring at the decoding stage.
    #[error(transparent)]
    Decoding(#[from] DecodingError),
}

/// An error occurring during the decoding.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodingError {
    /// The input does not carry a codec version.
    #[error("missing codec version in input")]
    MissingCodecVersion,
    /// The buffer ended before the fixed-size part of the layout.
    #[error("end of file")]
    Eof,
    /// The buffer length does not match the layout exactly.
    #[error("length mismatch: got {got} bytes, expected {expected}")]
    LengthMismatch {
        /// The buffer length.
        got: usize,
        /// The length implied by the layout.
        expected: usize,
    },
    /// The skipped message bitmap length disagrees with the declared message count.
    #[error("incorrect bitmap length: got {got} bytes, expected {expected}")]
    IncorrectBitmapLength {
        /// The bitmap length.
        got: usize,
        /// The length implied by the popped message count.
        expected: usize,
    },
    /// A chunk declares zero blocks.
    #[error("no block in chunk")]
    NoBlockInChunk,
    /// A block declares more embedded queue messages than transactions.
    #[error("block declares {num_l1_messages} L1 messages for {num_transactions} transactions")]
    TooManyL1Messages {
        /// The declared L1 message count.
        num_l1_messages: u16,
        /// The declared total transaction count.
        num_transactions: u16,
    },
    /// A version 5 batch must hold exactly one chunk with one empty block.
    #[error("invalid bridge batch: expected a single chunk with a single empty block")]
    InvalidBridgeBatch,
}
