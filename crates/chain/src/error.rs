use alloy_primitives::{Address, B256};
use settlement_codec::{CodecError, DecodingError};
use settlement_queue::QueueError;

/// An error occurring on a batch lifecycle operation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChainError {
    /// An error occurred in the message queue.
    #[error(transparent)]
    Queue(#[from] QueueError),
    /// An error occurred decoding a header or chunk.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// The caller lacks the sequencer role.
    #[error("caller {0} is not a sequencer")]
    CallerIsNotSequencer(Address),
    /// The caller lacks the prover role.
    #[error("caller {0} is not a prover")]
    CallerIsNotProver(Address),
    /// The caller is not the owner.
    #[error("caller {0} is not the owner")]
    CallerIsNotOwner(Address),
    /// The caller is not whitelisted for the enforced-batch path.
    #[error("caller {0} is not whitelisted")]
    CallerIsNotWhitelisted(Address),
    /// The contract is paused.
    #[error("the chain is paused")]
    Paused,
    /// Normal commit and finalize paths are blocked in enforced-batch mode.
    #[error("the chain is in enforced-batch mode")]
    InEnforcedBatchMode,
    /// The enforced-batch entry point requires the mode to be active or due.
    #[error("the chain is not in enforced-batch mode")]
    NotInEnforcedBatchMode,
    /// The batch index was committed before.
    #[error("batch {0} is already committed")]
    BatchIsAlreadyCommitted(u64),
    /// The batch index was verified before by this proof system.
    #[error("batch {0} is already verified")]
    BatchIsAlreadyVerified(u64),
    /// A commit carried no chunks or no blobs.
    #[error("batch is empty")]
    BatchIsEmpty,
    /// A supplied batch hash disagrees with the stored hash chain.
    #[error("incorrect batch hash: got {got}, expected {expected}")]
    IncorrectBatchHash {
        /// The supplied or recomputed hash.
        got: B256,
        /// The hash recorded in the store.
        expected: B256,
    },
    /// The batch version is not in the currently accepted set.
    #[error("incorrect batch version {0}")]
    IncorrectBatchVersion(u8),
    /// The revert range includes a finalized batch.
    #[error("cannot revert finalized batch {0}")]
    RevertFinalizedBatch(u64),
    /// A finalization carried a zero post-state root.
    #[error("state root is zero")]
    StateRootIsZero,
    /// The supplied bundle does not end at the boundary the size table requires.
    #[error("bundle size mismatch: bundle ends at {got}, expected {expected}")]
    BundleSizeMismatch {
        /// The supplied bundle end index.
        got: u64,
        /// The end index required by the bundle size table.
        expected: u64,
    },
    /// Finalization is paused: an unresolved state mismatch is pending or the
    /// proof system is disabled.
    #[error("finalization is paused")]
    FinalizationPaused,
    /// The blob commitment does not open to the batch data hash.
    #[error("point evaluation failed")]
    PointEvaluationFailed,
    /// The bundle proof was rejected by the verifier.
    #[error("proof verification failed")]
    ProofVerificationFailed,
    /// The previous queue generation still holds unfinalized messages.
    #[error("not all V1 messages are finalized")]
    NotAllV1MessagesAreFinalized,
    /// The genesis batch was imported before.
    #[error("genesis batch is already imported")]
    GenesisBatchImported,
    /// The genesis batch must carry a non-zero data hash.
    #[error("genesis data hash is zero")]
    GenesisDataHashIsZero,
    /// A genesis header field other than the data hash is non-zero.
    #[error("genesis header fields must be zero")]
    GenesisFieldsNotZero,
    /// The final queued message of a batch may never be skipped.
    #[error("cannot skip the last L1 message {queue_index} of the batch")]
    LastMessageSkipped {
        /// The queue index of the skipped message.
        queue_index: u64,
    },
    /// A versioned blob commitment is required for this codec version.
    #[error("missing blob commitment")]
    MissingBlobCommitment,
    /// The finalization of a V7 generation batch requires the consumed message count.
    #[error("missing total L1 message count")]
    MissingMessageCount,
    /// There is no unresolved state mismatch to resolve.
    #[error("no unresolved state mismatch")]
    NoUnresolvedState,
    /// A bundle size table entry must extend the table by whole bundles.
    #[error("invalid bundle size entry: size {size}, end index {end_batch_index}")]
    InvalidBundleSizeEntry {
        /// The bundle size of the rejected entry.
        size: u64,
        /// The end index of the rejected entry.
        end_batch_index: u64,
    },
}

impl From<DecodingError> for ChainError {
    fn from(err: DecodingError) -> Self {
        Self::Codec(err.into())
    }
}
