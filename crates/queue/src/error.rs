use alloy_primitives::Address;

/// An error occurring on a message queue operation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueueError {
    /// The caller is not authorized for the operation.
    #[error("caller {0} is not authorized")]
    CallerIsNotAuthorized(Address),
    /// The message gas limit exceeds the configured maximum.
    #[error("gas limit {got} exceeds the maximum of {max}")]
    GasLimitExceeded {
        /// The requested gas limit.
        got: u64,
        /// The configured maximum gas limit.
        max: u64,
    },
    /// The message gas limit does not cover the intrinsic cost.
    #[error("gas limit {got} is below the intrinsic gas of {intrinsic}")]
    GasLimitBelowIntrinsicGas {
        /// The requested gas limit.
        got: u64,
        /// The intrinsic gas for the message.
        intrinsic: u64,
    },
    /// More than one bitmap word of messages was requested in a single pop.
    #[error("cannot pop {0} messages, limit is 256")]
    PopTooMany(u64),
    /// The pop start index does not match the pending cursor.
    #[error("pop start index {got} does not match the pending cursor {expected}")]
    PopStartMismatch {
        /// The requested start index.
        got: u64,
        /// The current pending queue index.
        expected: u64,
    },
    /// The pop would move the pending cursor past the appended frontier.
    #[error("cannot pop past the appended frontier {frontier}, requested {requested}")]
    PopBeyondAppended {
        /// The end index the pop would reach.
        requested: u64,
        /// The next queue index to be appended.
        frontier: u64,
    },
    /// The reset target is below the finalized cursor.
    #[error("cannot reset to {got}, messages are finalized up to {finalized}")]
    ResetBeforeFinalized {
        /// The requested start index.
        got: u64,
        /// The current finalized cursor.
        finalized: u64,
    },
    /// The reset target is ahead of the pending cursor.
    #[error("cannot reset to {got}, ahead of the pending cursor {pending}")]
    ResetAheadOfPending {
        /// The requested start index.
        got: u64,
        /// The current pending queue index.
        pending: u64,
    },
    /// The finalization target is behind the finalized cursor.
    #[error("finalized index {got} is behind the current cursor {current}")]
    FinalizedIndexTooSmall {
        /// The requested finalized index.
        got: u64,
        /// The current finalized cursor.
        current: u64,
    },
    /// The finalization target is past the popped or appended frontier.
    #[error("finalized index {got} is past the frontier {frontier}")]
    FinalizedIndexTooLarge {
        /// The requested finalized index.
        got: u64,
        /// The popped or appended frontier.
        frontier: u64,
    },
    /// The message has already been dropped.
    #[error("message {0} was already dropped")]
    AlreadyDropped(u64),
    /// The message is not yet finalized and cannot be dropped.
    #[error("cannot drop pending message {0}")]
    CannotDropPending(u64),
    /// The message was included, not skipped, and cannot be dropped.
    #[error("message {0} was not skipped")]
    NotSkipped(u64),
}
