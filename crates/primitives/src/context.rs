use alloy_primitives::Address;

/// The host-environment inputs for a state-mutating call.
///
/// Every operation on the queue and the chain is a pure function of the store
/// and this context: the caller identity replaces `msg.sender` and the
/// timestamp replaces the block timestamp. No operation reads a wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    /// The principal issuing the call.
    pub caller: Address,
    /// The timestamp of the enclosing host transaction, in seconds.
    pub timestamp: u64,
}

impl CallContext {
    /// Returns a new instance of [`CallContext`].
    pub const fn new(caller: Address, timestamp: u64) -> Self {
        Self { caller, timestamp }
    }
}
