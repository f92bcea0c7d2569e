use std::sync::Arc;

use alloy_primitives::{Address, Bytes, B256, U256};
use parking_lot::RwLock;
use settlement_primitives::{CallContext, L1Message, SystemConfig};

use crate::{
    check_gas_limit, error::QueueError, event::QueueEvent, metrics::QueueMetrics, PagedBitmap,
};

/// The intrinsic gas charged per calldata byte in the first queue generation.
const INTRINSIC_GAS_PER_BYTE: u64 = 16;

/// The first generation of the cross-domain message queue.
///
/// Stores the transaction hash of every appended message and tracks
/// consumption through two monotonic cursors: `pending_queue_index` (next
/// index to be popped by a commit) and `next_unfinalized_queue_index` (next
/// index requiring finalization). Popped messages are individually marked
/// skipped or included through a bitmap; a skipped and finalized message may
/// be dropped exactly once.
#[derive(Debug)]
pub struct MessageQueueV1 {
    /// The messenger collaborator allowed to append messages.
    messenger: Address,
    /// The gateway collaborator allowed to append enforced transactions.
    gateway: Address,
    /// The chain state machine allowed to pop, reset and finalize.
    chain: Address,
    /// The shared system configuration.
    config: Arc<RwLock<SystemConfig>>,
    /// The transaction hash of each appended message, indexed by queue index.
    messages: Vec<B256>,
    /// The next index to be popped by a commit.
    pending_queue_index: u64,
    /// The next index requiring finalization.
    next_unfinalized_queue_index: u64,
    /// The skip marks of popped messages.
    skipped: PagedBitmap,
    /// The drop marks of finalized skipped messages.
    dropped: PagedBitmap,
    /// The append-only event journal.
    events: Vec<QueueEvent>,
    /// The queue metrics.
    metrics: QueueMetrics,
}

impl MessageQueueV1 {
    /// Returns a new empty queue with the given authorized collaborators.
    pub fn new(
        messenger: Address,
        gateway: Address,
        chain: Address,
        config: Arc<RwLock<SystemConfig>>,
    ) -> Self {
        Self {
            messenger,
            gateway,
            chain,
            config,
            messages: Vec::new(),
            pending_queue_index: 0,
            next_unfinalized_queue_index: 0,
            skipped: PagedBitmap::new(),
            dropped: PagedBitmap::new(),
            events: Vec::new(),
            metrics: QueueMetrics::default(),
        }
    }

    /// Returns the next queue index to be assigned.
    pub fn next_cross_domain_message_index(&self) -> u64 {
        self.messages.len() as u64
    }

    /// Returns the next index to be popped by a commit.
    pub const fn pending_queue_index(&self) -> u64 {
        self.pending_queue_index
    }

    /// Returns the next index requiring finalization.
    pub const fn next_unfinalized_queue_index(&self) -> u64 {
        self.next_unfinalized_queue_index
    }

    /// Returns the transaction hash of the message at the given index.
    pub fn message_hash(&self, queue_index: u64) -> Option<B256> {
        self.messages.get(queue_index as usize).copied()
    }

    /// Returns true if the popped message at the given index was skipped.
    pub fn is_message_skipped(&self, queue_index: u64) -> bool {
        queue_index < self.pending_queue_index && self.skipped.get(queue_index)
    }

    /// Returns true if the message at the given index was dropped.
    pub fn is_message_dropped(&self, queue_index: u64) -> bool {
        self.dropped.get(queue_index)
    }

    /// Returns true if every appended message has been finalized.
    pub fn is_drained(&self) -> bool {
        self.next_unfinalized_queue_index == self.next_cross_domain_message_index()
    }

    /// Appends a cross-domain message on behalf of the messenger collaborator.
    /// The messenger is the recorded sender and the message carries no value.
    pub fn append_cross_domain_message(
        &mut self,
        ctx: CallContext,
        target: Address,
        gas_limit: u64,
        data: Bytes,
    ) -> Result<u64, QueueError> {
        if ctx.caller != self.messenger {
            return Err(QueueError::CallerIsNotAuthorized(ctx.caller))
        }
        self.append(ctx.caller, target, U256::ZERO, gas_limit, data)
    }

    /// Appends an enforced transaction on behalf of the gateway collaborator,
    /// with an explicit sender and value.
    pub fn append_enforced_transaction(
        &mut self,
        ctx: CallContext,
        sender: Address,
        target: Address,
        value: U256,
        gas_limit: u64,
        data: Bytes,
    ) -> Result<u64, QueueError> {
        if ctx.caller != self.gateway {
            return Err(QueueError::CallerIsNotAuthorized(ctx.caller))
        }
        self.append(sender, target, value, gas_limit, data)
    }

    fn append(
        &mut self,
        sender: Address,
        target: Address,
        value: U256,
        gas_limit: u64,
        data: Bytes,
    ) -> Result<u64, QueueError> {
        check_gas_limit(&self.config.read(), gas_limit, data.len(), INTRINSIC_GAS_PER_BYTE)?;

        let queue_index = self.next_cross_domain_message_index();
        let message =
            L1Message { queue_index, gas_limit, to: target, value, input: data.clone(), sender };
        let tx_hash = message.tx_hash();
        self.messages.push(tx_hash);

        tracing::debug!(target: "settlement::queue", queue_index, %tx_hash, "message appended");
        self.metrics.messages_appended.increment(1);
        self.events.push(QueueEvent::QueueTransaction {
            sender,
            target,
            value,
            queue_index,
            gas_limit,
            data,
            tx_hash,
        });

        Ok(queue_index)
    }

    /// Pops a contiguous range of pending messages, recording which of them the
    /// batch skipped. Callable only by the chain state machine.
    pub fn pop_cross_domain_messages(
        &mut self,
        ctx: CallContext,
        start_index: u64,
        count: u64,
        skipped_bitmap: U256,
    ) -> Result<(), QueueError> {
        if ctx.caller != self.chain {
            return Err(QueueError::CallerIsNotAuthorized(ctx.caller))
        }
        if count > 256 {
            return Err(QueueError::PopTooMany(count))
        }
        if start_index != self.pending_queue_index {
            return Err(QueueError::PopStartMismatch {
                got: start_index,
                expected: self.pending_queue_index,
            })
        }
        let end = start_index + count;
        if end > self.next_cross_domain_message_index() {
            return Err(QueueError::PopBeyondAppended {
                requested: end,
                frontier: self.next_cross_domain_message_index(),
            })
        }

        // truncate the bitmap to `count` bits.
        let skipped_bitmap = if count == 256 {
            skipped_bitmap
        } else {
            skipped_bitmap & ((U256::from(1) << (count as usize)) - U256::from(1))
        };
        self.skipped.apply_word(start_index, count, skipped_bitmap);
        self.pending_queue_index = end;

        tracing::debug!(target: "settlement::queue", start_index, count, "messages dequeued");
        self.metrics.messages_dequeued.increment(count);
        self.events.push(QueueEvent::DequeueTransactions { start_index, count, skipped_bitmap });

        Ok(())
    }

    /// Rewinds the pending cursor after a batch revert, so popped-but-unfinalized
    /// messages become pending again and their skip marks are cleared.
    pub fn reset_popped_cross_domain_messages(
        &mut self,
        ctx: CallContext,
        start_index: u64,
    ) -> Result<(), QueueError> {
        if ctx.caller != self.chain {
            return Err(QueueError::CallerIsNotAuthorized(ctx.caller))
        }
        if start_index < self.next_unfinalized_queue_index {
            return Err(QueueError::ResetBeforeFinalized {
                got: start_index,
                finalized: self.next_unfinalized_queue_index,
            })
        }
        if start_index > self.pending_queue_index {
            return Err(QueueError::ResetAheadOfPending {
                got: start_index,
                pending: self.pending_queue_index,
            })
        }

        self.skipped.clear_range(start_index, self.pending_queue_index);
        self.pending_queue_index = start_index;

        tracing::debug!(target: "settlement::queue", start_index, "pending cursor rewound");
        self.events.push(QueueEvent::ResetDequeuedTransactions { start_index });

        Ok(())
    }

    /// Checks that the finalized cursor can advance to the given index, without
    /// mutating the queue.
    pub const fn validate_finalize_index(
        &self,
        next_unfinalized_index: u64,
    ) -> Result<(), QueueError> {
        if next_unfinalized_index < self.next_unfinalized_queue_index {
            return Err(QueueError::FinalizedIndexTooSmall {
                got: next_unfinalized_index,
                current: self.next_unfinalized_queue_index,
            })
        }
        if next_unfinalized_index > self.pending_queue_index {
            return Err(QueueError::FinalizedIndexTooLarge {
                got: next_unfinalized_index,
                frontier: self.pending_queue_index,
            })
        }

        Ok(())
    }

    /// Advances the finalized cursor to the given index. Callable only by the
    /// chain state machine, on batch finalization.
    pub fn finalize_popped_cross_domain_messages(
        &mut self,
        ctx: CallContext,
        next_unfinalized_index: u64,
    ) -> Result<(), QueueError> {
        if ctx.caller != self.chain {
            return Err(QueueError::CallerIsNotAuthorized(ctx.caller))
        }
        self.validate_finalize_index(next_unfinalized_index)?;

        self.next_unfinalized_queue_index = next_unfinalized_index;
        self.events
            .push(QueueEvent::FinalizeDequeuedTransactions { finalized_index: next_unfinalized_index });

        Ok(())
    }

    /// Drops a message on behalf of the messenger collaborator, refunding it on
    /// the originating domain. A message is droppable iff it was skipped, its
    /// batch was finalized and it has not been dropped before. Irreversible.
    pub fn drop_cross_domain_message(
        &mut self,
        ctx: CallContext,
        queue_index: u64,
    ) -> Result<(), QueueError> {
        if ctx.caller != self.messenger {
            return Err(QueueError::CallerIsNotAuthorized(ctx.caller))
        }
        if queue_index >= self.next_unfinalized_queue_index {
            return Err(QueueError::CannotDropPending(queue_index))
        }
        if !self.skipped.get(queue_index) {
            return Err(QueueError::NotSkipped(queue_index))
        }
        if self.dropped.get(queue_index) {
            return Err(QueueError::AlreadyDropped(queue_index))
        }

        self.dropped.set(queue_index);

        tracing::debug!(target: "settlement::queue", queue_index, "message dropped");
        self.metrics.messages_dropped.increment(1);
        self.events.push(QueueEvent::DropTransaction { index: queue_index });

        Ok(())
    }

    /// Drains the event journal.
    pub fn take_events(&mut self) -> Vec<QueueEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const MESSENGER: Address = address!("1111111111111111111111111111111111111111");
    const GATEWAY: Address = address!("2222222222222222222222222222222222222222");
    const CHAIN: Address = address!("3333333333333333333333333333333333333333");
    const TARGET: Address = address!("4444444444444444444444444444444444444444");

    fn queue() -> MessageQueueV1 {
        MessageQueueV1::new(MESSENGER, GATEWAY, CHAIN, Arc::new(RwLock::new(SystemConfig::default())))
    }

    fn messenger_ctx() -> CallContext {
        CallContext::new(MESSENGER, 0)
    }

    fn chain_ctx() -> CallContext {
        CallContext::new(CHAIN, 0)
    }

    fn append_n(queue: &mut MessageQueueV1, n: u64) {
        for i in 0..n {
            let index = queue
                .append_cross_domain_message(messenger_ctx(), TARGET, 1_000_000, Bytes::new())
                .unwrap();
            assert_eq!(index, i);
        }
    }

    #[test]
    fn test_should_reject_unauthorized_append() {
        let mut queue = queue();
        let err = queue
            .append_cross_domain_message(CallContext::new(TARGET, 0), TARGET, 21000, Bytes::new())
            .unwrap_err();
        assert_eq!(err, QueueError::CallerIsNotAuthorized(TARGET));
    }

    #[test]
    fn test_should_reject_bad_gas_limits() {
        let mut queue = queue();
        let err = queue
            .append_cross_domain_message(messenger_ctx(), TARGET, 20_000_000, Bytes::new())
            .unwrap_err();
        assert_eq!(err, QueueError::GasLimitExceeded { got: 20_000_000, max: 10_000_000 });

        // 21000 + 16 * 2 = 21032.
        let err = queue
            .append_cross_domain_message(messenger_ctx(), TARGET, 21031, Bytes::from(vec![0; 2]))
            .unwrap_err();
        assert_eq!(err, QueueError::GasLimitBelowIntrinsicGas { got: 21031, intrinsic: 21032 });
    }

    #[test]
    fn test_should_enforce_pop_preconditions() {
        let mut queue = queue();
        append_n(&mut queue, 5);

        let err =
            queue.pop_cross_domain_messages(chain_ctx(), 0, 257, U256::ZERO).unwrap_err();
        assert_eq!(err, QueueError::PopTooMany(257));

        let err = queue.pop_cross_domain_messages(chain_ctx(), 1, 1, U256::ZERO).unwrap_err();
        assert_eq!(err, QueueError::PopStartMismatch { got: 1, expected: 0 });

        let err = queue.pop_cross_domain_messages(chain_ctx(), 0, 6, U256::ZERO).unwrap_err();
        assert_eq!(err, QueueError::PopBeyondAppended { requested: 6, frontier: 5 });

        let err = queue
            .pop_cross_domain_messages(messenger_ctx(), 0, 1, U256::ZERO)
            .unwrap_err();
        assert_eq!(err, QueueError::CallerIsNotAuthorized(MESSENGER));
    }

    #[test]
    fn test_should_track_cursor_invariant() -> eyre::Result<()> {
        let mut queue = queue();
        append_n(&mut queue, 10);

        queue.pop_cross_domain_messages(chain_ctx(), 0, 6, U256::from(0b101))?;
        assert_eq!(queue.pending_queue_index(), 6);
        assert!(queue.is_message_skipped(0));
        assert!(!queue.is_message_skipped(1));
        assert!(queue.is_message_skipped(2));

        queue.finalize_popped_cross_domain_messages(chain_ctx(), 4)?;
        assert!(
            queue.next_unfinalized_queue_index() <= queue.pending_queue_index() &&
                queue.pending_queue_index() <= queue.next_cross_domain_message_index()
        );

        // rewinding below the finalized cursor is rejected.
        let err = queue.reset_popped_cross_domain_messages(chain_ctx(), 3).unwrap_err();
        assert_eq!(err, QueueError::ResetBeforeFinalized { got: 3, finalized: 4 });

        queue.reset_popped_cross_domain_messages(chain_ctx(), 4)?;
        assert_eq!(queue.pending_queue_index(), 4);
        // the rewound skip marks are cleared, message 4 can be re-popped unskipped.
        assert!(!queue.is_message_skipped(4));

        let err = queue.reset_popped_cross_domain_messages(chain_ctx(), 5).unwrap_err();
        assert_eq!(err, QueueError::ResetAheadOfPending { got: 5, pending: 4 });

        Ok(())
    }

    #[test]
    fn test_should_enforce_finalize_bounds() -> eyre::Result<()> {
        let mut queue = queue();
        append_n(&mut queue, 4);
        queue.pop_cross_domain_messages(chain_ctx(), 0, 3, U256::ZERO)?;
        queue.finalize_popped_cross_domain_messages(chain_ctx(), 2)?;

        let err = queue.finalize_popped_cross_domain_messages(chain_ctx(), 1).unwrap_err();
        assert_eq!(err, QueueError::FinalizedIndexTooSmall { got: 1, current: 2 });

        let err = queue.finalize_popped_cross_domain_messages(chain_ctx(), 4).unwrap_err();
        assert_eq!(err, QueueError::FinalizedIndexTooLarge { got: 4, frontier: 3 });

        Ok(())
    }

    #[test]
    fn test_skip_drop_exclusivity_scenario() -> eyre::Result<()> {
        let mut queue = queue();
        append_n(&mut queue, 10);

        // pop all 10 with every message skipped, then finalize the first 5.
        queue.pop_cross_domain_messages(chain_ctx(), 0, 10, U256::from(0x3ff))?;
        queue.finalize_popped_cross_domain_messages(chain_ctx(), 5)?;

        // dropping belongs to the messenger, not the chain state machine.
        let err = queue.drop_cross_domain_message(chain_ctx(), 0).unwrap_err();
        assert_eq!(err, QueueError::CallerIsNotAuthorized(CHAIN));

        queue.drop_cross_domain_message(messenger_ctx(), 0)?;
        assert!(queue.is_message_dropped(0));

        let err = queue.drop_cross_domain_message(messenger_ctx(), 0).unwrap_err();
        assert_eq!(err, QueueError::AlreadyDropped(0));

        let err = queue.drop_cross_domain_message(messenger_ctx(), 6).unwrap_err();
        assert_eq!(err, QueueError::CannotDropPending(6));

        Ok(())
    }

    #[test]
    fn test_should_reject_drop_of_included_message() -> eyre::Result<()> {
        let mut queue = queue();
        append_n(&mut queue, 2);
        queue.pop_cross_domain_messages(chain_ctx(), 0, 2, U256::from(0b10))?;
        queue.finalize_popped_cross_domain_messages(chain_ctx(), 2)?;

        let err = queue.drop_cross_domain_message(messenger_ctx(), 0).unwrap_err();
        assert_eq!(err, QueueError::NotSkipped(0));
        queue.drop_cross_domain_message(messenger_ctx(), 1)?;

        Ok(())
    }
}
