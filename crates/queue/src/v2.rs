use std::sync::Arc;

use alloy_primitives::{b256, keccak256, Address, Bytes, B256, U256};
use parking_lot::RwLock;
use settlement_primitives::{CallContext, L1Message, SystemConfig};

use crate::{check_gas_limit, error::QueueError, event::QueueEvent, metrics::QueueMetrics};

/// The intrinsic gas charged per calldata byte in the second queue generation,
/// widened to account for the proof-side cost of carrying the bytes.
const INTRINSIC_GAS_PER_BYTE: u64 = 40;

/// The mask applied to the rolling message queue hash. The low 4 bytes are
/// zeroed so the hash fits the proof system's field elements.
const MESSAGE_QUEUE_HASH_MASK: B256 =
    b256!("ffffffffffffffffffffffffffffffffffffffffffffffffffffffff00000000");

/// The second generation of the cross-domain message queue.
///
/// Instead of storing individual message hashes, every append folds the
/// message into a rolling hash chain and records an enqueue timestamp. There
/// is no pop or skip bookkeeping: batches consume messages implicitly and
/// finalization advances the finalized cursor by count.
#[derive(Debug)]
pub struct MessageQueueV2 {
    /// The messenger collaborator allowed to append messages.
    messenger: Address,
    /// The gateway collaborator allowed to append enforced transactions.
    gateway: Address,
    /// The chain state machine allowed to finalize.
    chain: Address,
    /// The shared system configuration.
    config: Arc<RwLock<SystemConfig>>,
    /// Per message: the rolling hash after folding it in, and its enqueue timestamp.
    messages: Vec<(B256, u64)>,
    /// The next index requiring finalization.
    next_unfinalized_queue_index: u64,
    /// The append-only event journal.
    events: Vec<QueueEvent>,
    /// The queue metrics.
    metrics: QueueMetrics,
}

impl MessageQueueV2 {
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
            next_unfinalized_queue_index: 0,
            events: Vec::new(),
            metrics: QueueMetrics::default(),
        }
    }

    /// Returns the next queue index to be assigned.
    pub fn next_cross_domain_message_index(&self) -> u64 {
        self.messages.len() as u64
    }

    /// Returns the next index requiring finalization.
    pub const fn next_unfinalized_queue_index(&self) -> u64 {
        self.next_unfinalized_queue_index
    }

    /// Returns the rolling hash after the message at the given index was appended.
    pub fn rolling_hash(&self, queue_index: u64) -> Option<B256> {
        self.messages.get(queue_index as usize).map(|(hash, _)| *hash)
    }

    /// Returns the enqueue timestamp of the message at the given index.
    pub fn message_timestamp(&self, queue_index: u64) -> Option<u64> {
        self.messages.get(queue_index as usize).map(|(_, timestamp)| *timestamp)
    }

    /// Returns the enqueue timestamp of the oldest unfinalized message, if any.
    /// Feeds the enforced-mode staleness trigger.
    pub fn first_unfinalized_message_timestamp(&self) -> Option<u64> {
        self.message_timestamp(self.next_unfinalized_queue_index)
    }

    /// Appends a cross-domain message on behalf of the messenger collaborator.
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
        self.append(ctx, ctx.caller, target, U256::ZERO, gas_limit, data)
    }

    /// Appends an enforced transaction on behalf of the gateway collaborator.
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
        self.append(ctx, sender, target, value, gas_limit, data)
    }

    fn append(
        &mut self,
        ctx: CallContext,
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

        let previous = queue_index
            .checked_sub(1)
            .and_then(|index| self.rolling_hash(index))
            .unwrap_or_default();
        let mut rolling = keccak256([previous.as_slice(), tx_hash.as_slice()].concat());
        rolling &= MESSAGE_QUEUE_HASH_MASK;
        self.messages.push((rolling, ctx.timestamp));

        tracing::debug!(target: "settlement::queue", queue_index, %tx_hash, %rolling, "message appended");
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

    /// Checks that the finalized cursor can advance to the given index, without
    /// mutating the queue. The frontier is the appended index since this
    /// generation has no explicit pop.
    pub fn validate_finalize_index(&self, next_unfinalized_index: u64) -> Result<(), QueueError> {
        if next_unfinalized_index < self.next_unfinalized_queue_index {
            return Err(QueueError::FinalizedIndexTooSmall {
                got: next_unfinalized_index,
                current: self.next_unfinalized_queue_index,
            })
        }
        if next_unfinalized_index > self.next_cross_domain_message_index() {
            return Err(QueueError::FinalizedIndexTooLarge {
                got: next_unfinalized_index,
                frontier: self.next_cross_domain_message_index(),
            })
        }

        Ok(())
    }

    /// Advances the finalized cursor to the given index. Callable only by the
    /// chain state machine.
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

    /// Drains the event journal.
    pub fn take_events(&mut self) -> Vec<QueueEvent> {
        std::mem::take(&mut self.events)
    }
}
