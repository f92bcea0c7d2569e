use alloy_primitives::{Address, Bytes, B256, U256};

/// An event emitted by the message queue, carrying the indices and hashes an
/// off-chain indexer needs to reconstruct the queue state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueEvent {
    /// A message was appended to the queue.
    QueueTransaction {
        /// The sender of the message.
        sender: Address,
        /// The target address on the other domain.
        target: Address,
        /// The value carried by the message.
        value: U256,
        /// The index assigned to the message.
        queue_index: u64,
        /// The gas limit of the message.
        gas_limit: u64,
        /// The calldata of the message.
        data: Bytes,
        /// The transaction hash of the message.
        tx_hash: B256,
    },
    /// A contiguous range of messages was popped by a committed batch.
    DequeueTransactions {
        /// The first popped index.
        start_index: u64,
        /// The number of popped messages.
        count: u64,
        /// The skip bitmap, truncated to `count` bits.
        skipped_bitmap: U256,
    },
    /// Popped but unfinalized messages were returned to the pending state.
    ResetDequeuedTransactions {
        /// The new pending queue index.
        start_index: u64,
    },
    /// Messages below the index were irreversibly finalized.
    FinalizeDequeuedTransactions {
        /// The new finalized cursor.
        finalized_index: u64,
    },
    /// A skipped and finalized message was dropped.
    DropTransaction {
        /// The index of the dropped message.
        index: u64,
    },
}
