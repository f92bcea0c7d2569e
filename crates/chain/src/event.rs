use alloy_primitives::{Address, B256};
use settlement_primitives::BatchInfo;

use crate::proof::ProofType;

/// An event emitted by the chain state machine, journaled in commit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainEvent {
    /// A batch was committed.
    CommitBatch(BatchInfo),
    /// A committed, unfinalized batch was reverted.
    RevertBatch(BatchInfo),
    /// A batch reached finality.
    FinalizeBatch {
        /// The finalized batch.
        batch_info: BatchInfo,
        /// The post-state root of the finalized batch.
        state_root: B256,
        /// The withdraw trie root of the finalized batch.
        withdraw_root: B256,
    },
    /// The two proof systems disagreed on the state after a batch.
    StateMismatch {
        /// The bundle end index the disagreement occurred at.
        batch_index: u64,
        /// The post-state root claimed by the later proof.
        state_root: B256,
        /// The proof system that surfaced the disagreement.
        proof_type: ProofType,
    },
    /// The owner resolved a recorded state mismatch.
    ResolveStateMismatch {
        /// The bundle end index the disagreement occurred at.
        batch_index: u64,
        /// The state root chosen as canonical.
        state_root: B256,
        /// The proof system whose claim was kept.
        proof_type: ProofType,
    },
    /// A sequencer was granted or revoked.
    UpdateSequencer {
        /// The affected account.
        account: Address,
        /// True if the role was granted.
        status: bool,
    },
    /// A prover was granted or revoked.
    UpdateProver {
        /// The affected account.
        account: Address,
        /// True if the role was granted.
        status: bool,
    },
    /// An enforced-batch submitter was granted or revoked.
    UpdateWhitelisted {
        /// The affected account.
        account: Address,
        /// True if the role was granted.
        status: bool,
    },
    /// The paused flag was toggled.
    Paused(bool),
    /// Enforced-batch mode was entered.
    EnforcedBatchModeEntered,
    /// Enforced-batch mode was exited by the owner.
    EnforcedBatchModeExited,
    /// The shared system configuration was replaced.
    UpdateSystemConfig,
    /// A bundle size table entry was appended.
    UpdateBundleSize {
        /// The new bundle size.
        size: u64,
        /// The last batch index governed by this size.
        end_batch_index: u64,
    },
}
