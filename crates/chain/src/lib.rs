//! The batch lifecycle state machine.
//!
//! Batches move through `Uncommitted -> Committed -> Finalized`, chained by
//! the keccak hash of their canonical header encoding. Commits consume queued
//! cross-domain messages, reverts rewind a contiguous unfinalized suffix, and
//! finalization advances under two independent proof systems whose verified
//! cursors must agree before a batch becomes irreversible.

pub use bundle::{BundleSizeEntry, BundleSizeTable};
pub mod bundle;

pub use config::ChainConfig;
mod config;

pub use error::ChainError;
mod error;

pub use event::ChainEvent;
mod event;

mod metrics;

pub use proof::{
    BundlePublicInputs, BundleVerifier, PointEvaluator, ProofType, UnresolvedState,
};
pub mod proof;

pub use roles::AccessControl;
mod roles;

use std::{collections::HashMap, sync::Arc};

use alloy_eips::eip4844::BLS_MODULUS;
use alloy_primitives::{bytes::BufMut, keccak256, Address, Bytes, B256, U256};
use parking_lot::RwLock;
use settlement_codec::{BatchHeader, BatchHeaderV0, BatchHeaderV1, BatchHeaderV3, BatchHeaderV7, ChunkV0, ChunkV1, DecodingError};
use settlement_primitives::{BatchInfo, CallContext, SystemConfig};
use settlement_queue::{MessageQueueV1, MessageQueueV2, QueueError};

use crate::metrics::ChainMetrics;

/// The first batch version of the hash-chain commitment generation.
const CHAIN_COMMIT_VERSION: u8 = 7;

/// A committed batch: its header hash and the metadata needed by revert and
/// finalization after the header itself is no longer at hand.
#[derive(Debug, Clone, Copy)]
struct CommittedBatch {
    hash: B256,
    version: u8,
    /// Cumulative message count after the batch: first-generation pops for
    /// versions below 7, claimed second-generation consumption afterwards.
    total_l1_messages_popped: u64,
    committed_at: u64,
}

/// The state a proof system has verified at a bundle end index.
#[derive(Debug, Clone, PartialEq, Eq)]
struct VerifiedState {
    state_root: B256,
    withdraw_root: B256,
    total_l1_messages_popped: Option<u64>,
}

/// The blob commitment and opening proof accompanying a payload commit.
///
/// The challenge point is not supplied: it is derived from the recomputed
/// data hash and the versioned hash, so the caller cannot pick it.
#[derive(Debug, Clone)]
pub struct BlobCommitment {
    /// The EIP-4844 versioned hash of the blob.
    pub versioned_hash: B256,
    /// The claimed evaluation of the blob polynomial at the challenge point.
    pub y: U256,
    /// The KZG commitment, 48 bytes.
    pub commitment: Bytes,
    /// The KZG opening proof, 48 bytes.
    pub proof: Bytes,
}

/// The batch lifecycle state machine.
///
/// Owns both message queue generations and drives them with its own caller
/// identity. All state-mutating operations take a [`CallContext`] and validate
/// fully before mutating, so a returned error implies no state change.
#[derive(Debug)]
pub struct SettlementChain {
    config: ChainConfig,
    system_config: Arc<RwLock<SystemConfig>>,
    roles: AccessControl,
    paused: bool,
    enforced_mode: bool,
    queue_v1: MessageQueueV1,
    queue_v2: MessageQueueV2,
    batches: HashMap<u64, CommittedBatch>,
    finalized_state_roots: HashMap<u64, B256>,
    withdraw_roots: HashMap<u64, B256>,
    last_committed: u64,
    last_finalized: u64,
    genesis_imported: bool,
    zk_verified: u64,
    tee_verified: u64,
    verified_roots: HashMap<(ProofType, u64), VerifiedState>,
    unresolved: Option<UnresolvedState>,
    bundle_table: BundleSizeTable,
    zk_verifier: Option<Box<dyn BundleVerifier>>,
    tee_verifier: Option<Box<dyn BundleVerifier>>,
    point_evaluator: Box<dyn PointEvaluator>,
    events: Vec<ChainEvent>,
    metrics: ChainMetrics,
}

impl SettlementChain {
    /// Returns a new chain with an empty batch store. A proof system passed as
    /// `None` is disabled and does not gate finalization.
    pub fn new(
        config: ChainConfig,
        system_config: Arc<RwLock<SystemConfig>>,
        queue_v1: MessageQueueV1,
        queue_v2: MessageQueueV2,
        zk_verifier: Option<Box<dyn BundleVerifier>>,
        tee_verifier: Option<Box<dyn BundleVerifier>>,
        point_evaluator: Box<dyn PointEvaluator>,
    ) -> Self {
        let roles = AccessControl::new(config.owner);
        Self {
            config,
            system_config,
            roles,
            paused: false,
            enforced_mode: false,
            queue_v1,
            queue_v2,
            batches: HashMap::new(),
            finalized_state_roots: HashMap::new(),
            withdraw_roots: HashMap::new(),
            last_committed: 0,
            last_finalized: 0,
            genesis_imported: false,
            zk_verified: 0,
            tee_verified: 0,
            verified_roots: HashMap::new(),
            unresolved: None,
            bundle_table: BundleSizeTable::default(),
            zk_verifier,
            tee_verifier,
            point_evaluator,
            events: Vec::new(),
            metrics: ChainMetrics::default(),
        }
    }

    /// Imports the genesis batch, establishing batch 0 as the root of the
    /// hash chain. Owner-only and callable once. The header must be a V0
    /// header whose only non-zero field is the data hash.
    pub fn import_genesis_batch(
        &mut self,
        ctx: CallContext,
        header: &[u8],
        state_root: B256,
    ) -> Result<B256, ChainError> {
        self.roles.require_owner(ctx.caller)?;
        if self.genesis_imported {
            return Err(ChainError::GenesisBatchImported)
        }
        if state_root.is_zero() {
            return Err(ChainError::StateRootIsZero)
        }

        let header = BatchHeader::decode(header)?;
        let version = header.version();
        let BatchHeader::V0(header) = header else {
            return Err(ChainError::IncorrectBatchVersion(version))
        };
        if header.data_hash.is_zero() {
            return Err(ChainError::GenesisDataHashIsZero)
        }
        if header.batch_index != 0 ||
            header.l1_message_popped != 0 ||
            header.total_l1_message_popped != 0 ||
            !header.parent_batch_hash.is_zero() ||
            !header.skipped_l1_message_bitmap.is_empty()
        {
            return Err(ChainError::GenesisFieldsNotZero)
        }

        let hash = header.hash_slow();
        self.batches.insert(
            0,
            CommittedBatch {
                hash,
                version: 0,
                total_l1_messages_popped: 0,
                committed_at: ctx.timestamp,
            },
        );
        self.finalized_state_roots.insert(0, state_root);
        self.genesis_imported = true;

        tracing::info!(target: "settlement::chain", %hash, %state_root, "genesis batch imported");
        self.events.push(ChainEvent::CommitBatch(BatchInfo::new(0, hash)));
        self.events.push(ChainEvent::FinalizeBatch {
            batch_info: BatchInfo::new(0, hash),
            state_root,
            withdraw_root: B256::ZERO,
        });

        Ok(hash)
    }

    /// Commits a payload batch (versions 0 through 6).
    ///
    /// The data hash is recomputed from the supplied chunks, the blob
    /// commitment is checked to open to it, and the declared message range is
    /// popped from the first-generation queue with the supplied skip bitmap.
    /// Returns the hash of the stored header.
    pub fn commit_batch(
        &mut self,
        ctx: CallContext,
        version: u8,
        parent_header: &[u8],
        chunks: &[Bytes],
        skipped_l1_message_bitmap: Vec<U256>,
        blob: Option<BlobCommitment>,
    ) -> Result<B256, ChainError> {
        self.ensure_not_paused()?;
        self.roles.require_sequencer(ctx.caller)?;
        self.ensure_not_enforced(ctx.timestamp)?;
        if version >= CHAIN_COMMIT_VERSION || !self.config.accepts_version(version) {
            return Err(ChainError::IncorrectBatchVersion(version))
        }
        if chunks.is_empty() {
            return Err(ChainError::BatchIsEmpty)
        }

        let parent = BatchHeader::decode(parent_header)?;
        let parent_index = parent.batch_index();
        let parent_hash = parent.hash_slow();
        let stored =
            self.batches.get(&parent_index).map(|batch| batch.hash).unwrap_or_default();
        if stored != parent_hash {
            return Err(ChainError::IncorrectBatchHash { got: parent_hash, expected: stored })
        }
        let batch_index = parent_index + 1;
        if self.batches.contains_key(&batch_index) {
            return Err(ChainError::BatchIsAlreadyCommitted(batch_index))
        }
        // the parent entry exists since its hash matched.
        let parent_total = self
            .batches
            .get(&parent_index)
            .map(|batch| batch.total_l1_messages_popped)
            .unwrap_or_default();

        let decoded = Self::decode_chunks(version, chunks)?;
        if version == 5 {
            let bridge = decoded.len() == 1 &&
                decoded[0].blocks.len() == 1 &&
                decoded[0].blocks[0].num_transactions == 0;
            if !bridge {
                return Err(DecodingError::InvalidBridgeBatch.into())
            }
        }

        let total_popped: u64 = decoded
            .iter()
            .flat_map(|chunk| chunk.blocks.iter())
            .map(|block| block.num_l1_messages as u64)
            .sum();
        // skipping is disabled from version 3 onwards, so the bitmap is empty.
        let expected_words =
            if version < 3 { (total_popped as usize).div_ceil(256) } else { 0 };
        if skipped_l1_message_bitmap.len() != expected_words {
            return Err(DecodingError::IncorrectBitmapLength {
                got: skipped_l1_message_bitmap.len(),
                expected: expected_words,
            }
            .into())
        }
        if total_popped > 0 && is_skipped(&skipped_l1_message_bitmap, total_popped - 1) {
            return Err(ChainError::LastMessageSkipped {
                queue_index: parent_total + total_popped - 1,
            })
        }
        if self.queue_v1.pending_queue_index() != parent_total {
            return Err(QueueError::PopStartMismatch {
                got: parent_total,
                expected: self.queue_v1.pending_queue_index(),
            }
            .into())
        }
        let frontier = self.queue_v1.next_cross_domain_message_index();
        if parent_total + total_popped > frontier {
            return Err(QueueError::PopBeyondAppended {
                requested: parent_total + total_popped,
                frontier,
            }
            .into())
        }

        let data_hash = self.compute_data_hash(
            version,
            &decoded,
            parent_total,
            &skipped_l1_message_bitmap,
        )?;

        // the blob commitment must open to the recomputed data hash at a
        // challenge point the committer cannot choose.
        let mut blob_data_proof = [B256::ZERO; 2];
        let mut blob_versioned_hash = B256::ZERO;
        if version >= 1 {
            let blob = blob.ok_or(ChainError::MissingBlobCommitment)?;
            let z = U256::from_be_bytes(
                keccak256([data_hash.as_slice(), blob.versioned_hash.as_slice()].concat()).0,
            ) % BLS_MODULUS;
            if !self.point_evaluator.verify(
                blob.versioned_hash,
                z,
                blob.y,
                &blob.commitment,
                &blob.proof,
            ) {
                return Err(ChainError::PointEvaluationFailed)
            }
            blob_versioned_hash = blob.versioned_hash;
            blob_data_proof = [B256::from(z), B256::from(blob.y)];
        }

        // all checks passed: consume the message range, one bitmap word at a time.
        let queue_ctx = CallContext::new(self.config.address, ctx.timestamp);
        let mut offset = 0;
        while offset < total_popped {
            let count = (total_popped - offset).min(256);
            let word = skipped_l1_message_bitmap
                .get((offset / 256) as usize)
                .copied()
                .unwrap_or_default();
            self.queue_v1.pop_cross_domain_messages(
                queue_ctx,
                parent_total + offset,
                count,
                word,
            )?;
            offset += count;
        }

        let last_block_timestamp = decoded
            .last()
            .and_then(|chunk| chunk.blocks.last())
            .map(|block| block.timestamp)
            .unwrap_or_default();
        let total = parent_total + total_popped;
        let header = match version {
            0 => BatchHeader::V0(BatchHeaderV0::new(
                version,
                batch_index,
                total_popped,
                total,
                data_hash,
                parent_hash,
                skipped_l1_message_bitmap,
            )),
            1..=2 => BatchHeader::V1(BatchHeaderV1::new(
                version,
                batch_index,
                total_popped,
                total,
                data_hash,
                blob_versioned_hash,
                parent_hash,
                skipped_l1_message_bitmap,
            )),
            _ => BatchHeader::V3(BatchHeaderV3::new(
                version,
                batch_index,
                total_popped,
                total,
                data_hash,
                blob_versioned_hash,
                parent_hash,
                last_block_timestamp,
                blob_data_proof,
            )),
        };
        let hash = header.hash_slow();

        self.store_batch(batch_index, hash, version, total, ctx.timestamp);
        tracing::info!(
            target: "settlement::chain",
            batch_index,
            %hash,
            version,
            l1_messages = total_popped,
            "batch committed"
        );

        Ok(hash)
    }

    /// Commits a run of hash-chain batches (version 7 onwards).
    ///
    /// No payload validation happens here: the supplied blob hashes are folded
    /// into new headers chained off the last committed batch, and the
    /// recomputed final hash must match `last_batch_hash`.
    pub fn commit_batches(
        &mut self,
        ctx: CallContext,
        version: u8,
        parent_batch_hash: B256,
        blob_versioned_hashes: &[B256],
        last_batch_hash: B256,
    ) -> Result<(), ChainError> {
        self.ensure_not_paused()?;
        self.roles.require_sequencer(ctx.caller)?;
        self.ensure_not_enforced(ctx.timestamp)?;
        if version < CHAIN_COMMIT_VERSION || !self.config.accepts_version(version) {
            return Err(ChainError::IncorrectBatchVersion(version))
        }
        if blob_versioned_hashes.is_empty() {
            return Err(ChainError::BatchIsEmpty)
        }

        let Some(parent) = self.batches.get(&self.last_committed).copied() else {
            return Err(ChainError::IncorrectBatchHash {
                got: parent_batch_hash,
                expected: B256::ZERO,
            })
        };
        if parent_batch_hash != parent.hash {
            return Err(ChainError::IncorrectBatchHash {
                got: parent_batch_hash,
                expected: parent.hash,
            })
        }

        let mut rolling = parent_batch_hash;
        let mut headers = Vec::with_capacity(blob_versioned_hashes.len());
        for (offset, blob_versioned_hash) in blob_versioned_hashes.iter().enumerate() {
            let batch_index = self.last_committed + 1 + offset as u64;
            let header =
                BatchHeaderV7::new(version, batch_index, *blob_versioned_hash, rolling);
            rolling = header.hash_slow();
            headers.push((batch_index, rolling));
        }
        if rolling != last_batch_hash {
            return Err(ChainError::IncorrectBatchHash { got: rolling, expected: last_batch_hash })
        }

        for (batch_index, hash) in headers {
            self.store_batch(
                batch_index,
                hash,
                version,
                parent.total_l1_messages_popped,
                ctx.timestamp,
            );
            tracing::info!(target: "settlement::chain", batch_index, %hash, version, "batch committed");
        }

        Ok(())
    }

    /// Reverts the contiguous unfinalized suffix starting at the supplied
    /// header's batch. Owner-only. Deletes newest to oldest and rewinds the
    /// first-generation queue when the range consumed messages.
    pub fn revert_batch(&mut self, ctx: CallContext, header: &[u8]) -> Result<(), ChainError> {
        self.roles.require_owner(ctx.caller)?;

        let header = BatchHeader::decode(header)?;
        let batch_index = header.batch_index();
        let hash = header.hash_slow();
        let stored = self.batches.get(&batch_index).map(|batch| batch.hash).unwrap_or_default();
        if stored != hash {
            return Err(ChainError::IncorrectBatchHash { got: hash, expected: stored })
        }
        if batch_index <= self.last_finalized {
            return Err(ChainError::RevertFinalizedBatch(batch_index))
        }

        self.delete_batches_above(ctx.timestamp, batch_index - 1)
    }

    /// Finalizes the bundle ending at the supplied header under one proof
    /// system, and advances finalization if both enabled systems agree.
    ///
    /// If the other proof system already verified this bundle end with a
    /// different state, the call records an unresolved mismatch instead of
    /// advancing and pauses finalization until the owner resolves it.
    #[allow(clippy::too_many_arguments)]
    pub fn finalize_bundle(
        &mut self,
        ctx: CallContext,
        proof_type: ProofType,
        header: &[u8],
        post_state_root: B256,
        withdraw_root: B256,
        total_l1_messages_popped: Option<u64>,
        proof: &[u8],
    ) -> Result<(), ChainError> {
        self.ensure_not_paused()?;
        self.roles.require_prover(ctx.caller)?;
        self.ensure_not_enforced(ctx.timestamp)?;
        if post_state_root.is_zero() {
            return Err(ChainError::StateRootIsZero)
        }
        if self.unresolved.is_some() || self.verifier(proof_type).is_none() {
            return Err(ChainError::FinalizationPaused)
        }

        let header = BatchHeader::decode(header)?;
        let batch_index = header.batch_index();
        let batch_hash = header.hash_slow();
        let Some(batch) = self.batches.get(&batch_index).copied() else {
            return Err(ChainError::IncorrectBatchHash { got: batch_hash, expected: B256::ZERO })
        };
        if batch.hash != batch_hash {
            return Err(ChainError::IncorrectBatchHash { got: batch_hash, expected: batch.hash })
        }

        let verified = self.verified_index(proof_type);
        if batch_index <= verified {
            return Err(ChainError::BatchIsAlreadyVerified(batch_index))
        }
        let expected_end = self.bundle_table.expected_end(verified);
        if batch_index != expected_end {
            return Err(ChainError::BundleSizeMismatch { got: batch_index, expected: expected_end })
        }

        let total = if batch.version >= CHAIN_COMMIT_VERSION {
            if !self.queue_v1.is_drained() {
                return Err(ChainError::NotAllV1MessagesAreFinalized)
            }
            let count = total_l1_messages_popped.ok_or(ChainError::MissingMessageCount)?;
            self.queue_v2.validate_finalize_index(count)?;
            Some(count)
        } else {
            self.queue_v1.validate_finalize_index(batch.total_l1_messages_popped)?;
            Some(batch.total_l1_messages_popped)
        };

        let prev_batch_hash =
            self.batches.get(&verified).map(|batch| batch.hash).unwrap_or_default();
        let prev_state_root = if verified <= self.last_finalized {
            self.finalized_state_roots.get(&verified).copied().unwrap_or_default()
        } else {
            self.verified_roots
                .get(&(proof_type, verified))
                .map(|state| state.state_root)
                .unwrap_or_default()
        };
        let inputs = BundlePublicInputs {
            prev_batch_hash,
            prev_state_root,
            batch_hash,
            post_state_root,
            withdraw_root,
            total_l1_messages_popped: (batch.version >= CHAIN_COMMIT_VERSION)
                .then_some(total)
                .flatten(),
        };
        let verifier = self.verifier(proof_type).ok_or(ChainError::FinalizationPaused)?;
        if !verifier.verify(&inputs, proof) {
            return Err(ChainError::ProofVerificationFailed)
        }

        if let Some(other) = self.verified_roots.get(&(proof_type.other(), batch_index)) {
            if other.state_root != post_state_root || other.withdraw_root != withdraw_root {
                tracing::warn!(
                    target: "settlement::chain",
                    batch_index,
                    %proof_type,
                    %post_state_root,
                    other_state_root = %other.state_root,
                    "proof systems disagree, finalization paused"
                );
                self.unresolved = Some(UnresolvedState {
                    proof_type,
                    batch_index,
                    state_root: post_state_root,
                    withdraw_root,
                    total_l1_messages_popped: total,
                });
                self.metrics.state_mismatches.increment(1);
                self.events.push(ChainEvent::StateMismatch {
                    batch_index,
                    state_root: post_state_root,
                    proof_type,
                });
                return Ok(())
            }
        }

        self.set_verified_index(proof_type, batch_index);
        self.verified_roots.insert(
            (proof_type, batch_index),
            VerifiedState { state_root: post_state_root, withdraw_root, total_l1_messages_popped: total },
        );
        tracing::info!(target: "settlement::chain", batch_index, %proof_type, "bundle verified");

        self.advance_finalization(ctx.timestamp)
    }

    /// Resolves a recorded state mismatch. Owner-only. The header must be the
    /// disputed bundle-end header; `prefer_zk` picks whose claim becomes
    /// canonical. Clears the mismatch, re-enables both proof paths, and
    /// finalizes through the disputed batch.
    pub fn resolve_state_mismatch(
        &mut self,
        ctx: CallContext,
        header: &[u8],
        prefer_zk: bool,
    ) -> Result<(), ChainError> {
        self.roles.require_owner(ctx.caller)?;
        let unresolved = self.unresolved.clone().ok_or(ChainError::NoUnresolvedState)?;

        let header = BatchHeader::decode(header)?;
        let batch_index = unresolved.batch_index;
        let batch_hash = header.hash_slow();
        let Some(batch) = self.batches.get(&batch_index).copied() else {
            return Err(ChainError::IncorrectBatchHash { got: batch_hash, expected: B256::ZERO })
        };
        if header.batch_index() != batch_index || batch.hash != batch_hash {
            return Err(ChainError::IncorrectBatchHash { got: batch_hash, expected: batch.hash })
        }

        let chosen_type = if prefer_zk { ProofType::Zk } else { ProofType::Tee };
        let chosen = if chosen_type == unresolved.proof_type {
            VerifiedState {
                state_root: unresolved.state_root,
                withdraw_root: unresolved.withdraw_root,
                total_l1_messages_popped: unresolved.total_l1_messages_popped,
            }
        } else {
            // the mismatch implies the other system verified this index.
            self.verified_roots
                .get(&(chosen_type, batch_index))
                .cloned()
                .ok_or(ChainError::NoUnresolvedState)?
        };

        if batch.version >= CHAIN_COMMIT_VERSION {
            let count = chosen.total_l1_messages_popped.ok_or(ChainError::MissingMessageCount)?;
            self.queue_v2.validate_finalize_index(count)?;
        }

        self.unresolved = None;
        self.set_verified_index(ProofType::Zk, batch_index);
        self.set_verified_index(ProofType::Tee, batch_index);
        // claims above the resolved index were built on the discarded state.
        self.verified_roots.retain(|(_, index), _| *index <= batch_index);
        self.verified_roots.insert((ProofType::Zk, batch_index), chosen.clone());
        self.verified_roots.insert((ProofType::Tee, batch_index), chosen.clone());

        tracing::info!(
            target: "settlement::chain",
            batch_index,
            chosen = %chosen_type,
            state_root = %chosen.state_root,
            "state mismatch resolved"
        );
        self.events.push(ChainEvent::ResolveStateMismatch {
            batch_index,
            state_root: chosen.state_root,
            proof_type: chosen_type,
        });

        self.advance_finalization(ctx.timestamp)
    }

    /// The enforced-mode entry point: commits a single hash-chain batch on top
    /// of the last finalized batch and finalizes it immediately under the ZK
    /// proof system. Owner or whitelisted only, and only once the enforced
    /// trigger conditions hold. Any committed-but-unfinalized suffix is
    /// reverted first.
    #[allow(clippy::too_many_arguments)]
    pub fn commit_and_finalize_batch(
        &mut self,
        ctx: CallContext,
        version: u8,
        blob_versioned_hash: B256,
        batch_hash: B256,
        post_state_root: B256,
        withdraw_root: B256,
        total_l1_messages_popped: u64,
        proof: &[u8],
    ) -> Result<(), ChainError> {
        self.ensure_not_paused()?;
        self.roles.require_whitelisted(ctx.caller)?;
        if !self.enforced_batch_mode_due(ctx.timestamp) {
            return Err(ChainError::NotInEnforcedBatchMode)
        }
        if self.unresolved.is_some() || self.zk_verifier.is_none() {
            return Err(ChainError::FinalizationPaused)
        }
        if version < CHAIN_COMMIT_VERSION || !self.config.accepts_version(version) {
            return Err(ChainError::IncorrectBatchVersion(version))
        }
        if post_state_root.is_zero() {
            return Err(ChainError::StateRootIsZero)
        }
        if !self.queue_v1.is_drained() {
            return Err(ChainError::NotAllV1MessagesAreFinalized)
        }
        self.queue_v2.validate_finalize_index(total_l1_messages_popped)?;

        let parent =
            self.batches.get(&self.last_finalized).map(|batch| batch.hash).unwrap_or_default();
        let header =
            BatchHeaderV7::new(version, self.last_finalized + 1, blob_versioned_hash, parent);
        let computed = header.hash_slow();
        if computed != batch_hash {
            return Err(ChainError::IncorrectBatchHash { got: computed, expected: batch_hash })
        }

        let prev_state_root =
            self.finalized_state_roots.get(&self.last_finalized).copied().unwrap_or_default();
        let inputs = BundlePublicInputs {
            prev_batch_hash: parent,
            prev_state_root,
            batch_hash,
            post_state_root,
            withdraw_root,
            total_l1_messages_popped: Some(total_l1_messages_popped),
        };
        let verifier = self.zk_verifier.as_ref().ok_or(ChainError::FinalizationPaused)?;
        if !verifier.verify(&inputs, proof) {
            return Err(ChainError::ProofVerificationFailed)
        }

        if !self.enforced_mode {
            self.enforced_mode = true;
            tracing::warn!(target: "settlement::chain", "enforced-batch mode entered");
            self.events.push(ChainEvent::EnforcedBatchModeEntered);
        }
        // the new batch builds on the finalized tip, so the unfinalized
        // suffix is discarded.
        self.delete_batches_above(ctx.timestamp, self.last_finalized)?;

        let batch_index = self.last_finalized + 1;
        self.store_batch(
            batch_index,
            batch_hash,
            version,
            total_l1_messages_popped,
            ctx.timestamp,
        );
        let state = VerifiedState {
            state_root: post_state_root,
            withdraw_root,
            total_l1_messages_popped: Some(total_l1_messages_popped),
        };
        self.set_verified_index(ProofType::Zk, batch_index);
        self.set_verified_index(ProofType::Tee, batch_index);
        self.verified_roots.insert((ProofType::Zk, batch_index), state.clone());
        self.verified_roots.insert((ProofType::Tee, batch_index), state);
        tracing::info!(target: "settlement::chain", batch_index, %batch_hash, "enforced batch committed");

        self.advance_finalization(ctx.timestamp)
    }

    /// Exits enforced-batch mode. Owner-only.
    pub fn exit_enforced_batch_mode(&mut self, ctx: CallContext) -> Result<(), ChainError> {
        self.roles.require_owner(ctx.caller)?;
        if !self.enforced_mode {
            return Err(ChainError::NotInEnforcedBatchMode)
        }

        self.enforced_mode = false;
        tracing::info!(target: "settlement::chain", "enforced-batch mode exited");
        self.events.push(ChainEvent::EnforcedBatchModeExited);

        Ok(())
    }

    /// Returns true if enforced-batch mode is active or its lazy trigger
    /// conditions hold at the given time: a stale unfinalized commit, or a
    /// stale unfinalized second-generation message.
    pub fn enforced_batch_mode_due(&self, now: u64) -> bool {
        if self.enforced_mode {
            return true
        }
        let config = self.system_config.read();
        if self.last_committed > self.last_finalized {
            if let Some(batch) = self.batches.get(&(self.last_finalized + 1)) {
                if now.saturating_sub(batch.committed_at) > config.max_finalize_delay {
                    return true
                }
            }
        }
        if let Some(timestamp) = self.queue_v2.first_unfinalized_message_timestamp() {
            if now.saturating_sub(timestamp) > config.max_inclusion_delay {
                return true
            }
        }

        false
    }

    /// Grants or revokes the sequencer role. Owner-only.
    pub fn update_sequencer(
        &mut self,
        ctx: CallContext,
        account: Address,
        status: bool,
    ) -> Result<(), ChainError> {
        self.roles.require_owner(ctx.caller)?;
        self.roles.set_sequencer(account, status);
        self.events.push(ChainEvent::UpdateSequencer { account, status });
        Ok(())
    }

    /// Grants or revokes the prover role. Owner-only.
    pub fn update_prover(
        &mut self,
        ctx: CallContext,
        account: Address,
        status: bool,
    ) -> Result<(), ChainError> {
        self.roles.require_owner(ctx.caller)?;
        self.roles.set_prover(account, status);
        self.events.push(ChainEvent::UpdateProver { account, status });
        Ok(())
    }

    /// Grants or revokes the enforced-batch whitelist. Owner-only.
    pub fn update_whitelisted(
        &mut self,
        ctx: CallContext,
        account: Address,
        status: bool,
    ) -> Result<(), ChainError> {
        self.roles.require_owner(ctx.caller)?;
        self.roles.set_whitelisted(account, status);
        self.events.push(ChainEvent::UpdateWhitelisted { account, status });
        Ok(())
    }

    /// Toggles the pause switch. Owner-only.
    pub fn set_paused(&mut self, ctx: CallContext, paused: bool) -> Result<(), ChainError> {
        self.roles.require_owner(ctx.caller)?;
        self.paused = paused;
        self.events.push(ChainEvent::Paused(paused));
        Ok(())
    }

    /// Appends a bundle size table entry. Owner-only.
    pub fn update_bundle_size(
        &mut self,
        ctx: CallContext,
        size: u64,
        end_batch_index: u64,
    ) -> Result<(), ChainError> {
        self.roles.require_owner(ctx.caller)?;
        self.bundle_table.push(size, end_batch_index)?;
        self.events.push(ChainEvent::UpdateBundleSize { size, end_batch_index });
        Ok(())
    }

    /// Replaces the shared system configuration. Owner-only.
    pub fn update_system_config(
        &mut self,
        ctx: CallContext,
        config: SystemConfig,
    ) -> Result<(), ChainError> {
        self.roles.require_owner(ctx.caller)?;
        *self.system_config.write() = config;
        self.events.push(ChainEvent::UpdateSystemConfig);
        Ok(())
    }

    /// Returns the stored hash of the batch at the given index.
    pub fn committed_batch_hash(&self, batch_index: u64) -> Option<B256> {
        self.batches.get(&batch_index).map(|batch| batch.hash)
    }

    /// Returns the finalized state root recorded at the given bundle end.
    pub fn finalized_state_root(&self, batch_index: u64) -> Option<B256> {
        self.finalized_state_roots.get(&batch_index).copied()
    }

    /// Returns the withdraw trie root recorded at the given bundle end.
    pub fn withdraw_root(&self, batch_index: u64) -> Option<B256> {
        self.withdraw_roots.get(&batch_index).copied()
    }

    /// Returns true if the batch at the given index is finalized.
    pub const fn is_batch_finalized(&self, batch_index: u64) -> bool {
        self.genesis_imported && batch_index <= self.last_finalized
    }

    /// Returns the last committed batch index.
    pub const fn last_committed_batch_index(&self) -> u64 {
        self.last_committed
    }

    /// Returns the last finalized batch index.
    pub const fn last_finalized_batch_index(&self) -> u64 {
        self.last_finalized
    }

    /// Returns the last batch index verified by the given proof system.
    pub const fn last_verified_batch_index(&self, proof_type: ProofType) -> u64 {
        self.verified_index(proof_type)
    }

    /// Returns the unresolved state mismatch, if any.
    pub const fn unresolved_state(&self) -> Option<&UnresolvedState> {
        self.unresolved.as_ref()
    }

    /// Returns true if the pause switch is on.
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Returns true if the enforced-batch mode flag is set.
    pub const fn is_enforced_batch_mode(&self) -> bool {
        self.enforced_mode
    }

    /// Returns the first-generation queue.
    pub const fn queue_v1(&self) -> &MessageQueueV1 {
        &self.queue_v1
    }

    /// Returns the first-generation queue mutably, for the messenger and
    /// gateway collaborators.
    pub fn queue_v1_mut(&mut self) -> &mut MessageQueueV1 {
        &mut self.queue_v1
    }

    /// Returns the second-generation queue.
    pub const fn queue_v2(&self) -> &MessageQueueV2 {
        &self.queue_v2
    }

    /// Returns the second-generation queue mutably, for the messenger and
    /// gateway collaborators.
    pub fn queue_v2_mut(&mut self) -> &mut MessageQueueV2 {
        &mut self.queue_v2
    }

    /// Drains the event journal.
    pub fn take_events(&mut self) -> Vec<ChainEvent> {
        std::mem::take(&mut self.events)
    }

    fn ensure_not_paused(&self) -> Result<(), ChainError> {
        if self.paused {
            return Err(ChainError::Paused)
        }
        Ok(())
    }

    fn ensure_not_enforced(&self, now: u64) -> Result<(), ChainError> {
        if self.enforced_batch_mode_due(now) {
            return Err(ChainError::InEnforcedBatchMode)
        }
        Ok(())
    }

    const fn verified_index(&self, proof_type: ProofType) -> u64 {
        match proof_type {
            ProofType::Zk => self.zk_verified,
            ProofType::Tee => self.tee_verified,
        }
    }

    fn set_verified_index(&mut self, proof_type: ProofType, batch_index: u64) {
        match proof_type {
            ProofType::Zk => self.zk_verified = batch_index,
            ProofType::Tee => self.tee_verified = batch_index,
        }
    }

    fn verifier(&self, proof_type: ProofType) -> Option<&dyn BundleVerifier> {
        match proof_type {
            ProofType::Zk => self.zk_verifier.as_deref(),
            ProofType::Tee => self.tee_verifier.as_deref(),
        }
    }

    fn store_batch(
        &mut self,
        batch_index: u64,
        hash: B256,
        version: u8,
        total_l1_messages_popped: u64,
        committed_at: u64,
    ) {
        self.batches.insert(
            batch_index,
            CommittedBatch { hash, version, total_l1_messages_popped, committed_at },
        );
        self.last_committed = batch_index;
        self.metrics.batches_committed.increment(1);
        self.metrics.last_committed_batch_index.set(batch_index as f64);
        self.events.push(ChainEvent::CommitBatch(BatchInfo::new(batch_index, hash)));
    }

    /// Deletes every committed batch above `keep`, newest first, and rewinds
    /// the first-generation queue when a deleted batch had popped messages.
    fn delete_batches_above(&mut self, timestamp: u64, keep: u64) -> Result<(), ChainError> {
        if self.last_committed <= keep {
            return Ok(())
        }

        let mut rewind_queue = false;
        for batch_index in ((keep + 1)..=self.last_committed).rev() {
            if let Some(batch) = self.batches.remove(&batch_index) {
                rewind_queue |= batch.version < CHAIN_COMMIT_VERSION;
                tracing::info!(target: "settlement::chain", batch_index, hash = %batch.hash, "batch reverted");
                self.metrics.batches_reverted.increment(1);
                self.events.push(ChainEvent::RevertBatch(BatchInfo::new(batch_index, batch.hash)));
            }
        }
        if rewind_queue {
            let reset_to = self
                .batches
                .get(&keep)
                .map(|batch| batch.total_l1_messages_popped)
                .unwrap_or_default();
            let queue_ctx = CallContext::new(self.config.address, timestamp);
            self.queue_v1.reset_popped_cross_domain_messages(queue_ctx, reset_to)?;
        }
        self.last_committed = keep;
        self.metrics.last_committed_batch_index.set(keep as f64);

        Ok(())
    }

    /// Advances finalization to the minimum verified index over the enabled
    /// proof systems, finalizing the queue range alongside.
    fn advance_finalization(&mut self, timestamp: u64) -> Result<(), ChainError> {
        let target = match (self.zk_verifier.is_some(), self.tee_verifier.is_some()) {
            (true, true) => self.zk_verified.min(self.tee_verified),
            (true, false) => self.zk_verified,
            (false, true) => self.tee_verified,
            (false, false) => return Ok(()),
        };
        if target <= self.last_finalized {
            return Ok(())
        }
        // every verified index has a roots entry under at least one system.
        let Some(state) = self
            .verified_roots
            .get(&(ProofType::Zk, target))
            .or_else(|| self.verified_roots.get(&(ProofType::Tee, target)))
            .cloned()
        else {
            return Ok(())
        };
        let Some(batch) = self.batches.get(&target).copied() else { return Ok(()) };

        let queue_ctx = CallContext::new(self.config.address, timestamp);
        if batch.version < CHAIN_COMMIT_VERSION {
            self.queue_v1
                .finalize_popped_cross_domain_messages(queue_ctx, batch.total_l1_messages_popped)?;
        } else {
            let count = state.total_l1_messages_popped.ok_or(ChainError::MissingMessageCount)?;
            self.queue_v2.finalize_popped_cross_domain_messages(queue_ctx, count)?;
            if let Some(stored) = self.batches.get_mut(&target) {
                stored.total_l1_messages_popped = count;
            }
        }

        self.last_finalized = target;
        self.finalized_state_roots.insert(target, state.state_root);
        self.withdraw_roots.insert(target, state.withdraw_root);
        self.verified_roots.retain(|(_, batch_index), _| *batch_index > target);

        tracing::info!(
            target: "settlement::chain",
            batch_index = target,
            state_root = %state.state_root,
            "batch finalized"
        );
        self.metrics.batches_finalized.increment(1);
        self.metrics.last_finalized_batch_index.set(target as f64);
        self.events.push(ChainEvent::FinalizeBatch {
            batch_info: BatchInfo::new(target, batch.hash),
            state_root: state.state_root,
            withdraw_root: state.withdraw_root,
        });

        Ok(())
    }

    fn decode_chunks(version: u8, chunks: &[Bytes]) -> Result<Vec<ChunkV0>, ChainError> {
        let mut decoded = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let chunk = if version == 0 {
                ChunkV0::try_from_buf(&mut chunk.as_ref())?
            } else {
                let ChunkV1 { blocks } = ChunkV1::try_from_buf(&mut chunk.as_ref())?;
                ChunkV0 { blocks, l2_transactions: Vec::new() }
            };
            decoded.push(chunk);
        }
        Ok(decoded)
    }

    /// Recomputes the batch data hash: the keccak of the per-chunk hashes,
    /// each folding the block context prefixes, the included (non-skipped)
    /// message hashes, and for version 0 the hashes of the embedded L2
    /// transactions.
    fn compute_data_hash(
        &self,
        version: u8,
        chunks: &[ChunkV0],
        base_queue_index: u64,
        skipped_l1_message_bitmap: &[U256],
    ) -> Result<B256, ChainError> {
        let mut chunk_hashes = Vec::with_capacity(chunks.len() * 32);
        let mut offset = 0u64;
        for chunk in chunks {
            let mut bytes = Vec::new();
            for block in &chunk.blocks {
                block.encode_hash_prefix_into(&mut bytes);
            }
            for (block_offset, block) in chunk.blocks.iter().enumerate() {
                for _ in 0..block.num_l1_messages {
                    let queue_index = base_queue_index + offset;
                    if !is_skipped(skipped_l1_message_bitmap, offset) {
                        let hash = self.queue_v1.message_hash(queue_index).ok_or(
                            ChainError::Queue(QueueError::PopBeyondAppended {
                                requested: queue_index + 1,
                                frontier: self.queue_v1.next_cross_domain_message_index(),
                            }),
                        )?;
                        bytes.put_slice(hash.as_slice());
                    }
                    offset += 1;
                }
                if version == 0 {
                    if let Some(transactions) = chunk.l2_transactions.get(block_offset) {
                        for transaction in transactions {
                            bytes.put_slice(keccak256(transaction).as_slice());
                        }
                    }
                }
            }
            chunk_hashes.extend_from_slice(keccak256(&bytes).as_slice());
        }

        Ok(keccak256(&chunk_hashes))
    }
}

/// Returns true if the bit at `offset` is set in the paged skip bitmap.
fn is_skipped(bitmap: &[U256], offset: u64) -> bool {
    bitmap
        .get((offset / 256) as usize)
        .is_some_and(|word| word.bit((offset % 256) as usize))
}
