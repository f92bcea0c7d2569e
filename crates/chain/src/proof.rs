use alloy_primitives::{B256, U256};

/// The proof system backing a bundle finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProofType {
    /// A validity proof from the ZK prover.
    Zk,
    /// An attestation from the TEE prover.
    Tee,
}

impl ProofType {
    /// Returns the other proof system.
    pub const fn other(&self) -> Self {
        match self {
            Self::Zk => Self::Tee,
            Self::Tee => Self::Zk,
        }
    }
}

impl std::fmt::Display for ProofType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Zk => f.write_str("zk"),
            Self::Tee => f.write_str("tee"),
        }
    }
}

/// The public inputs a bundle proof commits to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundlePublicInputs {
    /// The hash of the batch preceding the bundle.
    pub prev_batch_hash: B256,
    /// The state root after the batch preceding the bundle.
    pub prev_state_root: B256,
    /// The hash of the last batch in the bundle.
    pub batch_hash: B256,
    /// The state root after the last batch in the bundle.
    pub post_state_root: B256,
    /// The withdraw trie root after the last batch in the bundle.
    pub withdraw_root: B256,
    /// The total number of L1 messages consumed after the bundle. Carried for
    /// version 7 batches whose headers no longer record it.
    pub total_l1_messages_popped: Option<u64>,
}

/// Verifies a bundle proof against its public inputs.
pub trait BundleVerifier: std::fmt::Debug + Send + Sync {
    /// Returns true if the proof is valid for the given public inputs.
    fn verify(&self, inputs: &BundlePublicInputs, proof: &[u8]) -> bool;
}

/// Verifies the KZG opening binding a blob commitment to a batch data hash.
pub trait PointEvaluator: std::fmt::Debug + Send + Sync {
    /// Returns true if the commitment opens to `y` at challenge point `z` and
    /// hashes to the given versioned hash.
    fn verify(
        &self,
        versioned_hash: B256,
        z: U256,
        y: U256,
        commitment: &[u8],
        proof: &[u8],
    ) -> bool;
}

/// A finalization attempt whose state root disagrees with the other proof
/// system, parked until the owner resolves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedState {
    /// The proof system that surfaced the disagreement.
    pub proof_type: ProofType,
    /// The bundle end index the disagreement occurred at.
    pub batch_index: u64,
    /// The post-state root claimed by the later proof.
    pub state_root: B256,
    /// The withdraw root claimed by the later proof.
    pub withdraw_root: B256,
    /// The message count claimed by the later proof, for version 7 bundles.
    pub total_l1_messages_popped: Option<u64>,
}

#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::{AcceptAll, MockPointEvaluator};

#[cfg(any(test, feature = "test-utils"))]
mod test_utils {
    use super::*;

    /// A bundle verifier that accepts every proof.
    #[derive(Debug, Default)]
    pub struct AcceptAll;

    impl BundleVerifier for AcceptAll {
        fn verify(&self, _inputs: &BundlePublicInputs, _proof: &[u8]) -> bool {
            true
        }
    }

    /// A point evaluator that accepts commitments with the configured outcome.
    #[derive(Debug)]
    pub struct MockPointEvaluator(pub bool);

    impl PointEvaluator for MockPointEvaluator {
        fn verify(
            &self,
            _versioned_hash: B256,
            _z: U256,
            _y: U256,
            _commitment: &[u8],
            _proof: &[u8],
        ) -> bool {
            self.0
        }
    }
}
