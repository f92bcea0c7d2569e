use std::collections::HashSet;

use alloy_primitives::Address;

use crate::error::ChainError;

/// The role assignments gating the chain entry points.
///
/// The owner is fixed at construction. Sequencers commit, provers finalize,
/// and whitelisted accounts may drive the enforced-batch path.
#[derive(Debug)]
pub struct AccessControl {
    owner: Address,
    sequencers: HashSet<Address>,
    provers: HashSet<Address>,
    whitelist: HashSet<Address>,
}

impl AccessControl {
    /// Returns a new role table with only the owner set.
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            sequencers: HashSet::new(),
            provers: HashSet::new(),
            whitelist: HashSet::new(),
        }
    }

    /// Returns the owner.
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Returns true if the account holds the sequencer role.
    pub fn is_sequencer(&self, account: Address) -> bool {
        self.sequencers.contains(&account)
    }

    /// Returns true if the account holds the prover role.
    pub fn is_prover(&self, account: Address) -> bool {
        self.provers.contains(&account)
    }

    /// Returns true if the account is whitelisted for enforced batches.
    pub fn is_whitelisted(&self, account: Address) -> bool {
        self.whitelist.contains(&account)
    }

    /// Errors unless the caller is the owner.
    pub fn require_owner(&self, caller: Address) -> Result<(), ChainError> {
        if caller != self.owner {
            return Err(ChainError::CallerIsNotOwner(caller))
        }
        Ok(())
    }

    /// Errors unless the caller holds the sequencer role.
    pub fn require_sequencer(&self, caller: Address) -> Result<(), ChainError> {
        if !self.is_sequencer(caller) {
            return Err(ChainError::CallerIsNotSequencer(caller))
        }
        Ok(())
    }

    /// Errors unless the caller holds the prover role.
    pub fn require_prover(&self, caller: Address) -> Result<(), ChainError> {
        if !self.is_prover(caller) {
            return Err(ChainError::CallerIsNotProver(caller))
        }
        Ok(())
    }

    /// Errors unless the caller is the owner or whitelisted.
    pub fn require_whitelisted(&self, caller: Address) -> Result<(), ChainError> {
        if caller != self.owner && !self.is_whitelisted(caller) {
            return Err(ChainError::CallerIsNotWhitelisted(caller))
        }
        Ok(())
    }

    /// Grants or revokes the sequencer role. Returns true if the set changed.
    pub fn set_sequencer(&mut self, account: Address, status: bool) -> bool {
        if status {
            self.sequencers.insert(account)
        } else {
            self.sequencers.remove(&account)
        }
    }

    /// Grants or revokes the prover role. Returns true if the set changed.
    pub fn set_prover(&mut self, account: Address, status: bool) -> bool {
        if status {
            self.provers.insert(account)
        } else {
            self.provers.remove(&account)
        }
    }

    /// Grants or revokes the enforced-batch whitelist. Returns true if the set
    /// changed.
    pub fn set_whitelisted(&mut self, account: Address, status: bool) -> bool {
        if status {
            self.whitelist.insert(account)
        } else {
            self.whitelist.remove(&account)
        }
    }
}
