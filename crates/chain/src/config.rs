use alloy_primitives::Address;

/// Immutable chain parameters fixed at construction.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// The address identifying the chain state machine towards the queues.
    pub address: Address,
    /// The owner account.
    pub owner: Address,
    /// The lowest batch version accepted by commits.
    pub min_batch_version: u8,
    /// The highest batch version accepted by commits.
    pub max_batch_version: u8,
}

impl ChainConfig {
    /// Returns true if the version is accepted by the configured range.
    pub const fn accepts_version(&self, version: u8) -> bool {
        version >= self.min_batch_version && version <= self.max_batch_version
    }
}
