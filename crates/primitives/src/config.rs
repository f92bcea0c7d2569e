use alloy_primitives::U256;

/// Mutable protocol parameters owned by the system configuration collaborator.
///
/// The queue and the chain consume these values but never mutate them; updates
/// arrive through the owner-gated setters at the chain boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemConfig {
    /// The maximum gas limit accepted for a queued message.
    pub max_gas_limit: u64,
    /// The additive term of the L2 base fee formula.
    pub base_fee_overhead: U256,
    /// The multiplicative term of the L2 base fee formula, 1e18 fixed point.
    pub base_fee_scalar: U256,
    /// The maximum commit-to-finalize delay, in seconds, before enforced-batch
    /// mode can be entered.
    pub max_finalize_delay: u64,
    /// The maximum time, in seconds, the oldest unfinalized message may stay
    /// pending before enforced-batch mode can be entered.
    pub max_inclusion_delay: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            max_gas_limit: 10_000_000,
            base_fee_overhead: U256::ZERO,
            base_fee_scalar: U256::from(10u64.pow(18)),
            max_finalize_delay: 7 * 24 * 60 * 60,
            max_inclusion_delay: 24 * 60 * 60,
        }
    }
}
