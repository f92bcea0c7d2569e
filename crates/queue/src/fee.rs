//! Deterministic cross-domain fee estimation.

use alloy_primitives::U256;
use settlement_primitives::SystemConfig;

/// The fixed-point denominator of the base fee scalar.
const PRECISION: u64 = 1_000_000_000_000_000_000;

/// Estimates the L2 base fee from the L1 base fee:
/// `base_fee_overhead + l1_base_fee * base_fee_scalar / 1e18`, saturating.
pub fn estimate_l2_base_fee(config: &SystemConfig, l1_base_fee: U256) -> U256 {
    let scaled = l1_base_fee.saturating_mul(config.base_fee_scalar) / U256::from(PRECISION);
    config.base_fee_overhead.saturating_add(scaled)
}

/// Estimates the fee for a cross-domain message with the given gas limit.
pub fn estimate_cross_domain_message_fee(
    config: &SystemConfig,
    l1_base_fee: U256,
    gas_limit: u64,
) -> U256 {
    U256::from(gas_limit).saturating_mul(estimate_l2_base_fee(config, l1_base_fee))
}
