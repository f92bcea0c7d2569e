//! The cross-domain message queue: an append-only, indexable log of messages
//! with skip/drop/finalize bookkeeping.
//!
//! Two generations coexist. [`MessageQueueV1`] stores per-message transaction
//! hashes and is consumed through explicit pops carrying a skip bitmap.
//! [`MessageQueueV2`] folds every message into a rolling hash chain, records
//! enqueue timestamps and is finalized by count; content validation moves
//! entirely into the proof system.

pub use bitmap::PagedBitmap;
mod bitmap;

pub use error::QueueError;
mod error;

pub use event::QueueEvent;
mod event;

pub use fee::{estimate_cross_domain_message_fee, estimate_l2_base_fee};
mod fee;

mod metrics;

pub use v1::MessageQueueV1;
mod v1;

pub use v2::MessageQueueV2;
mod v2;

use settlement_primitives::SystemConfig;

/// The intrinsic gas of any message, before the per-byte calldata cost.
const INTRINSIC_GAS_BASE: u64 = 21000;

/// Checks the message gas limit against the configured maximum and the
/// intrinsic cost of its calldata.
pub(crate) fn check_gas_limit(
    config: &SystemConfig,
    gas_limit: u64,
    data_len: usize,
    gas_per_byte: u64,
) -> Result<(), QueueError> {
    if gas_limit > config.max_gas_limit {
        return Err(QueueError::GasLimitExceeded { got: gas_limit, max: config.max_gas_limit })
    }
    let intrinsic = INTRINSIC_GAS_BASE + gas_per_byte * data_len as u64;
    if gas_limit < intrinsic {
        return Err(QueueError::GasLimitBelowIntrinsicGas { got: gas_limit, intrinsic })
    }

    Ok(())
}
