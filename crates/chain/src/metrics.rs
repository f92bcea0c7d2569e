use metrics::{Counter, Gauge};
use metrics_derive::Metrics;

/// The metrics of the chain state machine.
#[derive(Metrics, Clone)]
#[metrics(scope = "settlement_chain")]
pub struct ChainMetrics {
    /// The number of batches committed.
    pub batches_committed: Counter,
    /// The number of batches reverted.
    pub batches_reverted: Counter,
    /// The number of batches finalized.
    pub batches_finalized: Counter,
    /// The number of state mismatches recorded.
    pub state_mismatches: Counter,
    /// The last committed batch index.
    pub last_committed_batch_index: Gauge,
    /// The last finalized batch index.
    pub last_finalized_batch_index: Gauge,
}
