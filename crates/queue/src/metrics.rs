use metrics::Counter;
use metrics_derive::Metrics;

/// The metrics for the message queue.
#[derive(Metrics, Clone)]
#[metrics(scope = "queue")]
pub struct QueueMetrics {
    /// The number of messages appended to the queue.
    pub messages_appended: Counter,
    /// The number of messages popped from the queue.
    pub messages_dequeued: Counter,
    /// The number of messages dropped from the queue.
    pub messages_dropped: Counter,
}
