//! Bus counters: published/processed totals, queue depth, high-water mark.

/// Snapshot of bus statistics, taken atomically under the state lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusStats {
    /// Events accepted by `publish_sync`/`publish_async` since the last reset.
    pub events_published: u64,
    /// Events dispatched to their subscription list since the last reset.
    pub events_processed: u64,
    /// Events currently pending across all async queues.
    pub queue_depth: usize,
    /// Highest `queue_depth` observed since the last reset.
    pub queue_peak: usize,
    /// Currently registered subscriptions across all event types.
    pub subscribers: usize,
}

impl BusStats {
    /// Records a new total depth after an enqueue, updating the peak.
    pub(crate) fn record_depth(&mut self, depth: usize) {
        self.queue_depth = depth;
        if depth > self.queue_peak {
            self.queue_peak = depth;
        }
    }

    /// Zeroes the cumulative counters and the peak; the subscriber count and
    /// current queue depth are live gauges and survive the reset.
    pub(crate) fn reset(&mut self) {
        let subscribers = self.subscribers;
        let queue_depth = self.queue_depth;
        *self = BusStats {
            subscribers,
            queue_depth,
            ..BusStats::default()
        };
    }
}
