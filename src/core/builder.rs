use std::sync::Arc;

use crate::config::BusConfig;
use crate::core::bus::EventBus;
use crate::core::signal::{NotifySignal, WaitStrategy};

/// Builder for constructing an [`EventBus`] with an optional custom wait
/// strategy.
pub struct BusBuilder {
    cfg: BusConfig,
    signal: Option<Arc<dyn WaitStrategy>>,
}

impl BusBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: BusConfig) -> Self {
        Self { cfg, signal: None }
    }

    /// Replaces the default [`NotifySignal`] with a custom readiness backend.
    ///
    /// The implementation must keep the no-lost-signal contract documented on
    /// [`WaitStrategy`].
    pub fn with_signal(mut self, signal: Arc<dyn WaitStrategy>) -> Self {
        self.signal = Some(signal);
        self
    }

    /// Builds the bus behind an `Arc`, ready to share across tasks.
    pub fn build(self) -> Arc<EventBus> {
        let signal = self
            .signal
            .unwrap_or_else(|| Arc::new(NotifySignal::new()));
        Arc::new(EventBus::with_signal(self.cfg, signal))
    }
}
