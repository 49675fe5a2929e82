//! # Pluggable wait/signal primitive for the drain loop.
//!
//! [`WaitStrategy`] is the readiness-notification seam: the event loop blocks
//! on [`WaitStrategy::wait`] when all queues are empty, and every async
//! publish (plus [`stop_loop`](crate::EventBus::stop_loop)) calls
//! [`WaitStrategy::signal`]. An OS-specific backend (eventfd, a waitable
//! handle, …) can replace the default without touching dispatch or queue
//! logic, as long as it preserves the contract below.
//!
//! ## Contract
//! - A `signal()` delivered while no task is waiting must not be lost: the
//!   next `wait()` returns immediately. This is what makes the bus's
//!   check-then-wait sequence race-free without holding the state lock across
//!   the suspension.
//! - One waiter at a time is sufficient (the bus runs a single drain loop);
//!   implementations need not support concurrent waiters.

use async_trait::async_trait;
use tokio::sync::Notify;

/// Readiness notification used by the event loop.
#[async_trait]
pub trait WaitStrategy: Send + Sync + 'static {
    /// Suspends until signalled. Returns immediately if a signal arrived
    /// since the last wait.
    async fn wait(&self);

    /// Wakes the waiting loop, or stores the wakeup for the next `wait`.
    fn signal(&self);
}

/// Default [`WaitStrategy`] over [`tokio::sync::Notify`].
///
/// `notify_one` stores a permit when no waiter is registered, which satisfies
/// the no-lost-signal contract directly.
#[derive(Default)]
pub struct NotifySignal {
    notify: Notify,
}

impl NotifySignal {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WaitStrategy for NotifySignal {
    async fn wait(&self) {
        self.notify.notified().await;
    }

    fn signal(&self) {
        self.notify.notify_one();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_signal_before_wait_is_not_lost() {
        let s = NotifySignal::new();
        s.signal();
        tokio::time::timeout(Duration::from_secs(1), s.wait())
            .await
            .expect("stored permit should complete the wait immediately");
    }
}
