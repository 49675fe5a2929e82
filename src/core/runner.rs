//! # Drain operations and the blocking event loop.
//!
//! Async events sit in the per-priority queues until something drains them:
//! either manual calls to [`process_one`](EventBus::process_one) /
//! [`process_all`](EventBus::process_all) from the embedder's own loop, or the
//! built-in [`run_loop`](EventBus::run_loop) driven by the
//! [`WaitStrategy`](crate::WaitStrategy).
//!
//! ## Loop shape
//! ```text
//! run_loop:
//!   running = true
//!   loop {
//!     lock: stopped? ──► return
//!           queues empty? ──► unlock, wait for signal, re-check
//!     unlock
//!     process_all()          (drain fully, dispatching outside the lock)
//!   }
//! ```
//!
//! ## Rules
//! - **Cooperative stop**: [`stop_loop`](EventBus::stop_loop) flips the flag
//!   and signals; the loop observes it at its next poll point. An in-flight
//!   handler is never preempted.
//! - **Single drain loop**: the bus is built for one consumer; running two
//!   loops concurrently is not supported (signals target one waiter).
//! - **No lost wakeups**: the wait strategy stores a signal that arrives
//!   between the empty-check and the suspension, so the check can release the
//!   lock before waiting.

use crate::core::bus::EventBus;
use crate::error::BusError;

impl EventBus {
    /// Dequeues and dispatches the highest-priority pending event.
    ///
    /// Fails with [`BusError::QueueEmpty`] when all queues are empty.
    pub async fn process_one(&self) -> Result<(), BusError> {
        let event = {
            let mut state = self.lock()?;
            let Some(event) = state.queues.dequeue_highest() else {
                return Err(BusError::QueueEmpty);
            };
            let depth = state.queues.total_len();
            state.stats.queue_depth = depth;
            event
        };
        self.dispatch(&event).await
    }

    /// Drains every pending event; returns how many were dispatched.
    ///
    /// Events published (by handlers or other tasks) while the drain runs are
    /// drained too — this returns only once a dequeue finds nothing.
    pub async fn process_all(&self) -> Result<u64, BusError> {
        let mut drained = 0;
        loop {
            match self.process_one().await {
                Ok(()) => drained += 1,
                Err(BusError::QueueEmpty) => return Ok(drained),
                Err(e) => return Err(e),
            }
        }
    }

    /// Runs the event loop until [`stop_loop`](EventBus::stop_loop) is called.
    ///
    /// Blocks the calling task: drains the queues whenever they are
    /// non-empty, otherwise suspends on the wait strategy until an async
    /// publish (or a stop) signals it.
    pub async fn run_loop(&self) -> Result<(), BusError> {
        self.lock()?.running = true;

        loop {
            let idle = {
                let state = self.lock()?;
                if !state.running {
                    return Ok(());
                }
                state.queues.is_empty()
            };

            if idle {
                self.signal.wait().await;
            } else {
                self.process_all().await?;
            }
        }
    }

    /// Requests the event loop to stop and wakes it if blocked.
    ///
    /// Cooperative: the loop exits at its next poll point; queued events stay
    /// queued and can still be drained manually.
    pub fn stop_loop(&self) -> Result<(), BusError> {
        self.lock()?.running = false;
        self.signal.signal();
        Ok(())
    }
}
