//! # evbus
//!
//! **evbus** is an embeddable publish/subscribe event dispatcher for Rust.
//!
//! Components publish bounded-typed events either synchronously (awaited
//! delivery on the caller's task) or asynchronously (queued, drained later),
//! and independent subscribers register interest without mutual knowledge.
//! Every capacity is fixed at construction time, which makes the bus suitable
//! as a building block for resource-constrained services.
//!
//! ## Architecture
//! ```text
//!  Publishers (many):
//!    publish_sync(type, payload) ──────────────────────────┐
//!    publish_async(type, payload, priority) ──┐            │
//!                                             ▼            │
//!  ┌───────────────────────────────────────────────────────┼──────────┐
//!  │  EventBus (one mutex over all mutable state)          │          │
//!  │                                                       │          │
//!  │   QueueSet: [High] [Normal] [Low]   SubscriberTable   │          │
//!  │   (ring buffers, fail-fast full)    (per-type lists,  │          │
//!  │        │                            lazy prio sort)   │          │
//!  └────────┼────────────────────────────────────┬─────────┼──────────┘
//!           ▼                                    │         │
//!    run_loop / process_one / process_all        │         │
//!    (drain High → Normal → Low)                 ▼         ▼
//!                                        snapshot under lock, then
//!                                        handler.on_event(&Event)
//!                                        (priority order, NO lock held)
//! ```
//!
//! ## Guarantees
//! | Area             | Contract                                                          |
//! |------------------|-------------------------------------------------------------------|
//! | **Ordering**     | FIFO within a priority queue; strict High → Normal → Low drain.   |
//! | **Subscribers**  | Run in priority order; subscribe order breaks ties (stable sort). |
//! | **Reentrancy**   | Handlers run without the lock and may re-enter the bus freely.    |
//! | **Backpressure** | None: a full queue fails fast with [`BusError::QueueFull`].       |
//! | **Capacities**   | All bounds fixed by [`BusConfig`] at construction.                |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] subscriber
//!   _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! use async_trait::async_trait;
//! use evbus::{BusConfig, Event, EventBus, EventType, Payload, Priority, Subscribe};
//!
//! const SENSOR_READY: EventType = EventType::new(7);
//!
//! struct Counter(AtomicU64);
//!
//! #[async_trait]
//! impl Subscribe for Counter {
//!     async fn on_event(&self, _event: &Event) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), evbus::BusError> {
//!     let bus = EventBus::new(BusConfig::default());
//!     let counter = Arc::new(Counter(AtomicU64::new(0)));
//!     bus.subscribe(SENSOR_READY, counter.clone(), Priority::Normal)?;
//!
//!     // Immediate delivery on this task:
//!     bus.publish_sync(SENSOR_READY, Payload::None).await?;
//!
//!     // Deferred delivery through the high-priority queue:
//!     bus.publish_async_copy(SENSOR_READY, b"temp=21", Priority::High)?;
//!     bus.process_all().await?;
//!
//!     assert_eq!(counter.0.load(Ordering::Relaxed), 2);
//!     Ok(())
//! }
//! ```
//!
//! For a long-running service, spawn [`EventBus::run_loop`] on its own task
//! and stop it with [`EventBus::stop_loop`]; the loop blocks on the
//! [`WaitStrategy`] while idle instead of spinning.

mod config;
mod core;
mod error;
mod events;
mod subscribers;

// ---- Public re-exports ----

pub use config::BusConfig;
pub use core::{BusBuilder, BusStats, EventBus, NotifySignal, WaitStrategy};
pub use error::BusError;
pub use events::{DeliveryMode, Event, EventType, Payload, Priority};
pub use subscribers::Subscribe;

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

/// Returns the crate version string.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
