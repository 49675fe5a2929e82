//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging event handlers into the
//! bus. A handler is registered per event type together with a
//! [`Priority`](crate::Priority) that orders it against the other subscribers
//! of the same type.
//!
//! ## Contract
//! - Handlers run with **no bus lock held**, so they may freely re-enter the
//!   bus: publish, subscribe, unsubscribe, or drain from inside `on_event`.
//! - Handlers must not stash the `&Event` borrow beyond their own invocation;
//!   clone the payload (`Arc` clone, cheap) if it must outlive the call.
//! - Long blocking work stalls the publishing task (sync publish) or the
//!   drain task (async dispatch) — keep handlers short or hand off.
//!
//! ## Example (skeleton)
//! ```rust
//! use async_trait::async_trait;
//! use evbus::{Event, Subscribe};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Subscribe for Audit {
//!     async fn on_event(&self, event: &Event) {
//!         // write audit record...
//!         let _ = event.event_type;
//!     }
//!     fn name(&self) -> &'static str { "audit" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Subscription identity is the handler allocation itself: the same `Arc`
/// subscribed twice to one event type is a no-op, and
/// [`unsubscribe`](crate::EventBus::unsubscribe) matches by reference, not by
/// value.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handles a single event.
    ///
    /// Called once per matching dispatch, in priority order within the
    /// dispatched snapshot.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
