//! # Snapshot dispatch: deliver one event to its subscribers.
//!
//! This is the reentrancy-safety core of the bus, and the protocol must stay
//! exactly this shape:
//!
//! ```text
//! 1. lock            — sort the list if an add/remove dirtied it
//! 2. snapshot        — clone the subscription records (Arc clones, bounded)
//! 3. unlock          — before any user code runs
//! 4. iterate         — await each handler in snapshot order, no lock held
//! ```
//!
//! Because no lock is held during step 4, a handler may publish, subscribe,
//! unsubscribe, or drain without deadlocking, and list mutations cannot
//! corrupt the iteration — it walks the snapshot, not the live list.
//!
//! ## Mid-dispatch visibility
//! - A subscription added by a running handler is **not** part of the current
//!   snapshot; it sees the next dispatch.
//! - A subscription removed by a running handler **is** still invoked once if
//!   it was already snapshotted.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::core::bus::EventBus;
use crate::error::BusError;
use crate::events::Event;
use crate::subscribers::Subscription;

impl EventBus {
    /// Dispatches `event` to the (sorted) subscribers of its type.
    ///
    /// Counts the event as processed whether or not anyone is subscribed.
    pub(crate) async fn dispatch(&self, event: &Event) -> Result<(), BusError> {
        let snapshot: Vec<Subscription> = {
            let mut state = self.lock()?;
            let snapshot = state.table.snapshot_sorted(event.event_type)?;
            state.stats.events_processed += 1;
            snapshot
        };

        for entry in snapshot {
            // A panicking handler must not sink the rest of the snapshot.
            let _ = AssertUnwindSafe(entry.handler.on_event(event))
                .catch_unwind()
                .await;
        }
        Ok(())
    }
}
