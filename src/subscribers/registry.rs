//! # Per-type subscription lists with lazy priority sorting.
//!
//! [`SubscriberTable`] holds one bounded [`SubscriptionList`] per event type.
//! Lists stay in raw subscribe order until a dispatch needs them; the sort is
//! stable, so subscribers of equal priority keep their subscribe order.
//!
//! ## Rules
//! - **Identity**: one live entry per (event type, handler allocation).
//!   Re-subscribing the same handler is a no-op that keeps the stored
//!   priority — it does **not** update it.
//! - **Capacity first**: a full list rejects before the duplicate scan runs,
//!   mirroring the add path's slot search.
//! - **`sorted` flag**: cleared on any add/remove, set only after a completed
//!   sort (or when the list becomes empty).

use std::sync::Arc;

use crate::config::BusConfig;
use crate::error::BusError;
use crate::events::{EventType, Priority};
use crate::subscribers::Subscribe;

/// One registered subscriber: handler plus its execution priority.
#[derive(Clone)]
pub(crate) struct Subscription {
    pub(crate) handler: Arc<dyn Subscribe>,
    pub(crate) priority: Priority,
}

/// Compares a stored handler against a caller-supplied reference by address.
fn same_handler(stored: &Arc<dyn Subscribe>, candidate: &dyn Subscribe) -> bool {
    Arc::as_ptr(stored).cast::<()>() == (candidate as *const dyn Subscribe).cast::<()>()
}

/// Bounded subscriber set for a single event type.
pub(crate) struct SubscriptionList {
    entries: Vec<Subscription>,
    sorted: bool,
    capacity: usize,
}

impl SubscriptionList {
    fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            sorted: true,
            capacity,
        }
    }

    fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    fn position(&self, handler: &dyn Subscribe) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| same_handler(&entry.handler, handler))
    }

    /// Stable sort by priority ascending (High first), run lazily: only when
    /// an add/remove invalidated the order since the last dispatch.
    fn ensure_sorted(&mut self) {
        if !self.sorted {
            self.entries.sort_by_key(|entry| entry.priority);
            self.sorted = true;
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// All subscription lists, indexed densely by event type.
pub(crate) struct SubscriberTable {
    lists: Vec<SubscriptionList>,
}

impl SubscriberTable {
    pub(crate) fn new(cfg: &BusConfig) -> Self {
        let types = cfg.max_event_types_clamped();
        let per_type = cfg.max_subscribers_clamped();
        let mut lists = Vec::with_capacity(types);
        lists.resize_with(types, || SubscriptionList::new(per_type));
        Self { lists }
    }

    fn index(&self, event_type: EventType) -> Result<usize, BusError> {
        let idx = event_type.index();
        if idx >= self.lists.len() {
            return Err(BusError::InvalidEventType {
                id: event_type.id(),
                limit: self.lists.len(),
            });
        }
        Ok(idx)
    }

    /// Range-checks an event type without touching any list.
    pub(crate) fn validate(&self, event_type: EventType) -> Result<(), BusError> {
        self.index(event_type).map(|_| ())
    }

    /// Registers `handler` for `event_type`.
    ///
    /// Returns `Ok(true)` when a new entry was added, `Ok(false)` for a
    /// duplicate (no-op, stored priority untouched).
    pub(crate) fn subscribe(
        &mut self,
        event_type: EventType,
        handler: Arc<dyn Subscribe>,
        priority: Priority,
    ) -> Result<bool, BusError> {
        let idx = self.index(event_type)?;
        let list = &mut self.lists[idx];

        if list.is_full() {
            return Err(BusError::CapacityExceeded {
                id: event_type.id(),
                limit: list.capacity,
            });
        }
        if list.position(handler.as_ref()).is_some() {
            return Ok(false);
        }

        list.entries.push(Subscription { handler, priority });
        list.sorted = false;
        Ok(true)
    }

    /// Removes the entry matching `handler`, or fails with
    /// [`BusError::NotFound`].
    pub(crate) fn unsubscribe(
        &mut self,
        event_type: EventType,
        handler: &dyn Subscribe,
    ) -> Result<(), BusError> {
        let idx = self.index(event_type)?;
        let list = &mut self.lists[idx];

        match list.position(handler) {
            Some(pos) => {
                list.entries.remove(pos);
                list.sorted = false;
                Ok(())
            }
            None => Err(BusError::NotFound {
                id: event_type.id(),
            }),
        }
    }

    /// Removes every entry for `event_type`; returns how many were removed.
    pub(crate) fn unsubscribe_all(&mut self, event_type: EventType) -> Result<usize, BusError> {
        let idx = self.index(event_type)?;
        let list = &mut self.lists[idx];
        let removed = list.entries.len();
        list.entries.clear();
        list.sorted = true;
        Ok(removed)
    }

    pub(crate) fn count(&self, event_type: EventType) -> Result<usize, BusError> {
        let idx = self.index(event_type)?;
        Ok(self.lists[idx].len())
    }

    /// Sorts the list if needed and clones it for lock-free iteration.
    ///
    /// The clone is the dispatch snapshot: mutations that happen after this
    /// call (including from inside running handlers) do not affect it.
    pub(crate) fn snapshot_sorted(
        &mut self,
        event_type: EventType,
    ) -> Result<Vec<Subscription>, BusError> {
        let idx = self.index(event_type)?;
        let list = &mut self.lists[idx];
        list.ensure_sorted();
        Ok(list.entries.clone())
    }
}
