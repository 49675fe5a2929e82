//! # Bounded per-priority ring buffers for async events.
//!
//! [`QueueSet`] owns one fixed-capacity [`PriorityQueue`] per [`Priority`]
//! level. Publishing to a full queue fails fast with
//! [`BusError::QueueFull`] — there is no backpressure wait.
//!
//! ## Rules
//! - **FIFO within a queue**: head/tail advance modulo capacity.
//! - **Strict precedence across queues**: [`QueueSet::dequeue_highest`] scans
//!   `High → Normal → Low` and pops the first non-empty head. Sustained
//!   high-priority load starves lower priorities; that is the contract.
//! - **Ownership moves through the queue**: an enqueued [`Event`] (including
//!   its payload) is owned by its slot until dequeued or cleared, so queued
//!   payload copies are released exactly once.

use crate::error::BusError;
use crate::events::event::{Event, Priority};

/// Fixed-capacity ring buffer of pending events for one priority level.
pub(crate) struct PriorityQueue {
    slots: Box<[Option<Event>]>,
    head: usize,
    tail: usize,
    len: usize,
}

impl PriorityQueue {
    /// Creates an empty queue. `capacity` must be at least 1 (the config layer
    /// clamps it).
    pub(crate) fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self {
            slots: slots.into_boxed_slice(),
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Writes `event` at the tail.
    ///
    /// Fails with [`BusError::QueueFull`] when `len == capacity`, leaving the
    /// queue untouched.
    pub(crate) fn enqueue(&mut self, event: Event) -> Result<(), BusError> {
        if self.len == self.slots.len() {
            return Err(BusError::QueueFull {
                priority: event.priority,
                capacity: self.slots.len(),
            });
        }
        self.slots[self.tail] = Some(event);
        self.tail = (self.tail + 1) % self.slots.len();
        self.len += 1;
        Ok(())
    }

    /// Moves the head event out, or `None` when empty.
    pub(crate) fn dequeue(&mut self) -> Option<Event> {
        if self.len == 0 {
            return None;
        }
        let event = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;
        event
    }

    /// Drops every pending event (and its payload), resetting the ring.
    pub(crate) fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// One ring buffer per priority level, drained in strict priority order.
pub(crate) struct QueueSet {
    queues: [PriorityQueue; Priority::COUNT],
}

impl QueueSet {
    /// Creates the set with the same per-queue `capacity` for every level.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            queues: [
                PriorityQueue::new(capacity),
                PriorityQueue::new(capacity),
                PriorityQueue::new(capacity),
            ],
        }
    }

    /// Routes `event` to the queue of its own priority.
    pub(crate) fn enqueue(&mut self, event: Event) -> Result<(), BusError> {
        self.queues[event.priority.index()].enqueue(event)
    }

    /// Pops the head of the first non-empty queue in
    /// [`Priority::DRAIN_ORDER`], or `None` when all queues are empty.
    pub(crate) fn dequeue_highest(&mut self) -> Option<Event> {
        for priority in Priority::DRAIN_ORDER {
            if let Some(event) = self.queues[priority.index()].dequeue() {
                return Some(event);
            }
        }
        None
    }

    /// Total pending events across all priorities.
    pub(crate) fn total_len(&self) -> usize {
        self.queues.iter().map(PriorityQueue::len).sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.queues.iter().all(PriorityQueue::is_empty)
    }

    /// Clears every queue, releasing all pending payloads.
    pub(crate) fn clear(&mut self) {
        for queue in &mut self.queues {
            queue.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::event::{EventType, Payload};
    use std::sync::Arc;

    fn ev(id: u32, priority: Priority) -> Event {
        Event::new(EventType::new(id)).with_priority(priority)
    }

    #[test]
    fn test_fifo_within_one_queue() {
        let mut q = PriorityQueue::new(4);
        for id in 0..3 {
            q.enqueue(ev(id, Priority::Normal)).unwrap();
        }
        for id in 0..3 {
            assert_eq!(q.dequeue().unwrap().event_type.id(), id);
        }
        assert!(q.dequeue().is_none());
    }

    #[test]
    fn test_ring_wraparound_preserves_fifo() {
        let mut q = PriorityQueue::new(2);
        q.enqueue(ev(0, Priority::Normal)).unwrap();
        assert_eq!(q.dequeue().unwrap().event_type.id(), 0);
        // Head has advanced; the next two writes wrap around the ring.
        q.enqueue(ev(1, Priority::Normal)).unwrap();
        q.enqueue(ev(2, Priority::Normal)).unwrap();
        assert_eq!(q.dequeue().unwrap().event_type.id(), 1);
        assert_eq!(q.dequeue().unwrap().event_type.id(), 2);
    }

    #[test]
    fn test_full_queue_rejects_without_change() {
        let mut q = PriorityQueue::new(1);
        q.enqueue(ev(0, Priority::High)).unwrap();
        let err = q.enqueue(ev(1, Priority::High)).unwrap_err();
        assert!(matches!(
            err,
            BusError::QueueFull {
                priority: Priority::High,
                capacity: 1
            }
        ));
        assert_eq!(q.len(), 1);
        assert_eq!(q.dequeue().unwrap().event_type.id(), 0);
    }

    #[test]
    fn test_drain_order_across_priorities() {
        let mut set = QueueSet::new(4);
        set.enqueue(ev(0, Priority::Low)).unwrap();
        set.enqueue(ev(1, Priority::Normal)).unwrap();
        set.enqueue(ev(2, Priority::High)).unwrap();
        set.enqueue(ev(3, Priority::High)).unwrap();

        let drained: Vec<u32> = std::iter::from_fn(|| set.dequeue_highest())
            .map(|e| e.event_type.id())
            .collect();
        assert_eq!(drained, vec![2, 3, 1, 0]);
        assert!(set.is_empty());
    }

    #[test]
    fn test_clear_releases_payload_ownership() {
        let cell = Arc::new(17u32);
        let mut set = QueueSet::new(4);
        set.enqueue(
            ev(0, Priority::Normal).with_payload(Payload::shared(cell.clone())),
        )
        .unwrap();
        assert_eq!(Arc::strong_count(&cell), 2);

        set.clear();
        assert_eq!(Arc::strong_count(&cell), 1);
        assert_eq!(set.total_len(), 0);
    }
}
