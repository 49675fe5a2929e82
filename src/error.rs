//! Error types for the event bus.
//!
//! Every fallible bus operation returns a [`BusError`]. Capacity conditions
//! ([`BusError::QueueFull`], [`BusError::CapacityExceeded`]) are recoverable:
//! the bus never blocks waiting for space, so the caller decides whether to
//! retry, drop, or back off — see [`BusError::is_capacity`].

use thiserror::Error;

use crate::events::Priority;

/// # Errors produced by bus operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum BusError {
    /// Event type id outside the configured `[0, max_event_types)` range.
    #[error("event type {id} out of range (limit {limit})")]
    InvalidEventType {
        /// The rejected id.
        id: u32,
        /// Configured number of event types.
        limit: usize,
    },

    /// The subscription list for this event type is full.
    #[error("subscriber limit {limit} reached for event type {id}")]
    CapacityExceeded {
        /// Event type whose list is full.
        id: u32,
        /// Configured per-type subscriber limit.
        limit: usize,
    },

    /// No subscription matched the given handler on unsubscribe.
    #[error("no such subscription for event type {id}")]
    NotFound {
        /// Event type that was searched.
        id: u32,
    },

    /// The async queue for this priority is at capacity.
    #[error("async queue for priority {priority:?} is full (capacity {capacity})")]
    QueueFull {
        /// Priority level of the rejected event.
        priority: Priority,
        /// Per-priority queue capacity.
        capacity: usize,
    },

    /// All async queues are empty (nothing to process).
    #[error("async queues are empty")]
    QueueEmpty,

    /// Allocating the payload snapshot failed; nothing was queued.
    #[error("payload copy of {size} bytes failed to allocate")]
    OutOfMemory {
        /// Requested snapshot size in bytes.
        size: usize,
    },

    /// The state mutex was poisoned by a panicking holder.
    #[error("bus state mutex poisoned")]
    Synchronization,
}

impl BusError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use evbus::BusError;
    ///
    /// let err = BusError::QueueEmpty;
    /// assert_eq!(err.as_label(), "queue_empty");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            BusError::InvalidEventType { .. } => "invalid_event_type",
            BusError::CapacityExceeded { .. } => "capacity_exceeded",
            BusError::NotFound { .. } => "not_found",
            BusError::QueueFull { .. } => "queue_full",
            BusError::QueueEmpty => "queue_empty",
            BusError::OutOfMemory { .. } => "out_of_memory",
            BusError::Synchronization => "synchronization",
        }
    }

    /// True for recoverable capacity conditions the caller should inspect and
    /// handle (retry, drop, or back off).
    ///
    /// # Example
    /// ```
    /// use evbus::{BusError, Priority};
    ///
    /// let full = BusError::QueueFull { priority: Priority::Low, capacity: 32 };
    /// assert!(full.is_capacity());
    /// assert!(!BusError::QueueEmpty.is_capacity());
    /// ```
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            BusError::QueueFull { .. } | BusError::CapacityExceeded { .. }
        )
    }
}
