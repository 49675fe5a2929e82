//! # Bus capacity configuration.
//!
//! [`BusConfig`] fixes every bound at construction time, the way an embedded
//! build would pin them with compile-time switches. Nothing grows afterwards:
//! the subscription table and the async queues are allocated up front.
//!
//! ## Field semantics
//! - `max_event_types`: number of valid event type ids, `[0, max_event_types)`
//! - `max_subscribers`: subscriber slots per event type
//! - `queue_capacity`: pending-event slots per priority queue (three queues)
//!
//! All bounds are clamped to a minimum of 1 when the bus is built.

/// Capacity bounds for an [`EventBus`](crate::EventBus).
///
/// All fields are public; construct with struct update syntax over
/// [`BusConfig::default`] to override a single bound.
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Number of distinct event types the bus accepts.
    pub max_event_types: usize,

    /// Maximum subscribers per event type.
    ///
    /// Subscribing past this limit fails with
    /// [`CapacityExceeded`](crate::BusError::CapacityExceeded).
    pub max_subscribers: usize,

    /// Capacity of each per-priority async queue.
    ///
    /// Publishing async past this limit fails with
    /// [`QueueFull`](crate::BusError::QueueFull); there is no backpressure
    /// wait.
    pub queue_capacity: usize,
}

impl BusConfig {
    /// `max_event_types` clamped to a minimum of 1.
    #[inline]
    pub fn max_event_types_clamped(&self) -> usize {
        self.max_event_types.max(1)
    }

    /// `max_subscribers` clamped to a minimum of 1.
    #[inline]
    pub fn max_subscribers_clamped(&self) -> usize {
        self.max_subscribers.max(1)
    }

    /// `queue_capacity` clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }
}

impl Default for BusConfig {
    /// Default bounds sized for small embedded deployments:
    ///
    /// - `max_event_types = 64`
    /// - `max_subscribers = 16` (per type)
    /// - `queue_capacity = 32` (per priority)
    fn default() -> Self {
        Self {
            max_event_types: 64,
            max_subscribers: 16,
            queue_capacity: 32,
        }
    }
}
