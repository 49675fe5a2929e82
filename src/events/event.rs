//! # Event data model: types, priorities, payloads.
//!
//! An [`Event`] is what flows through the bus: a bounded [`EventType`] key, an
//! optional [`Payload`], a [`Priority`] used for async queue ordering, and a
//! [`DeliveryMode`] that routes the generic [`publish`](crate::EventBus::publish)
//! entry point.
//!
//! ## Payload ownership
//! - [`Payload::Owned`] is a byte snapshot taken at publish time; mutating the
//!   source buffer afterwards is invisible to subscribers.
//! - [`Payload::Shared`] carries the caller's `Arc` with no copy; the caller is
//!   responsible for keeping the value meaningful until dispatch, and mutation
//!   through interior mutability **is** visible to subscribers.
//!
//! ## Example
//! ```rust
//! use evbus::{Event, EventType, Priority, DeliveryMode, Payload};
//!
//! let ev = Event::new(EventType::new(3))
//!     .with_payload(Payload::copy_from(b"temp=21").unwrap())
//!     .with_priority(Priority::High)
//!     .with_mode(DeliveryMode::Async);
//!
//! assert_eq!(ev.event_type, EventType::new(3));
//! assert_eq!(ev.payload.as_bytes(), Some(&b"temp=21"[..]));
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::BusError;

/// Dense bounded event type key.
///
/// Valid ids live in `[0, max_event_types)`; the bus rejects anything outside
/// that range with [`BusError::InvalidEventType`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventType(u32);

impl EventType {
    /// Creates an event type key. Range validation happens at the bus boundary.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw id.
    #[inline]
    pub const fn id(self) -> u32 {
        self.0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Priority for both subscriber execution order and async queue drain order.
///
/// Lower discriminant means higher urgency: subscribers run in ascending
/// priority order, and async queues drain strictly `High → Normal → Low`
/// (see [`Priority::DRAIN_ORDER`]). Sustained high-priority traffic can starve
/// lower priorities; the bus does not mitigate that.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Processed first.
    High = 0,
    /// Default.
    #[default]
    Normal = 1,
    /// Processed last.
    Low = 2,
}

impl Priority {
    /// Number of priority levels (and of async queues).
    pub const COUNT: usize = 3;

    /// Cross-queue drain order, pinned explicitly rather than derived from the
    /// raw discriminants, so reordering the enum cannot silently change it.
    pub const DRAIN_ORDER: [Priority; Priority::COUNT] =
        [Priority::High, Priority::Normal, Priority::Low];

    /// Dense index into per-priority storage.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// How a published event is delivered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Run matching subscribers on the caller's task before returning.
    #[default]
    Sync,
    /// Queue the event for a later drain (`process_*` or the event loop).
    Async,
}

/// Event payload with explicit ownership semantics.
#[derive(Clone, Default)]
pub enum Payload {
    /// No data attached.
    #[default]
    None,
    /// Byte snapshot owned by the event (copied at publish time).
    Owned(Arc<[u8]>),
    /// Caller-managed value, zero copy. Subscribers downcast to read it.
    Shared(Arc<dyn Any + Send + Sync>),
}

impl Payload {
    /// Snapshots `bytes` into an owned payload.
    ///
    /// Allocation goes through `try_reserve`, so a failed copy reports
    /// [`BusError::OutOfMemory`] instead of aborting, and nothing else changes.
    pub fn copy_from(bytes: &[u8]) -> Result<Self, BusError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(bytes.len())
            .map_err(|_| BusError::OutOfMemory { size: bytes.len() })?;
        buf.extend_from_slice(bytes);
        Ok(Payload::Owned(buf.into()))
    }

    /// Wraps a caller-managed value without copying.
    pub fn shared<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Payload::Shared(value)
    }

    /// Returns the owned byte snapshot, if this payload is one.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Owned(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Downcasts a shared payload to a concrete type.
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        match self {
            Payload::Shared(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// True when no data is attached.
    pub fn is_none(&self) -> bool {
        matches!(self, Payload::None)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::None => f.write_str("None"),
            Payload::Owned(bytes) => write!(f, "Owned({} bytes)", bytes.len()),
            Payload::Shared(_) => f.write_str("Shared(..)"),
        }
    }
}

/// A published event.
///
/// Built with [`Event::new`] plus `with_*` setters; the generic
/// [`publish`](crate::EventBus::publish) entry point routes on [`Event::mode`].
#[derive(Clone, Debug)]
pub struct Event {
    /// Event type key.
    pub event_type: EventType,
    /// Attached data.
    pub payload: Payload,
    /// Async queue ordering; ignored for sync delivery.
    pub priority: Priority,
    /// Sync vs async routing for [`publish`](crate::EventBus::publish).
    pub mode: DeliveryMode,
}

impl Event {
    /// Creates an event with no payload, [`Priority::Normal`], [`DeliveryMode::Sync`].
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            payload: Payload::None,
            priority: Priority::Normal,
            mode: DeliveryMode::Sync,
        }
    }

    /// Attaches a payload.
    #[inline]
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Sets the async queue priority.
    #[inline]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the delivery mode.
    #[inline]
    pub fn with_mode(mut self, mode: DeliveryMode) -> Self {
        self.mode = mode;
        self
    }
}
