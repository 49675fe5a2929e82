//! # EventBus: the publish/subscribe facade.
//!
//! [`EventBus`] composes the subscription table, the per-priority async
//! queues, the statistics counters, and the drain-loop state behind a single
//! mutex. The mutex is a plain [`std::sync::Mutex`]: every critical section
//! is bounded (proportional to the subscriber limit or queue capacity) and
//! the guard is **never held across an await**.
//!
//! ## Locking protocol
//! ```text
//! publish_sync ──► lock: count++          ──► dispatch (snapshot, see below)
//! publish_async ─► lock: enqueue + stats  ──► signal drain loop
//! dispatch ──────► lock: sort, snapshot   ──► unlock ──► await handlers
//! ```
//! Handlers always run with the lock released, so they can re-enter the bus
//! (publish, subscribe, unsubscribe, drain) without deadlocking, and a
//! handler that mutates the subscription list cannot corrupt an in-flight
//! dispatch — the dispatch iterates its own snapshot.
//!
//! ## Shutdown
//! [`EventBus::shutdown`] stops the loop, wakes it if blocked, and clears all
//! queues (releasing pending payload copies). The bus stays usable afterwards;
//! remaining memory is released by `Drop` through plain ownership.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::BusConfig;
use crate::core::builder::BusBuilder;
use crate::core::signal::{NotifySignal, WaitStrategy};
use crate::core::stats::BusStats;
use crate::error::BusError;
use crate::events::{DeliveryMode, Event, EventType, Payload, Priority, QueueSet};
use crate::subscribers::{Subscribe, SubscriberTable};

/// All mutable bus state, guarded by the one mutex.
pub(crate) struct BusState {
    pub(crate) table: SubscriberTable,
    pub(crate) queues: QueueSet,
    pub(crate) stats: BusStats,
    pub(crate) running: bool,
}

/// Thread-safe publish/subscribe event dispatcher with bounded capacities.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct EventBus {
    pub(crate) state: Mutex<BusState>,
    pub(crate) signal: Arc<dyn WaitStrategy>,
}

impl EventBus {
    /// Creates a bus with the default [`NotifySignal`] wait strategy.
    ///
    /// All bounded structures are allocated up front; capacities of 0 are
    /// clamped to 1.
    pub fn new(cfg: BusConfig) -> Self {
        Self::with_signal(cfg, Arc::new(NotifySignal::new()))
    }

    /// Starts a [`BusBuilder`] for a bus with a custom wait strategy.
    pub fn builder(cfg: BusConfig) -> BusBuilder {
        BusBuilder::new(cfg)
    }

    pub(crate) fn with_signal(cfg: BusConfig, signal: Arc<dyn WaitStrategy>) -> Self {
        Self {
            state: Mutex::new(BusState {
                table: SubscriberTable::new(&cfg),
                queues: QueueSet::new(cfg.queue_capacity_clamped()),
                stats: BusStats::default(),
                running: false,
            }),
            signal,
        }
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, BusState>, BusError> {
        self.state.lock().map_err(|_| BusError::Synchronization)
    }

    // ---------------------------
    // Subscription management
    // ---------------------------

    /// Registers `handler` for `event_type` with the given priority.
    ///
    /// Re-subscribing the same handler (same allocation) is a no-op success
    /// and keeps the originally stored priority.
    pub fn subscribe(
        &self,
        event_type: EventType,
        handler: Arc<dyn Subscribe>,
        priority: Priority,
    ) -> Result<(), BusError> {
        let mut state = self.lock()?;
        if state.table.subscribe(event_type, handler, priority)? {
            state.stats.subscribers += 1;
        }
        Ok(())
    }

    /// Removes the subscription matching `handler` by reference.
    pub fn unsubscribe(
        &self,
        event_type: EventType,
        handler: &dyn Subscribe,
    ) -> Result<(), BusError> {
        let mut state = self.lock()?;
        state.table.unsubscribe(event_type, handler)?;
        state.stats.subscribers = state.stats.subscribers.saturating_sub(1);
        Ok(())
    }

    /// Removes every subscription for `event_type`; returns how many.
    pub fn unsubscribe_all(&self, event_type: EventType) -> Result<usize, BusError> {
        let mut state = self.lock()?;
        let removed = state.table.unsubscribe_all(event_type)?;
        state.stats.subscribers = state.stats.subscribers.saturating_sub(removed);
        Ok(removed)
    }

    /// Number of live subscriptions for `event_type`.
    pub fn subscriber_count(&self, event_type: EventType) -> Result<usize, BusError> {
        self.lock()?.table.count(event_type)
    }

    /// True when `event_type` has at least one subscriber.
    pub fn has_subscribers(&self, event_type: EventType) -> Result<bool, BusError> {
        Ok(self.subscriber_count(event_type)? > 0)
    }

    // ---------------------------
    // Publishing
    // ---------------------------

    /// Publishes an event synchronously: every matching subscriber runs on
    /// the caller's task, in priority order, before this returns.
    ///
    /// Succeeds even with zero subscribers (the event is counted and gone).
    pub async fn publish_sync(
        &self,
        event_type: EventType,
        payload: Payload,
    ) -> Result<(), BusError> {
        {
            let mut state = self.lock()?;
            state.table.validate(event_type)?;
            state.stats.events_published += 1;
        }
        let event = Event::new(event_type).with_payload(payload);
        self.dispatch(&event).await
    }

    /// Queues an event for deferred delivery and signals the drain loop.
    ///
    /// The payload is carried as given: [`Payload::Shared`] stays zero-copy
    /// (caller keeps the value alive until dispatch; mutation is visible),
    /// [`Payload::Owned`] is already a snapshot. A full queue fails with
    /// [`BusError::QueueFull`] and leaves every queue exactly as before.
    pub fn publish_async(
        &self,
        event_type: EventType,
        payload: Payload,
        priority: Priority,
    ) -> Result<(), BusError> {
        {
            let mut state = self.lock()?;
            state.table.validate(event_type)?;

            let event = Event::new(event_type)
                .with_payload(payload)
                .with_priority(priority)
                .with_mode(DeliveryMode::Async);
            state.queues.enqueue(event)?;

            state.stats.events_published += 1;
            let depth = state.queues.total_len();
            state.stats.record_depth(depth);
        }
        self.signal.signal();
        Ok(())
    }

    /// Queues a byte snapshot of `bytes` for deferred delivery.
    ///
    /// The copy happens before the queue is touched, so a failed allocation
    /// ([`BusError::OutOfMemory`]) changes nothing; mutating `bytes` after
    /// this returns is invisible to subscribers.
    pub fn publish_async_copy(
        &self,
        event_type: EventType,
        bytes: &[u8],
        priority: Priority,
    ) -> Result<(), BusError> {
        self.lock()?.table.validate(event_type)?;
        let payload = Payload::copy_from(bytes)?;
        self.publish_async(event_type, payload, priority)
    }

    /// Publishes a pre-built [`Event`], routing on its [`DeliveryMode`].
    pub async fn publish(&self, event: Event) -> Result<(), BusError> {
        match event.mode {
            DeliveryMode::Sync => self.publish_sync(event.event_type, event.payload).await,
            DeliveryMode::Async => {
                self.publish_async(event.event_type, event.payload, event.priority)
            }
        }
    }

    // ---------------------------
    // Introspection & maintenance
    // ---------------------------

    /// Total pending events across all three async queues.
    pub fn queue_size(&self) -> Result<usize, BusError> {
        Ok(self.lock()?.queues.total_len())
    }

    /// Empties all async queues, releasing every pending payload.
    pub fn clear_queue(&self) -> Result<(), BusError> {
        let mut state = self.lock()?;
        state.queues.clear();
        state.stats.queue_depth = 0;
        Ok(())
    }

    /// Atomic snapshot of the statistics counters.
    pub fn get_stats(&self) -> Result<BusStats, BusError> {
        Ok(self.lock()?.stats)
    }

    /// Zeroes the cumulative counters; subscriber count and current queue
    /// depth are preserved.
    pub fn reset_stats(&self) -> Result<(), BusError> {
        self.lock()?.stats.reset();
        Ok(())
    }

    /// True while the event loop is running.
    pub fn is_running(&self) -> Result<bool, BusError> {
        Ok(self.lock()?.running)
    }

    /// Stops the event loop, wakes it if blocked, and drops all queued
    /// events. Idempotent; the bus remains usable (stopped and empty).
    pub fn shutdown(&self) -> Result<(), BusError> {
        {
            let mut state = self.lock()?;
            state.running = false;
            state.queues.clear();
            state.stats.queue_depth = 0;
        }
        self.signal.signal();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex as StdMutex;

    const TY: EventType = EventType::new(1);

    struct Recorder {
        tag: &'static str,
        log: Arc<StdMutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_event(&self, _event: &Event) {
            self.log.lock().unwrap().push(self.tag);
        }
    }

    fn recorder(tag: &'static str, log: &Arc<StdMutex<Vec<&'static str>>>) -> Arc<Recorder> {
        Arc::new(Recorder {
            tag,
            log: log.clone(),
        })
    }

    #[tokio::test]
    async fn test_sync_dispatch_runs_in_priority_order() {
        let bus = EventBus::new(BusConfig::default());
        let log = Arc::new(StdMutex::new(Vec::new()));

        // Registered [Low, High, Normal]; must run [High, Normal, Low].
        bus.subscribe(TY, recorder("low", &log), Priority::Low).unwrap();
        bus.subscribe(TY, recorder("high", &log), Priority::High).unwrap();
        bus.subscribe(TY, recorder("normal", &log), Priority::Normal).unwrap();

        bus.publish_sync(TY, Payload::None).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["high", "normal", "low"]);
    }

    #[tokio::test]
    async fn test_duplicate_subscribe_counts_once() {
        let bus = EventBus::new(BusConfig::default());
        let log = Arc::new(StdMutex::new(Vec::new()));
        let sub = recorder("a", &log);

        bus.subscribe(TY, sub.clone(), Priority::Normal).unwrap();
        bus.subscribe(TY, sub.clone(), Priority::Normal).unwrap();
        assert_eq!(bus.subscriber_count(TY).unwrap(), 1);
        assert_eq!(bus.get_stats().unwrap().subscribers, 1);

        bus.publish_sync(TY, Payload::None).await.unwrap();
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resubscribe_does_not_update_priority() {
        let bus = EventBus::new(BusConfig::default());
        let log = Arc::new(StdMutex::new(Vec::new()));
        let a = recorder("a", &log);

        bus.subscribe(TY, a.clone(), Priority::Low).unwrap();
        bus.subscribe(TY, recorder("b", &log), Priority::Normal).unwrap();
        // Attempted upgrade to High is silently ignored.
        bus.subscribe(TY, a.clone(), Priority::High).unwrap();

        bus.publish_sync(TY, Payload::None).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["b", "a"]);
    }

    #[tokio::test]
    async fn test_async_copied_payload_is_snapshot() {
        let bus = EventBus::new(BusConfig::default());
        let seen = Arc::new(StdMutex::new(Vec::new()));

        struct CaptureBytes(Arc<StdMutex<Vec<Vec<u8>>>>);
        #[async_trait]
        impl Subscribe for CaptureBytes {
            async fn on_event(&self, event: &Event) {
                if let Some(bytes) = event.payload.as_bytes() {
                    self.0.lock().unwrap().push(bytes.to_vec());
                }
            }
        }

        bus.subscribe(TY, Arc::new(CaptureBytes(seen.clone())), Priority::Normal)
            .unwrap();

        let mut buf = vec![1u8, 2, 3];
        bus.publish_async_copy(TY, &buf, Priority::Normal).unwrap();
        buf[0] = 9;
        bus.process_all().await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![vec![1u8, 2, 3]]);
    }

    #[tokio::test]
    async fn test_async_shared_payload_sees_mutation() {
        let bus = EventBus::new(BusConfig::default());
        let observed = Arc::new(AtomicU32::new(0));

        struct CaptureCell(Arc<AtomicU32>);
        #[async_trait]
        impl Subscribe for CaptureCell {
            async fn on_event(&self, event: &Event) {
                if let Some(cell) = event.payload.downcast_ref::<AtomicU32>() {
                    self.0.store(cell.load(Ordering::SeqCst), Ordering::SeqCst);
                }
            }
        }

        bus.subscribe(TY, Arc::new(CaptureCell(observed.clone())), Priority::Normal)
            .unwrap();

        let cell = Arc::new(AtomicU32::new(1));
        bus.publish_async(TY, Payload::shared(cell.clone()), Priority::Normal)
            .unwrap();
        cell.store(2, Ordering::SeqCst);
        bus.process_all().await.unwrap();

        assert_eq!(observed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_queue_full_leaves_state_unchanged() {
        let bus = EventBus::new(BusConfig {
            queue_capacity: 2,
            ..BusConfig::default()
        });

        bus.publish_async(TY, Payload::None, Priority::Normal).unwrap();
        bus.publish_async(TY, Payload::None, Priority::Normal).unwrap();
        let err = bus
            .publish_async(TY, Payload::None, Priority::Normal)
            .unwrap_err();
        assert!(matches!(err, BusError::QueueFull { capacity: 2, .. }));
        assert!(err.is_capacity());

        assert_eq!(bus.queue_size().unwrap(), 2);
        let stats = bus.get_stats().unwrap();
        assert_eq!(stats.events_published, 2);
        assert_eq!(stats.queue_depth, 2);
    }

    #[tokio::test]
    async fn test_clear_queue_releases_payloads() {
        let bus = EventBus::new(BusConfig::default());
        let cell = Arc::new(7u32);

        bus.publish_async(TY, Payload::shared(cell.clone()), Priority::High)
            .unwrap();
        bus.publish_async(TY, Payload::shared(cell.clone()), Priority::Low)
            .unwrap();
        assert_eq!(Arc::strong_count(&cell), 3);

        bus.clear_queue().unwrap();
        assert_eq!(Arc::strong_count(&cell), 1);
        assert_eq!(bus.queue_size().unwrap(), 0);
        assert_eq!(bus.get_stats().unwrap().queue_depth, 0);
    }

    #[tokio::test]
    async fn test_stats_reset_preserves_gauges() {
        let bus = EventBus::new(BusConfig::default());
        let log = Arc::new(StdMutex::new(Vec::new()));
        bus.subscribe(TY, recorder("a", &log), Priority::Normal).unwrap();

        bus.publish_sync(TY, Payload::None).await.unwrap();
        bus.publish_async(TY, Payload::None, Priority::Normal).unwrap();

        let before = bus.get_stats().unwrap();
        assert_eq!(before.events_published, 2);
        assert_eq!(before.events_processed, 1);
        assert_eq!(before.queue_peak, 1);

        bus.reset_stats().unwrap();
        let after = bus.get_stats().unwrap();
        assert_eq!(after.events_published, 0);
        assert_eq!(after.events_processed, 0);
        assert_eq!(after.queue_peak, 0);
        assert_eq!(after.subscribers, 1);
        assert_eq!(after.queue_depth, 1);
    }

    #[tokio::test]
    async fn test_subscription_added_mid_dispatch_is_invisible() {
        let bus = Arc::new(EventBus::new(BusConfig::default()));
        let log = Arc::new(StdMutex::new(Vec::new()));

        struct AddOther {
            bus: Arc<EventBus>,
            extra: Arc<Recorder>,
        }
        #[async_trait]
        impl Subscribe for AddOther {
            async fn on_event(&self, event: &Event) {
                self.bus
                    .subscribe(event.event_type, self.extra.clone(), Priority::High)
                    .unwrap();
            }
        }

        let extra = recorder("late", &log);
        bus.subscribe(
            TY,
            Arc::new(AddOther {
                bus: bus.clone(),
                extra,
            }),
            Priority::Normal,
        )
        .unwrap();

        bus.publish_sync(TY, Payload::None).await.unwrap();
        assert!(log.lock().unwrap().is_empty(), "not in current snapshot");

        bus.publish_sync(TY, Payload::None).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["late"]);
    }

    #[tokio::test]
    async fn test_unsubscribed_mid_dispatch_still_invoked_once() {
        let bus = Arc::new(EventBus::new(BusConfig::default()));
        let log = Arc::new(StdMutex::new(Vec::new()));

        struct RemoveOther {
            bus: Arc<EventBus>,
            victim: Arc<Recorder>,
        }
        #[async_trait]
        impl Subscribe for RemoveOther {
            async fn on_event(&self, event: &Event) {
                self.bus
                    .unsubscribe(event.event_type, self.victim.as_ref())
                    .unwrap();
            }
        }

        let victim = recorder("victim", &log);
        bus.subscribe(TY, victim.clone(), Priority::Low).unwrap();
        bus.subscribe(
            TY,
            Arc::new(RemoveOther {
                bus: bus.clone(),
                victim,
            }),
            Priority::High,
        )
        .unwrap();

        bus.publish_sync(TY, Payload::None).await.unwrap();
        // Already snapshotted, so the victim still ran this one time.
        assert_eq!(*log.lock().unwrap(), vec!["victim"]);
        assert_eq!(bus.subscriber_count(TY).unwrap(), 1);

        bus.publish_sync(TY, Payload::None).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["victim"]);
    }

    #[tokio::test]
    async fn test_panicking_handler_does_not_sink_snapshot() {
        let bus = EventBus::new(BusConfig::default());
        let log = Arc::new(StdMutex::new(Vec::new()));

        struct Panicker;
        #[async_trait]
        impl Subscribe for Panicker {
            async fn on_event(&self, _event: &Event) {
                panic!("boom");
            }
        }

        bus.subscribe(TY, Arc::new(Panicker), Priority::High).unwrap();
        bus.subscribe(TY, recorder("after", &log), Priority::Low).unwrap();

        bus.publish_sync(TY, Payload::None).await.unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["after"]);
    }

    #[tokio::test]
    async fn test_publish_routes_on_mode() {
        let bus = EventBus::new(BusConfig::default());
        let log = Arc::new(StdMutex::new(Vec::new()));
        bus.subscribe(TY, recorder("a", &log), Priority::Normal).unwrap();

        bus.publish(Event::new(TY).with_mode(DeliveryMode::Async))
            .await
            .unwrap();
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(bus.queue_size().unwrap(), 1);

        bus.publish(Event::new(TY)).await.unwrap();
        assert_eq!(log.lock().unwrap().len(), 1);

        bus.process_all().await.unwrap();
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_event_type_is_rejected_everywhere() {
        let bus = EventBus::new(BusConfig::default());
        let over = EventType::new(64);
        let log = Arc::new(StdMutex::new(Vec::new()));

        let sub = recorder("a", &log);
        assert!(matches!(
            bus.subscribe(over, sub, Priority::Normal).unwrap_err(),
            BusError::InvalidEventType { id: 64, limit: 64 }
        ));
        assert!(bus.publish_sync(over, Payload::None).await.is_err());
        assert!(bus
            .publish_async(over, Payload::None, Priority::Normal)
            .is_err());
        assert!(bus.publish_async_copy(over, b"x", Priority::Normal).is_err());
        assert_eq!(bus.get_stats().unwrap().events_published, 0);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent_and_clears_queues() {
        let bus = EventBus::new(BusConfig::default());
        bus.publish_async(TY, Payload::None, Priority::Normal).unwrap();

        bus.shutdown().unwrap();
        assert_eq!(bus.queue_size().unwrap(), 0);
        assert!(!bus.is_running().unwrap());
        bus.shutdown().unwrap();
    }
}
