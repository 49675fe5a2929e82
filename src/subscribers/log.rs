//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//!
//! ## Output format
//! ```text
//! [event] type=3 priority=High mode=Async bytes=7
//! [event] type=5 priority=Normal mode=Sync
//! [event] type=5 priority=Low mode=Async payload=shared
//! ```

use async_trait::async_trait;

use crate::events::{Event, Payload};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Subscribe it to the event types you
/// want traced. Not intended for production use — implement a custom
/// [`Subscribe`] for structured logging or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        match &e.payload {
            Payload::None => {
                println!(
                    "[event] type={} priority={:?} mode={:?}",
                    e.event_type, e.priority, e.mode
                );
            }
            Payload::Owned(bytes) => {
                println!(
                    "[event] type={} priority={:?} mode={:?} bytes={}",
                    e.event_type,
                    e.priority,
                    e.mode,
                    bytes.len()
                );
            }
            Payload::Shared(_) => {
                println!(
                    "[event] type={} priority={:?} mode={:?} payload=shared",
                    e.event_type, e.priority, e.mode
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
