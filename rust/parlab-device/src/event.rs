//! Stream events: timestamp markers recorded in command order.
//!
//! An [`Event`] starts unrecorded. Placing it on a stream enqueues a record
//! command; when the dispatcher reaches that command, every command enqueued
//! before it has finished and the event is stamped with the current time.
//! Waiters blocked in [`Event::synchronize`] are woken at that point.

use crate::error::EventError;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

struct EventInner {
    /// Timestamp, `None` until the stream records the event.
    stamp: Mutex<Option<Instant>>,
    recorded: Condvar,
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A shareable stream timestamp marker.
///
/// Cloning an event clones the handle; all clones observe the same stamp.
#[derive(Clone)]
pub struct Event {
    inner: Arc<EventInner>,
}

impl Event {
    /// Create an unrecorded event.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(EventInner {
                stamp: Mutex::new(None),
                recorded: Condvar::new(),
            }),
        }
    }

    /// `true` once the event has been recorded on a stream.
    pub fn is_recorded(&self) -> bool {
        self.inner.stamp.lock().unwrap().is_some()
    }

    /// Block until the event has been recorded.
    pub fn synchronize(&self) {
        let mut stamp = self.inner.stamp.lock().unwrap();
        while stamp.is_none() {
            stamp = self.inner.recorded.wait(stamp).unwrap();
        }
    }

    /// Wall-clock time between `earlier` and `self`.
    ///
    /// Fails with [`EventError::NotRecorded`] if either event has not been
    /// recorded. A negative span (events recorded out of order) saturates
    /// to zero.
    pub fn elapsed_since(&self, earlier: &Event) -> Result<Duration, EventError> {
        let start = earlier
            .inner
            .stamp
            .lock()
            .unwrap()
            .ok_or(EventError::NotRecorded)?;
        let end = self
            .inner
            .stamp
            .lock()
            .unwrap()
            .ok_or(EventError::NotRecorded)?;
        Ok(end.saturating_duration_since(start))
    }

    /// Stamp the event with the current time and wake waiters.
    ///
    /// Called by the stream dispatcher when it reaches the record command.
    pub(crate) fn stamp_now(&self) {
        let mut stamp = self.inner.stamp.lock().unwrap();
        *stamp = Some(Instant::now());
        self.inner.recorded.notify_all();
    }
}

impl Default for Event {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("recorded", &self.is_recorded())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
