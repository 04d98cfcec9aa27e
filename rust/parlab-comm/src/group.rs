//! Process groups: one OS thread per rank, joined all-or-nothing.
//!
//! [`ProcessGroup::spawn`] wires a full mesh, hands each rank its endpoint,
//! and runs the group body on one thread per rank. [`ProcessGroup::join`]
//! waits for every rank before reporting anything, so teardown is
//! synchronous; a panicking rank is surfaced as
//! [`CommError::RankPanicked`] after its siblings have finished.

use crate::error::CommError;
use crate::fabric::{full_mesh, Endpoint};
use crate::rank::Rank;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

// ---------------------------------------------------------------------------
// ProcessGroup
// ---------------------------------------------------------------------------

/// A running group of rank threads producing one `T` each.
pub struct ProcessGroup<T> {
    handles: Vec<(Rank, JoinHandle<T>)>,
}

impl<T> ProcessGroup<T>
where
    T: Send + 'static,
{
    /// Spawn `size` rank threads (at least one; zero is clamped), each
    /// running `body` with its own endpoint.
    ///
    /// Threads are named `rank-<n>`. The body is shared across ranks, so a
    /// single closure serves the whole group and branches on
    /// [`Endpoint::rank`].
    pub fn spawn<M, F>(size: usize, body: F) -> Self
    where
        M: Send + 'static,
        F: Fn(Endpoint<M>) -> T + Send + Sync + 'static,
    {
        let size = size.max(1);
        let body = Arc::new(body);

        let mut handles = Vec::with_capacity(size);
        for endpoint in full_mesh::<M>(size) {
            let rank = endpoint.rank();
            let body = Arc::clone(&body);
            let jh = thread::Builder::new()
                .name(format!("rank-{}", rank))
                .spawn(move || body(endpoint))
                .expect("failed to spawn rank thread");
            handles.push((rank, jh));
        }

        Self { handles }
    }

    /// Number of ranks in the group.
    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Join every rank thread and collect their results in rank order.
    ///
    /// All threads are joined even when one panics; the first panic (by
    /// rank) is then returned as [`CommError::RankPanicked`].
    pub fn join(self) -> Result<Vec<T>, CommError> {
        let mut results = Vec::with_capacity(self.handles.len());
        let mut first_panic: Option<CommError> = None;

        for (rank, jh) in self.handles {
            match jh.join() {
                Ok(value) => results.push(value),
                Err(panic) => {
                    if first_panic.is_none() {
                        let message = if let Some(s) = panic.downcast_ref::<&str>() {
                            s.to_string()
                        } else if let Some(s) = panic.downcast_ref::<String>() {
                            s.clone()
                        } else {
                            "unknown panic".to_string()
                        };
                        first_panic = Some(CommError::RankPanicked { rank, message });
                    }
                }
            }
        }

        match first_panic {
            Some(err) => Err(err),
            None => Ok(results),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
