//! Device-side buffers.
//!
//! A [`DeviceBuffer`] models memory that host code cannot touch directly:
//! data moves in and out only through explicit copies, and the copies ride
//! the owning stream's command queue so they order against kernel launches.
//! The backing store is shared with the stream's block jobs through a
//! reader-writer lock.

use crate::error::DeviceError;
use crate::stream::Command;
use crossbeam_channel::{bounded, Sender};
use std::fmt;
use std::sync::{Arc, RwLock};

// ---------------------------------------------------------------------------
// DeviceBuffer
// ---------------------------------------------------------------------------

/// A fixed-length device allocation of `T`.
pub struct DeviceBuffer<T> {
    storage: Arc<RwLock<Vec<T>>>,
    len: usize,
    queue: Sender<Command>,
}

impl<T> DeviceBuffer<T>
where
    T: Default + Clone,
{
    /// Allocate `len` zero-initialized elements on the stream behind
    /// `queue`.
    pub(crate) fn new(len: usize, queue: Sender<Command>) -> Self {
        Self {
            storage: Arc::new(RwLock::new(vec![T::default(); len])),
            len,
            queue,
        }
    }
}

impl<T> DeviceBuffer<T> {
    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` when the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Shared handle to the backing store, for launch block jobs.
    pub(crate) fn storage(&self) -> Arc<RwLock<Vec<T>>> {
        Arc::clone(&self.storage)
    }
}

impl<T> DeviceBuffer<T>
where
    T: Copy + Send + Sync + 'static,
{
    /// Copy `src` into the buffer.
    ///
    /// The copy is enqueued on the owning stream and this call blocks until
    /// it has run, so the buffer holds the data when the call returns.
    pub fn copy_from_host(&self, src: &[T]) -> Result<(), DeviceError> {
        if src.len() != self.len {
            return Err(DeviceError::CopyLength {
                expected: self.len,
                got: src.len(),
            });
        }

        let storage = Arc::clone(&self.storage);
        let data = src.to_vec();
        let (ack_tx, ack_rx) = bounded(1);
        self.queue
            .send(Command::Copy(Box::new(move || {
                storage.write().unwrap().copy_from_slice(&data);
                let _ = ack_tx.send(());
            })))
            .map_err(|_| DeviceError::StreamShutDown)?;
        ack_rx.recv().map_err(|_| DeviceError::StreamShutDown)
    }

    /// Copy the buffer into `dst`.
    ///
    /// Blocks until every command enqueued before this copy has finished,
    /// so the data read back reflects prior launches.
    pub fn copy_to_host(&self, dst: &mut [T]) -> Result<(), DeviceError> {
        if dst.len() != self.len {
            return Err(DeviceError::CopyLength {
                expected: self.len,
                got: dst.len(),
            });
        }

        let storage = Arc::clone(&self.storage);
        let (ack_tx, ack_rx) = bounded::<Vec<T>>(1);
        self.queue
            .send(Command::Copy(Box::new(move || {
                let snapshot = storage.read().unwrap().clone();
                let _ = ack_tx.send(snapshot);
            })))
            .map_err(|_| DeviceError::StreamShutDown)?;
        let snapshot = ack_rx.recv().map_err(|_| DeviceError::StreamShutDown)?;
        dst.copy_from_slice(&snapshot);
        Ok(())
    }
}

impl<T> fmt::Debug for DeviceBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBuffer")
            .field("len", &self.len)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
