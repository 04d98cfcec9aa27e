//! The device handle: a worker pool plus its default stream.

use crate::buffer::DeviceBuffer;
use crate::pool::WorkerPool;
use crate::stream::Stream;
use std::fmt;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Device
// ---------------------------------------------------------------------------

/// A simulated data-parallel accelerator.
///
/// Owns the worker pool kernel blocks run on and a default command stream.
/// Allocations are tied to the default stream so their copies order against
/// launches on it.
pub struct Device {
    // Declared before `pool` so the stream dispatcher is joined before the
    // pool shuts down.
    stream: Stream,
    pool: Arc<WorkerPool>,
}

impl Device {
    /// Create a device with `workers` pool threads (`0` means one per CPU).
    pub fn new(workers: usize) -> Self {
        let pool = Arc::new(WorkerPool::new(workers));
        let stream = Stream::new(Arc::clone(&pool));
        Self { stream, pool }
    }

    /// The device's default command stream.
    pub fn default_stream(&self) -> &Stream {
        &self.stream
    }

    /// Number of pool worker threads.
    pub fn worker_count(&self) -> usize {
        self.pool.worker_count()
    }

    /// Allocate a zero-initialized buffer of `len` elements on the default
    /// stream.
    pub fn alloc<T>(&self, len: usize) -> DeviceBuffer<T>
    where
        T: Default + Clone,
    {
        DeviceBuffer::new(len, self.stream.command_sender())
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("workers", &self.worker_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
