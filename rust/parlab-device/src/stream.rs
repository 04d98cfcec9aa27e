//! Command streams: ordered execution queues for the simulated device.
//!
//! A [`Stream`] owns a dispatcher thread that drains a command channel in
//! FIFO order. Kernel launches, buffer copies, and event records are all
//! enqueued as commands, so everything placed on one stream executes in
//! submission order. The host side returns as soon as a launch is enqueued;
//! ordering against later commands is what makes event timing meaningful.
//!
//! A launch command fans its grid blocks out over the shared worker pool
//! and waits for every block before the dispatcher moves on, so the next
//! command in the queue observes the kernel's writes.

use crate::buffer::DeviceBuffer;
use crate::error::DeviceError;
use crate::event::Event;
use crate::grid::Grid;
use crate::pool::WorkerPool;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::fmt;
use std::sync::Arc;
use std::thread;

/// An element-wise kernel: maps a flat output index plus the two input
/// buffers to one output value.
pub type Kernel<T> = Arc<dyn Fn(usize, &[T], &[T]) -> T + Send + Sync>;

/// A command in a stream's queue.
pub(crate) enum Command {
    /// Run a kernel launch against the worker pool.
    Launch(Box<dyn FnOnce(&WorkerPool) + Send>),
    /// Run a host<->device copy.
    Copy(Box<dyn FnOnce() + Send>),
    /// Stamp an event.
    Record(Event),
    /// Acknowledge that every earlier command has finished.
    Sync(Sender<()>),
    /// Stop the dispatcher.
    Shutdown,
}

// ---------------------------------------------------------------------------
// Stream
// ---------------------------------------------------------------------------

/// An ordered command queue with a dedicated dispatcher thread.
pub struct Stream {
    sender: Sender<Command>,
    dispatcher: Option<thread::JoinHandle<()>>,
}

impl Stream {
    /// Create a stream dispatching onto `pool`.
    pub(crate) fn new(pool: Arc<WorkerPool>) -> Self {
        let (sender, receiver): (Sender<Command>, Receiver<Command>) = unbounded();

        let dispatcher = thread::Builder::new()
            .name("device-stream".to_string())
            .spawn(move || {
                while let Ok(cmd) = receiver.recv() {
                    match cmd {
                        Command::Launch(job) => job(&pool),
                        Command::Copy(job) => job(),
                        Command::Record(event) => event.stamp_now(),
                        Command::Sync(ack) => {
                            let _ = ack.send(());
                        }
                        Command::Shutdown => break,
                    }
                }
            })
            .expect("failed to spawn device stream thread");

        Self {
            sender,
            dispatcher: Some(dispatcher),
        }
    }

    /// Enqueue a kernel launch over `grid`, reading `a` and `b` and writing
    /// `out`. Returns once the launch is queued, not once it has run.
    ///
    /// Fails with [`DeviceError::LaunchOutOfBounds`] when the grid covers
    /// more elements than `out` holds.
    pub fn launch<T>(
        &self,
        kernel: Kernel<T>,
        grid: Grid,
        a: &DeviceBuffer<T>,
        b: &DeviceBuffer<T>,
        out: &DeviceBuffer<T>,
    ) -> Result<(), DeviceError>
    where
        T: Copy + Send + Sync + 'static,
    {
        if grid.elements() > out.len() {
            return Err(DeviceError::LaunchOutOfBounds {
                elements: grid.elements(),
                len: out.len(),
            });
        }

        let a_storage = a.storage();
        let b_storage = b.storage();
        let out_storage = out.storage();
        let blocks: Vec<_> = grid.blocks().collect();
        let block_count = blocks.len();

        let job = move |pool: &WorkerPool| {
            let (done_tx, done_rx) = unbounded::<()>();
            for range in blocks {
                let kernel = Arc::clone(&kernel);
                let a_storage = Arc::clone(&a_storage);
                let b_storage = Arc::clone(&b_storage);
                let out_storage = Arc::clone(&out_storage);
                let done = done_tx.clone();
                pool.submit(move || {
                    let mut local: Vec<T> = Vec::with_capacity(range.len());
                    {
                        let a_data = a_storage.read().unwrap();
                        let b_data = b_storage.read().unwrap();
                        for i in range.clone() {
                            local.push(kernel(i, &a_data, &b_data));
                        }
                    }
                    out_storage.write().unwrap()[range].copy_from_slice(&local);
                    let _ = done.send(());
                });
            }
            drop(done_tx);

            // Wait for every block. A disconnect means a block job was
            // dropped without acking; stop waiting rather than wedge the
            // dispatcher.
            for _ in 0..block_count {
                if done_rx.recv().is_err() {
                    break;
                }
            }
        };

        self.sender
            .send(Command::Launch(Box::new(job)))
            .map_err(|_| DeviceError::StreamShutDown)
    }

    /// Enqueue a record of `event`. The event is stamped once every earlier
    /// command on this stream has finished.
    pub fn record(&self, event: &Event) -> Result<(), DeviceError> {
        self.sender
            .send(Command::Record(event.clone()))
            .map_err(|_| DeviceError::StreamShutDown)
    }

    /// Block until every command enqueued so far has finished.
    pub fn synchronize(&self) -> Result<(), DeviceError> {
        let (ack_tx, ack_rx) = bounded(1);
        self.sender
            .send(Command::Sync(ack_tx))
            .map_err(|_| DeviceError::StreamShutDown)?;
        ack_rx.recv().map_err(|_| DeviceError::StreamShutDown)
    }

    /// Handle for enqueueing copy commands from buffers.
    pub(crate) fn command_sender(&self) -> Sender<Command> {
        self.sender.clone()
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        let _ = self.sender.send(Command::Shutdown);
        if let Some(jh) = self.dispatcher.take() {
            let _ = jh.join();
        }
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
