//! Work-stealing worker pool backing the simulated device.
//!
//! The pool owns a fixed set of OS worker threads, each with a local FIFO
//! deque. Kernel block jobs enter through a global injection queue and are
//! distributed to workers; an idle worker steals from peers before giving up
//! and parking.
//!
//! # Work-stealing algorithm
//!
//! Each worker thread loops with the following priority:
//! 1. Pop from its local deque (no contention).
//! 2. Steal a batch from the global [`Injector`] into the local deque.
//! 3. Steal from a random peer's [`Stealer`].
//! 4. Park briefly (1 ms) to avoid busy-spinning, then retry.
//!
//! Completions are counted in a shared [`AtomicUsize`] so callers can wait
//! for a known number of jobs to drain.

use crossbeam_deque::{Injector, Steal, Stealer, Worker};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// A unit of device work: one kernel block, or a pool test closure.
type Job = Box<dyn FnOnce() + Send + 'static>;

// ---------------------------------------------------------------------------
// WorkerPool
// ---------------------------------------------------------------------------

/// A fixed pool of work-stealing worker threads.
///
/// Jobs are submitted to a global injection queue and picked up by whichever
/// worker gets there first; block jobs from a single kernel launch therefore
/// spread across workers.
pub struct WorkerPool {
    /// Global injection queue — new jobs land here.
    injector: Arc<Injector<Job>>,
    /// Join handles for the worker threads.
    handles: Vec<Option<thread::JoinHandle<()>>>,
    /// Signal used to request shutdown.
    shutdown: Arc<AtomicBool>,
    /// Number of worker threads.
    worker_count: usize,
    /// Jobs completed across all workers.
    completed: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Create a pool with `workers` OS threads.
    ///
    /// Passing `0` defaults to the number of available CPUs.
    pub fn new(workers: usize) -> Self {
        let worker_count = if workers == 0 {
            num_cpus::get().max(1)
        } else {
            workers
        };

        let injector = Arc::new(Injector::<Job>::new());
        let shutdown = Arc::new(AtomicBool::new(false));
        let completed = Arc::new(AtomicUsize::new(0));

        // Create every deque up front so all stealers exist before any
        // worker thread starts.
        let mut locals: Vec<Worker<Job>> = Vec::with_capacity(worker_count);
        let mut stealers: Vec<Stealer<Job>> = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let w = Worker::new_fifo();
            stealers.push(w.stealer());
            locals.push(w);
        }
        let stealers = Arc::new(stealers);

        let mut handles = Vec::with_capacity(worker_count);
        for (idx, local) in locals.into_iter().enumerate() {
            let injector = Arc::clone(&injector);
            let stealers = Arc::clone(&stealers);
            let shutdown = Arc::clone(&shutdown);
            let completed = Arc::clone(&completed);

            let jh = thread::Builder::new()
                .name(format!("device-worker-{}", idx))
                .spawn(move || {
                    Self::worker_loop(idx, local, injector, stealers, shutdown, completed);
                })
                .expect("failed to spawn device worker thread");
            handles.push(Some(jh));
        }

        Self {
            injector,
            handles,
            shutdown,
            worker_count,
            completed,
        }
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Number of jobs completed so far.
    pub fn completed_count(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    /// Submit a job to the global injection queue.
    pub fn submit<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.injector.push(Box::new(f));
    }

    /// Block until at least `expected` jobs have completed or `timeout`
    /// elapses. Returns the completed count at the time the wait ended.
    pub fn wait_for_completed(&self, expected: usize, timeout: Duration) -> usize {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let current = self.completed.load(Ordering::Acquire);
            if current >= expected || std::time::Instant::now() >= deadline {
                return current;
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    /// Request shutdown and join every worker.
    ///
    /// Jobs still queued when a worker observes the signal are abandoned.
    pub fn shutdown(&mut self) {
        self.shutdown.store(true, Ordering::Release);
        for slot in &mut self.handles {
            if let Some(jh) = slot.take() {
                let _ = jh.join();
            }
        }
    }

    /// `true` once shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    // -- internal worker loop ---------------------------------------------

    /// Cheap deterministic scrambler (xorshift32) for peer selection.
    ///
    /// Stealing only needs an arbitrary starting peer, not real randomness,
    /// so the pool carries no generator dependency. Each worker keeps its
    /// own state; zero is avoided (xorshift32 fixpoint).
    fn xorshift32(state: &mut u32) -> u32 {
        let mut x = *state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        *state = x;
        x
    }

    fn worker_loop(
        idx: usize,
        local: Worker<Job>,
        injector: Arc<Injector<Job>>,
        stealers: Arc<Vec<Stealer<Job>>>,
        shutdown: Arc<AtomicBool>,
        completed: Arc<AtomicUsize>,
    ) {
        let mut rng_state: u32 = (idx as u32).wrapping_mul(2654435761).max(1);

        loop {
            if shutdown.load(Ordering::Acquire) {
                return;
            }

            // 1. Local deque.
            if let Some(job) = local.pop() {
                job();
                completed.fetch_add(1, Ordering::Release);
                continue;
            }

            // 2. Global queue, stealing a batch into the local deque.
            match injector.steal_batch_and_pop(&local) {
                Steal::Success(job) => {
                    job();
                    completed.fetch_add(1, Ordering::Release);
                    continue;
                }
                Steal::Retry => {
                    thread::yield_now();
                    continue;
                }
                Steal::Empty => {}
            }

            // 3. A random peer's deque.
            let peers = stealers.len();
            let start = Self::xorshift32(&mut rng_state) as usize % peers;
            let mut stolen = false;
            for offset in 0..peers {
                let peer = (start + offset) % peers;
                if peer == idx {
                    continue;
                }
                match stealers[peer].steal_batch_and_pop(&local) {
                    Steal::Success(job) => {
                        job();
                        completed.fetch_add(1, Ordering::Release);
                        stolen = true;
                        break;
                    }
                    Steal::Retry | Steal::Empty => {}
                }
            }
            if stolen {
                continue;
            }

            // 4. Nothing anywhere — park briefly before trying again.
            thread::park_timeout(Duration::from_millis(1));
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !self.is_shutdown() {
            self.shutdown();
        }
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("worker_count", &self.worker_count)
            .field("completed", &self.completed_count())
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
