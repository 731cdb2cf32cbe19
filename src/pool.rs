use crate::sync::{AtomicUsize, Condvar, Mutex, Ordering, RwLock, thread};
use derive_more::Debug;
use std::{collections::VecDeque, panic::AssertUnwindSafe, sync::Arc};
use tracing::{debug, error};

/// Work item executed by pool workers. Shared so the queue can be snapshotted.
pub type Job = Arc<dyn Fn() + Send + Sync + 'static>;

/// Callback invoked each time the pool's active count returns to zero.
pub type IdleCallback = Box<dyn Fn() + Send + Sync + 'static>;

/// Fixed-size worker pool draining a shared FIFO queue of opaque work items.
///
/// The pool is cold after construction: items can be queued, but nothing runs
/// until [`start`](WorkerPool::start) spawns the workers. The active-item
/// counter tracks queued plus in-flight items; it reaches zero exactly once
/// per drain, at which point the idle callback fires and
/// [`wait_idle`](WorkerPool::wait_idle) callers wake. Dropping the pool
/// signals shutdown, wakes every worker and joins the threads; still-queued
/// items are abandoned.
#[derive(Debug)]
pub struct WorkerPool {
    shared: Arc<PoolShared>,
    #[debug(skip)]
    workers: Vec<thread::JoinHandle<()>>,
    thread_count: usize,
}

#[derive(Debug)]
struct PoolShared {
    /// Shared for introspection, exclusive for enqueue/dequeue/clear.
    #[debug(skip)]
    queue: RwLock<VecDeque<Job>>,
    /// Shutdown flag; its mutex pairs with `work_ready` for worker wake-ups.
    #[debug(skip)]
    shutdown: Mutex<bool>,
    #[debug(skip)]
    work_ready: Condvar,
    /// Distinct from the wake mutex so `wait_idle` does not contend with
    /// submission.
    #[debug(skip)]
    idle_lock: Mutex<()>,
    #[debug(skip)]
    idle: Condvar,
    active: AtomicUsize,
    #[debug(skip)]
    on_idle: Option<IdleCallback>,
}

impl PoolShared {
    /// Caller must hold `idle_lock` (or otherwise own the unique transition
    /// to zero) so the callback fires exactly once per transition.
    fn went_idle(&self) {
        if let Some(on_idle) = &self.on_idle {
            on_idle();
        }
        self.idle.notify_all();
    }
}

impl WorkerPool {
    /// A cold pool that will run `thread_count` workers once started.
    /// `on_idle` is invoked exactly once each time the active count drops
    /// back to zero.
    pub fn new(thread_count: usize, on_idle: Option<IdleCallback>) -> Self {
        Self {
            shared: Arc::new(PoolShared {
                queue: RwLock::new(VecDeque::new()),
                shutdown: Mutex::new(false),
                work_ready: Condvar::new(),
                idle_lock: Mutex::new(()),
                idle: Condvar::new(),
                active: AtomicUsize::new(0),
                on_idle,
            }),
            workers: Vec::new(),
            thread_count,
        }
    }

    /// Enqueue a work item and wake one worker.
    ///
    /// `None` models an empty callable handle: it is rejected with `false`
    /// and has no side effects. Otherwise the item is queued, the active
    /// count is incremented atomically with the enqueue, and the call returns
    /// `true`. Thread-safe against other submitters, workers and clearers.
    pub fn submit<F>(&self, job: Option<F>) -> bool
    where
        F: Fn() + Send + Sync + 'static,
    {
        let Some(job) = job else {
            return false;
        };
        {
            // Wake mutex first, then the queue lock: same order as the
            // workers' wake-up predicate.
            let _wake_guard = self.shared.shutdown.lock().expect("pool wake lock poisoned");
            let mut queue = self.shared.queue.write().expect("pool queue poisoned");
            queue.push_back(Arc::new(job));
            self.shared.active.fetch_add(1, Ordering::AcqRel);
        }
        self.shared.work_ready.notify_one();
        true
    }

    /// Spawn the worker threads and begin draining the queue.
    ///
    /// # Panics
    ///
    /// If called more than once.
    pub fn start(&mut self) {
        assert!(self.workers.is_empty(), "WorkerPool::start called twice");
        debug!(workers = self.thread_count, "starting worker pool");
        for _ in 0..self.thread_count {
            let shared = Arc::clone(&self.shared);
            self.workers.push(thread::spawn(move || worker_loop(&shared)));
        }
    }

    /// Discard every item still in the queue without executing it, reducing
    /// the active count by the number discarded. Items already dequeued keep
    /// running. If this empties the pool the idle callback fires and idle
    /// waiters wake.
    pub fn clear_pending(&self) {
        let dropped;
        let became_idle;
        {
            let mut queue = self.shared.queue.write().expect("pool queue poisoned");
            dropped = queue.len();
            if dropped == 0 {
                return;
            }
            queue.clear();
            // Decrement inside the queue lock so the counter never disagrees
            // with the queue contents observed by submitters.
            became_idle = self.shared.active.fetch_sub(dropped, Ordering::AcqRel) == dropped;
        }
        debug!(dropped, "cleared pending work items");
        if became_idle {
            let _guard = self.shared.idle_lock.lock().expect("pool idle lock poisoned");
            self.shared.went_idle();
        }
    }

    /// Block until the active count reaches zero. Returns immediately if the
    /// pool is already idle.
    pub fn wait_idle(&self) {
        let mut guard = self.shared.idle_lock.lock().expect("pool idle lock poisoned");
        while !self.is_idle() {
            guard = self.shared.idle.wait(guard).expect("pool idle lock poisoned");
        }
    }

    /// Whether no items are queued or in flight. May be stale the moment it
    /// returns.
    pub fn is_idle(&self) -> bool {
        self.active_count() == 0
    }

    /// Number of queued plus in-flight items.
    pub fn active_count(&self) -> usize {
        self.shared.active.load(Ordering::Acquire)
    }

    /// Number of items still in the queue (excludes in-flight items).
    pub fn pending_count(&self) -> usize {
        self.shared.queue.read().expect("pool queue poisoned").len()
    }

    /// Whether the queue holds no items. Says nothing about in-flight work.
    pub fn is_empty(&self) -> bool {
        self.shared
            .queue
            .read()
            .expect("pool queue poisoned")
            .is_empty()
    }

    /// Copy of the current queue. Readers proceed concurrently with each
    /// other; writers are excluded for the duration of the copy.
    pub fn snapshot_pending(&self) -> VecDeque<Job> {
        self.shared.queue.read().expect("pool queue poisoned").clone()
    }

    /// Number of worker threads this pool was configured with.
    pub fn worker_count(&self) -> usize {
        self.thread_count
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        {
            let mut shutdown = self.shared.shutdown.lock().expect("pool wake lock poisoned");
            *shutdown = true;
        }
        self.shared.work_ready.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn worker_loop(shared: &PoolShared) {
    loop {
        {
            let mut shutdown = shared.shutdown.lock().expect("pool wake lock poisoned");
            loop {
                if *shutdown {
                    return;
                }
                if !shared.queue.read().expect("pool queue poisoned").is_empty() {
                    break;
                }
                shutdown = shared
                    .work_ready
                    .wait(shutdown)
                    .expect("pool wake lock poisoned");
            }
        }
        execute_one(shared);
    }
}

/// Pop and run one item, then settle the active count. A panicking item is
/// contained at this boundary so the counter still drops and the pool stays
/// usable.
fn execute_one(shared: &PoolShared) {
    let job = shared
        .queue
        .write()
        .expect("pool queue poisoned")
        .pop_front();
    let Some(job) = job else {
        return;
    };
    if std::panic::catch_unwind(AssertUnwindSafe(|| job())).is_err() {
        error!("work item panicked");
    }
    let _guard = shared.idle_lock.lock().expect("pool idle lock poisoned");
    if shared.active.fetch_sub(1, Ordering::AcqRel) == 1 {
        shared.went_idle();
    }
}
