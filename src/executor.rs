use crate::{graph::compute_reachability, pool::WorkerPool, task::AnyTask};
use derive_more::Debug;
use std::sync::Arc;
use tracing::debug;

/// Front-end that drives a collection of tasks through a worker pool.
///
/// Usage: [`add`](Executor::add) every task of the graph (producers and
/// consumers alike), then [`run`](Executor::run) once, then
/// [`wait`](Executor::wait). `run` assigns reachability to every task,
/// submits tasks in ascending reachability order and starts the pool.
///
/// The ordering is a critical-path heuristic, not a correctness requirement:
/// shallow tasks are picked up first so their dependents unblock sooner,
/// while the edge latches alone guarantee data-dependency ordering.
///
/// The executor borrows task handles non-exclusively; tasks remain owned by
/// the caller. It is move-only: there is deliberately no `Clone`.
#[derive(Debug, Default)]
#[must_use]
pub struct Executor {
    pool: Option<WorkerPool>,
    #[debug(skip)]
    tasks: Vec<Arc<dyn AnyTask>>,
}

impl Executor {
    /// An executor with no pool yet; a pool sized to the number of logical
    /// CPUs is created on [`run`](Executor::run).
    pub fn new() -> Self {
        Self::default()
    }

    /// An executor driving the given (cold) pool instead of a default-sized
    /// one, e.g. to pin the worker count or attach an idle callback.
    pub fn with_pool(pool: WorkerPool) -> Self {
        Self {
            pool: Some(pool),
            tasks: Vec::new(),
        }
    }

    /// Append a task handle. Call before [`run`](Executor::run); every task
    /// reachable through the graph's input edges must be added, or it will
    /// never execute and its dependents will block forever.
    pub fn add(&mut self, task: Arc<dyn AnyTask>) {
        self.tasks.push(task);
    }

    /// Assign reachability across the whole collection, sort by ascending
    /// critical-path depth, submit one work item per task and start the
    /// pool's workers. Call once per executor instance.
    pub fn run(&mut self) {
        let pool = self
            .pool
            .get_or_insert_with(|| WorkerPool::new(num_cpus::get().max(1), None));
        compute_reachability(self.tasks.iter().map(|task| task.as_node()));
        self.tasks
            .sort_by_key(|task| task.as_node().reachability());
        debug!(
            tasks = self.tasks.len(),
            workers = pool.worker_count(),
            "submitting task graph"
        );
        for task in &self.tasks {
            let task = Arc::clone(task);
            pool.submit(Some(move || task.run()));
        }
        pool.start();
    }

    /// Discard tasks not yet picked up by a worker; tasks already running
    /// finish normally. No-op if [`run`](Executor::run) was never called.
    pub fn cancel(&self) {
        if let Some(pool) = &self.pool {
            pool.clear_pending();
        }
    }

    /// Block until the pool drains. Returns immediately if
    /// [`run`](Executor::run) was never called.
    pub fn wait(&self) {
        if let Some(pool) = &self.pool {
            pool.wait_idle();
        }
    }
}
