use crate::{
    edge::GraphEdge,
    graph,
    inputs::{InputList, TaskFn},
    node::{GraphNode, Node},
    sync::{AtomicU8, Condvar, Mutex, Ordering},
    types::{Payload, SyncCell, VisitMarker},
};
use derive_more::{Debug, Deref};
use std::{
    sync::{Arc, Weak},
    time::{Duration, Instant},
};
use tracing::trace;

/// Lifecycle state of a task within one executor run.
///
/// Transitions are monotonic: `Incomplete → Running → Complete`, never
/// backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TaskState {
    /// Not yet picked up by a worker.
    Incomplete = 0,
    /// All bound input edges satisfied; the callable is executing.
    Running = 1,
    /// The callable returned and the output edge is published.
    Complete = 2,
}

impl TaskState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Incomplete,
            1 => Self::Running,
            2 => Self::Complete,
            _ => unreachable!("invalid task state {raw}"),
        }
    }
}

/// A graph vertex bound to a callable: the unit of work submitted to an
/// executor.
///
/// `O` is the output payload published on the task's own edge; `I` is the
/// tuple of input payload types consumed from predecessor edges, e.g.
/// `Task<i32, (i32, f64)>`. Unit payloads are spelled
/// [`Unit`](crate::types::Unit): a `Task<Unit, I>` still publishes its
/// payload-free output edge so dependents can order on it, and a unit-typed
/// input gates execution without contributing an argument to the callable.
///
/// Tasks are created behind `Arc` so that workers, consumers holding the
/// output edge, and the caller awaiting the result can all share them. Node
/// operations (binding inputs, reading the output edge, reachability) are
/// reachable directly on the task through `Deref`.
#[derive(Debug, Deref)]
#[must_use]
pub struct Task<O: Payload, I: InputList> {
    #[deref]
    node: Node<O, I>,
    #[debug(skip)]
    callable: Mutex<Option<Box<dyn FnMut(I) -> O + Send>>>,
    #[debug(skip)]
    result: SyncCell<Option<O>>,
    /// `(start, end)`, written only by the worker driving this task.
    #[debug(skip)]
    timing: SyncCell<(Option<Instant>, Option<Instant>)>,
    state: AtomicU8,
    #[debug(skip)]
    done_lock: Mutex<()>,
    #[debug(skip)]
    done: Condvar,
    #[debug(skip)]
    name: Mutex<String>,
    #[debug(skip)]
    description: Mutex<String>,
}

impl<O: Payload, I: InputList> Task<O, I> {
    /// A fresh task: inputs unbound, no callable, state `Incomplete`.
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|task: &Weak<Self>| {
            let owner: Weak<dyn GraphNode> = task.clone();
            Self {
                node: Node::new(owner),
                callable: Mutex::new(None),
                result: SyncCell::new(None),
                timing: SyncCell::new((None, None)),
                state: AtomicU8::new(TaskState::Incomplete as u8),
                done_lock: Mutex::new(()),
                done: Condvar::new(),
                name: Mutex::new(String::new()),
                description: Mutex::new(String::new()),
            }
        })
    }

    /// Install the payload executed by [`run`](Task::run). The callable's
    /// argument list must match the declared input tuple with the unit slots
    /// removed (remaining positions keep their declaration order), and its
    /// return type the declared output; mismatches fail to compile. Must be
    /// called before the executor runs this task; installing again replaces
    /// the previous callable.
    pub fn set_callable<F, M>(&self, callable: F)
    where
        F: TaskFn<I, O, M>,
    {
        let mut callable = callable;
        *self.callable.lock().expect("callable slot poisoned") =
            Some(Box::new(move |inputs: I| callable.call(inputs)));
    }

    /// Work-item body, invoked by a pool worker exactly once per run.
    ///
    /// Blocks until every bound input edge is retrievable, flips to
    /// `Running`, reads the input values (defaults for unbound slots), runs
    /// the callable, stores the result, publishes the output edge, records
    /// the end time and flips to `Complete`, waking [`wait`](Task::wait)
    /// callers.
    ///
    /// # Panics
    ///
    /// If no callable was installed.
    pub fn run(&self) {
        for edge in self.node.input_edges().into_iter().flatten() {
            edge.wait_retrievable();
        }
        self.store_state(TaskState::Running);
        let started = Instant::now();
        self.timing.with_mut(|timing| {
            // SAFETY: timing is written only by the single worker driving
            // this task, and read only after `Complete` is observed with
            // acquire ordering.
            unsafe { (*timing).0 = Some(started) };
        });

        let inputs = self.node.values();
        let output = {
            let mut slot = self.callable.lock().expect("callable slot poisoned");
            let callable = slot
                .as_mut()
                .expect("Task::run invoked before set_callable");
            callable(inputs)
        };

        self.result.with_mut(|result| {
            // SAFETY: single writer, and readers first observe `Complete`.
            unsafe { *result = Some(output.clone()) };
        });
        self.node.publish(output);
        let finished = Instant::now();
        self.timing.with_mut(|timing| {
            // SAFETY: as above.
            unsafe { (*timing).1 = Some(finished) };
        });
        self.store_state(TaskState::Complete);
        // Signal under the lock so a waiter between its state check and its
        // condvar wait cannot miss the notification.
        drop(self.done_lock.lock().expect("completion lock poisoned"));
        self.done.notify_all();
        let name = self.name.lock().expect("task name poisoned");
        trace!(
            task = %*name,
            duration_us = finished.duration_since(started).as_micros() as u64,
            "task completed"
        );
    }

    /// Block until the task reaches [`TaskState::Complete`].
    pub fn wait(&self) -> TaskState {
        let mut guard = self.done_lock.lock().expect("completion lock poisoned");
        while self.state() != TaskState::Complete {
            guard = self.done.wait(guard).expect("completion lock poisoned");
        }
        TaskState::Complete
    }

    /// The stored output. `None` until the task is `Complete`; guaranteed
    /// `Some` after [`wait`](Task::wait) returns.
    pub fn result(&self) -> Option<O> {
        if self.state() != TaskState::Complete {
            return None;
        }
        self.result.with(|result| {
            // SAFETY: `Complete` was observed with acquire ordering, so the
            // worker's write happens-before this read and the slot is never
            // written again.
            unsafe { (*result).clone() }
        })
    }

    /// Wall-clock time from the callable starting to the output being
    /// published. `None` until the task is `Complete`.
    pub fn duration(&self) -> Option<Duration> {
        if self.state() != TaskState::Complete {
            return None;
        }
        self.timing.with(|timing| {
            // SAFETY: as in `result`.
            let (started, finished) = unsafe { *timing };
            Some(finished?.duration_since(started?))
        })
    }

    /// Atomic snapshot of the lifecycle state.
    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Human-readable task name, used in trace output.
    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.lock().expect("task name poisoned") = name.into();
    }

    /// The task name; empty unless [`set_name`](Task::set_name) was called.
    pub fn name(&self) -> String {
        self.name.lock().expect("task name poisoned").clone()
    }

    /// Free-form description of what the task does.
    pub fn set_description(&self, description: impl Into<String>) {
        *self.description.lock().expect("task description poisoned") = description.into();
    }

    /// The task description; empty unless set.
    pub fn description(&self) -> String {
        self.description
            .lock()
            .expect("task description poisoned")
            .clone()
    }

    fn store_state(&self, state: TaskState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

impl<O: Payload, I: InputList> GraphNode for Task<O, I> {
    fn input_edges(&self) -> Vec<Option<Arc<dyn GraphEdge>>> {
        self.node.input_edges()
    }

    fn input_edge_count(&self) -> usize {
        self.node.input_edge_count()
    }

    fn reachability(&self) -> usize {
        self.node.reachability()
    }

    fn assign_reachability(&self, marker: &mut VisitMarker) {
        self.node.assign_reachability(graph::identity(self), marker);
    }
}

/// Type-erased task handle, the currency of [`Executor::add`].
///
/// [`Executor::add`]: crate::executor::Executor::add
pub trait AnyTask: Send + Sync {
    /// Execute the task body on the calling thread. See [`Task::run`].
    fn run(&self);

    /// Block until the task completes. See [`Task::wait`].
    fn wait(&self) -> TaskState;

    /// Atomic snapshot of the lifecycle state.
    fn state(&self) -> TaskState;

    /// The task's graph vertex, for reachability and traversal.
    fn as_node(&self) -> &dyn GraphNode;

    /// Whether this task should be submitted before `other` (smaller
    /// critical-path depth first).
    fn runs_before(&self, other: &dyn AnyTask) -> bool {
        self.as_node().runs_before(other.as_node())
    }
}

impl<O: Payload, I: InputList> AnyTask for Task<O, I> {
    fn run(&self) {
        Task::run(self);
    }

    fn wait(&self) -> TaskState {
        Task::wait(self)
    }

    fn state(&self) -> TaskState {
        Task::state(self)
    }

    fn as_node(&self) -> &dyn GraphNode {
        self
    }
}
