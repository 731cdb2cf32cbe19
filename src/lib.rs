//! Typed task-graph execution over a fixed-size worker pool.
//!
//! This crate runs a Directed Acyclic Graph (DAG) of strongly-typed tasks
//! concurrently. It:
//! - Wires tasks together with one-shot broadcast latches (`Edge<T>`) so a
//!   producer's output becomes visible to every consumer with the right
//!   happens-before relations (release-store paired with acquire-load).
//! - Checks callable signatures against each task's declared input/output
//!   types at compile time via tuple traits.
//! - Biases execution toward the critical path: tasks are submitted in
//!   ascending order of their longest predecessor chain, so shallow tasks
//!   complete early and unblock their dependents sooner.
//!
//! Key modules:
//! - `edge`: the `Edge<T>` latch and its type-erased `GraphEdge` view.
//! - `node`: the `Node<O, I>` graph vertex: typed input slots, one owned
//!   output edge, reachability.
//! - `task`: `Task<O, I>` (node + callable + lifecycle state) and the
//!   type-erased `AnyTask` handle.
//! - `inputs`: the `InputList`/`IndexedInput`/`TaskFn` tuple traits behind
//!   typed binding and signature checking.
//! - `graph`: reachability assignment over a task collection.
//! - `pool`: the fixed-size `WorkerPool` with idle, cancel and shutdown
//!   semantics.
//! - `executor`: the `Executor` front-end tying it all together.
//!
//! Quick start:
//! 1. Create tasks with `Task::<Output, (Inputs, …)>::new()` and install
//!    their callables via `set_callable`.
//! 2. Wire consumers to producers with `bind_input` (by type) or
//!    `bind_input_at` (by index), passing the producer's `output_edge()`.
//! 3. `add` every task to an `Executor`, then `run()` and `wait()`; read
//!    results with `task.result()`.
//!
//! A worker blocks while its task waits on input latches, so the pool as a
//! whole makes progress as long as the graph is acyclic and every transitive
//! producer was submitted alongside its consumers.

/// The `Edge<T>` one-shot latch carrying values between tasks.
///
/// Producers publish once with `set`; consumers block in `wait_retrievable`
/// and read with `get`. Unit edges (`Edge<()>`) synchronize without data.
pub mod edge;
/// The `Executor` front-end: collects task handles, orders them by
/// critical-path depth and feeds the worker pool.
pub mod executor;
/// Reachability assignment across a collection of nodes with a shared visit
/// marker.
pub mod graph;
/// Tuple traits describing a task's declared inputs: positional slots,
/// indexed access and the callable-signature constraint.
pub mod inputs;
/// The `Node<O, I>` graph vertex and the type-erased `GraphNode` view used
/// by edges and the reachability traversal.
pub mod node;
/// The fixed-size `WorkerPool` draining a shared FIFO queue, with
/// idle-callback, cancellation and graceful-shutdown semantics.
pub mod pool;
mod sync;
/// `Task<O, I>`: a node bound to a callable, with lifecycle state, timing
/// and a completion event.
pub mod task;
/// Common bounds and aliases (`Payload`, `Unit`, `VisitMarker`) plus the
/// internal publish/subscribe cell.
pub mod types;
