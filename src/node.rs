use crate::{
    edge::{Edge, GraphEdge},
    graph,
    inputs::{IndexedInput, InputList},
    sync::{AtomicUsize, Mutex, Ordering},
    types::{Payload, VisitMarker},
};
use derive_more::Debug;
use std::{
    any::{Any, TypeId},
    sync::{Arc, Weak},
};
use thiserror::Error;

/// Error produced when an input slot is addressed by payload type.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum BindError {
    /// The requested payload type is not among the declared input types.
    #[error("no input slot carries the requested payload type")]
    UnknownInputType,
    /// More than one declared input shares the requested payload type, so the
    /// slot cannot be resolved by type alone.
    #[error("multiple input slots share the requested payload type; bind by index instead")]
    AmbiguousInputType,
}

/// Type-erased view of a graph vertex, used by edges (as the back-reference
/// target) and by the reachability traversal.
pub trait GraphNode: Send + Sync {
    /// Input edges in declaration order; unbound slots are `None`.
    fn input_edges(&self) -> Vec<Option<Arc<dyn GraphEdge>>>;

    /// Declared input arity.
    fn input_edge_count(&self) -> usize;

    /// Length of the longest predecessor chain ending at this node, as
    /// assigned by [`assign_reachability`](GraphNode::assign_reachability).
    fn reachability(&self) -> usize;

    /// Recursively assign reachability to this node and its predecessors,
    /// sharing `marker` so already-visited nodes are not recomputed.
    fn assign_reachability(&self, marker: &mut VisitMarker);

    /// Whether this node should be submitted before `other`: strictly smaller
    /// critical-path depth runs first.
    fn runs_before(&self, other: &dyn GraphNode) -> bool {
        self.reachability() < other.reachability()
    }
}

/// Graph vertex: a fixed set of typed input slots plus one owned output edge.
///
/// Inputs are bound by the user before submission and are read-only during
/// execution. Binding by payload type is admissible only while the declared
/// input types are pairwise distinct; binding by index is always admissible
/// and fully type-checked at compile time.
#[derive(Debug)]
pub struct Node<O: Payload, I: InputList> {
    #[debug(skip)]
    inputs: Mutex<I::Edges>,
    output: Arc<Edge<O>>,
    reachability: AtomicUsize,
}

impl<O: Payload, I: InputList> Node<O, I> {
    pub(crate) fn new(owner: Weak<dyn GraphNode>) -> Self {
        Self {
            inputs: Mutex::new(I::Edges::default()),
            output: Edge::new(owner),
            reachability: AtomicUsize::new(0),
        }
    }

    /// Handle to the owned output edge. Consumers clone it into their input
    /// slots; it stays valid for the node's lifetime.
    pub fn output_edge(&self) -> &Arc<Edge<O>> {
        &self.output
    }

    /// The input slots as type-erased edge handles, in declaration order.
    pub fn input_edges(&self) -> Vec<Option<Arc<dyn GraphEdge>>> {
        I::erased(&self.inputs.lock().expect("input slots poisoned"))
    }

    /// Declared input arity.
    pub fn input_edge_count(&self) -> usize {
        I::ARITY
    }

    /// Associate the input slot of payload type `T` with a producer's output
    /// edge. Rebinding a slot replaces the previous edge.
    pub fn bind_input<T: Payload>(&self, edge: &Arc<Edge<T>>) -> Result<(), BindError> {
        let cloned = Arc::clone(edge);
        let erased = cloned as Arc<dyn Any + Send + Sync>;
        let mut slots = self.inputs.lock().expect("input slots poisoned");
        I::bind_by_type(&mut slots, TypeId::of::<T>(), erased)
    }

    /// Associate the input slot at position `IDX` with a producer's output
    /// edge. The edge's payload type must equal the type declared at `IDX`.
    pub fn bind_input_at<const IDX: usize>(&self, edge: &Arc<Edge<<I as IndexedInput<IDX>>::Value>>)
    where
        I: IndexedInput<IDX>,
    {
        let mut slots = self.inputs.lock().expect("input slots poisoned");
        *I::slot_mut(&mut slots) = Some(Arc::clone(edge));
    }

    /// Value produced into the input slot of payload type `T`, or
    /// `T::default()` if the slot is unbound.
    pub fn input_value<T: Payload>(&self) -> Result<T, BindError> {
        let slots = self.inputs.lock().expect("input slots poisoned");
        let boxed = I::value_by_type(&slots, TypeId::of::<T>())?;
        Ok(*boxed
            .downcast::<T>()
            .expect("slot payload type was just matched"))
    }

    /// Value produced into the input slot at position `IDX`, or the type's
    /// default if the slot is unbound.
    pub fn input_value_at<const IDX: usize>(&self) -> <I as IndexedInput<IDX>>::Value
    where
        I: IndexedInput<IDX>,
    {
        let slots = self.inputs.lock().expect("input slots poisoned");
        I::slot(&slots)
            .as_ref()
            .map(|edge| edge.get())
            .unwrap_or_default()
    }

    /// Cached critical-path depth; meaningful once reachability has been
    /// assigned.
    pub fn reachability(&self) -> usize {
        self.reachability.load(Ordering::Relaxed)
    }

    pub(crate) fn store_reachability(&self, value: usize) {
        self.reachability.store(value, Ordering::Relaxed);
    }

    pub(crate) fn values(&self) -> I {
        I::values(&self.inputs.lock().expect("input slots poisoned"))
    }

    pub(crate) fn publish(&self, value: O) {
        self.output.set(value);
    }

    pub(crate) fn assign_reachability(&self, identity: usize, marker: &mut VisitMarker) {
        if !marker.insert(identity) {
            return;
        }
        let depth = graph::inward_depth(&self.input_edges(), marker);
        self.store_reachability(depth);
    }
}
