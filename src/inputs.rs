use crate::{
    edge::{Edge, GraphEdge},
    node::BindError,
    types::Payload,
};
use std::{
    any::{Any, TypeId},
    sync::Arc,
};

/// A tuple of input payload types declared by a task, e.g. `(i32, f64)`.
///
/// Implemented for `()` and for tuples up to arity 8. `Edges` mirrors the
/// tuple with one optional producer-edge handle per slot, in declaration
/// order; slots left `None` yield the payload type's default at consume time.
///
/// By-type operations resolve slots through a `TypeId` scan and reject lists
/// in which the requested type appears more than once; by-index access goes
/// through [`IndexedInput`] and is checked at compile time.
pub trait InputList: Sized + Send + Sync + 'static {
    /// One optional producer edge per declared input, in declaration order.
    type Edges: Default + Send + Sync;

    /// Number of declared input slots.
    const ARITY: usize;

    /// The slots as type-erased edge handles, in declaration order.
    fn erased(edges: &Self::Edges) -> Vec<Option<Arc<dyn GraphEdge>>>;

    /// Current value of every slot; unbound slots yield the type's default.
    fn values(edges: &Self::Edges) -> Self;

    /// Bind the single slot whose payload type is `ty`.
    fn bind_by_type(
        edges: &mut Self::Edges,
        ty: TypeId,
        edge: Arc<dyn Any + Send + Sync>,
    ) -> Result<(), BindError>;

    /// Boxed value of the single slot whose payload type is `ty`.
    fn value_by_type(edges: &Self::Edges, ty: TypeId) -> Result<Box<dyn Any>, BindError>;
}

/// Position-indexed access to one slot of an [`InputList`].
///
/// Always admissible, even when the declared types repeat; the slot's payload
/// type is fixed by the declaration, so a mismatched edge is a compile error.
pub trait IndexedInput<const IDX: usize>: InputList {
    /// Payload type declared at position `IDX`.
    type Value: Payload;

    /// Shared view of the slot.
    fn slot(edges: &Self::Edges) -> &Option<Arc<Edge<Self::Value>>>;

    /// Exclusive view of the slot, for binding.
    fn slot_mut(edges: &mut Self::Edges) -> &mut Option<Arc<Edge<Self::Value>>>;
}

/// Callables a task accepts: any `FnMut` whose argument list matches the
/// declared input tuple with the unit slots removed (remaining positions keep
/// their declaration order) and whose return type matches the declared
/// output.
///
/// `M` is the dispatch pattern recording which declared positions reach the
/// callable, one [`Keep`]/[`Skip`] marker per slot. It is inferred from the
/// callable's own signature; callers never name it.
pub trait TaskFn<I: InputList, O, M>: Send + 'static {
    /// Invoke with the values read from the input edges; unit slots are
    /// dropped, the rest are passed in declaration order.
    fn call(&mut self, inputs: I) -> O;
}

/// Dispatch-pattern marker: the slot's value is passed to the callable.
pub struct Keep;

/// Dispatch-pattern marker: the slot is unit-typed and dropped from the
/// callable's argument list.
pub struct Skip;

impl InputList for () {
    type Edges = ();

    const ARITY: usize = 0;

    fn erased(_: &Self::Edges) -> Vec<Option<Arc<dyn GraphEdge>>> {
        Vec::new()
    }

    fn values(_: &Self::Edges) -> Self {}

    fn bind_by_type(
        _: &mut Self::Edges,
        _: TypeId,
        _: Arc<dyn Any + Send + Sync>,
    ) -> Result<(), BindError> {
        Err(BindError::UnknownInputType)
    }

    fn value_by_type(_: &Self::Edges, _: TypeId) -> Result<Box<dyn Any>, BindError> {
        Err(BindError::UnknownInputType)
    }
}

impl<F, O> TaskFn<(), O, ()> for F
where
    F: FnMut() -> O + Send + 'static,
{
    fn call(&mut self, _: ()) -> O {
        self()
    }
}

macro_rules! impl_input_list {
    ($($T:ident => $idx:tt),+) => {
        impl<$($T: Payload),+> InputList for ($($T,)+) {
            type Edges = ($(Option<Arc<Edge<$T>>>,)+);

            const ARITY: usize = [$(stringify!($T)),+].len();

            fn erased(edges: &Self::Edges) -> Vec<Option<Arc<dyn GraphEdge>>> {
                vec![$(
                    edges.$idx.as_ref().map(|edge| {
                        let cloned = Arc::clone(edge);
                        cloned as Arc<dyn GraphEdge>
                    })
                ),+]
            }

            fn values(edges: &Self::Edges) -> Self {
                ($(edges.$idx.as_ref().map(|edge| edge.get()).unwrap_or_default(),)+)
            }

            fn bind_by_type(
                edges: &mut Self::Edges,
                ty: TypeId,
                edge: Arc<dyn Any + Send + Sync>,
            ) -> Result<(), BindError> {
                let hits = [$(TypeId::of::<$T>() == ty),+]
                    .into_iter()
                    .filter(|hit| *hit)
                    .count();
                match hits {
                    0 => Err(BindError::UnknownInputType),
                    1 => {
                        $(
                            if TypeId::of::<$T>() == ty {
                                let edge = edge
                                    .downcast::<Edge<$T>>()
                                    .map_err(|_| BindError::UnknownInputType)?;
                                edges.$idx = Some(edge);
                                return Ok(());
                            }
                        )+
                        unreachable!("exactly one slot matched the payload type")
                    }
                    _ => Err(BindError::AmbiguousInputType),
                }
            }

            fn value_by_type(
                edges: &Self::Edges,
                ty: TypeId,
            ) -> Result<Box<dyn Any>, BindError> {
                let hits = [$(TypeId::of::<$T>() == ty),+]
                    .into_iter()
                    .filter(|hit| *hit)
                    .count();
                match hits {
                    0 => Err(BindError::UnknownInputType),
                    1 => {
                        $(
                            if TypeId::of::<$T>() == ty {
                                let value = edges.$idx
                                    .as_ref()
                                    .map(|edge| edge.get())
                                    .unwrap_or_default();
                                return Ok(Box::new(value));
                            }
                        )+
                        unreachable!("exactly one slot matched the payload type")
                    }
                    _ => Err(BindError::AmbiguousInputType),
                }
            }
        }

    };
}

impl_input_list!(T0 => 0);
impl_input_list!(T0 => 0, T1 => 1);
impl_input_list!(T0 => 0, T1 => 1, T2 => 2);
impl_input_list!(T0 => 0, T1 => 1, T2 => 2, T3 => 3);
impl_input_list!(T0 => 0, T1 => 1, T2 => 2, T3 => 3, T4 => 4);
impl_input_list!(T0 => 0, T1 => 1, T2 => 2, T3 => 3, T4 => 4, T5 => 5);
impl_input_list!(T0 => 0, T1 => 1, T2 => 2, T3 => 3, T4 => 4, T5 => 5, T6 => 6);
impl_input_list!(T0 => 0, T1 => 1, T2 => 2, T3 => 3, T4 => 4, T5 => 5, T6 => 6, T7 => 7);

// One `TaskFn` impl per (tuple shape, unit pattern): the element list mixes
// concrete `()` slots with the generic value types, the `FnMut` bound keeps
// only the value positions, and the marker tuple keeps the impls coherent
// while the callable's own arity picks the right one during inference.
macro_rules! impl_task_fn {
    (($($E:ty),+) / ($($M:ty),+) => ($($T:ident => $idx:tt),*)) => {
        impl<F, O, $($T: Payload),*> TaskFn<($($E,)+), O, ($($M,)+)> for F
        where
            F: FnMut($($T),*) -> O + Send + 'static,
        {
            #[allow(unused_variables)]
            fn call(&mut self, inputs: ($($E,)+)) -> O {
                self($(inputs.$idx),*)
            }
        }
    };
}

impl_task_fn!((T0) / (Keep) => (T0 => 0));
impl_task_fn!((T0, T1) / (Keep, Keep) => (T0 => 0, T1 => 1));
impl_task_fn!((T0, T1, T2) / (Keep, Keep, Keep) => (T0 => 0, T1 => 1, T2 => 2));
impl_task_fn!((T0, T1, T2, T3) / (Keep, Keep, Keep, Keep)
    => (T0 => 0, T1 => 1, T2 => 2, T3 => 3));
impl_task_fn!((T0, T1, T2, T3, T4) / (Keep, Keep, Keep, Keep, Keep)
    => (T0 => 0, T1 => 1, T2 => 2, T3 => 3, T4 => 4));
impl_task_fn!((T0, T1, T2, T3, T4, T5) / (Keep, Keep, Keep, Keep, Keep, Keep)
    => (T0 => 0, T1 => 1, T2 => 2, T3 => 3, T4 => 4, T5 => 5));
impl_task_fn!((T0, T1, T2, T3, T4, T5, T6) / (Keep, Keep, Keep, Keep, Keep, Keep, Keep)
    => (T0 => 0, T1 => 1, T2 => 2, T3 => 3, T4 => 4, T5 => 5, T6 => 6));
impl_task_fn!((T0, T1, T2, T3, T4, T5, T6, T7) / (Keep, Keep, Keep, Keep, Keep, Keep, Keep, Keep)
    => (T0 => 0, T1 => 1, T2 => 2, T3 => 3, T4 => 4, T5 => 5, T6 => 6, T7 => 7));

// Unit-bearing patterns, every combination through arity 4. Unit slots are
// concrete `()` in the tuple and absent from the callable's signature.
impl_task_fn!((()) / (Skip) => ());

impl_task_fn!(((), T1) / (Skip, Keep) => (T1 => 1));
impl_task_fn!((T0, ()) / (Keep, Skip) => (T0 => 0));
impl_task_fn!(((), ()) / (Skip, Skip) => ());

impl_task_fn!(((), T1, T2) / (Skip, Keep, Keep) => (T1 => 1, T2 => 2));
impl_task_fn!((T0, (), T2) / (Keep, Skip, Keep) => (T0 => 0, T2 => 2));
impl_task_fn!((T0, T1, ()) / (Keep, Keep, Skip) => (T0 => 0, T1 => 1));
impl_task_fn!(((), (), T2) / (Skip, Skip, Keep) => (T2 => 2));
impl_task_fn!(((), T1, ()) / (Skip, Keep, Skip) => (T1 => 1));
impl_task_fn!((T0, (), ()) / (Keep, Skip, Skip) => (T0 => 0));
impl_task_fn!(((), (), ()) / (Skip, Skip, Skip) => ());

impl_task_fn!(((), T1, T2, T3) / (Skip, Keep, Keep, Keep) => (T1 => 1, T2 => 2, T3 => 3));
impl_task_fn!((T0, (), T2, T3) / (Keep, Skip, Keep, Keep) => (T0 => 0, T2 => 2, T3 => 3));
impl_task_fn!((T0, T1, (), T3) / (Keep, Keep, Skip, Keep) => (T0 => 0, T1 => 1, T3 => 3));
impl_task_fn!((T0, T1, T2, ()) / (Keep, Keep, Keep, Skip) => (T0 => 0, T1 => 1, T2 => 2));
impl_task_fn!(((), (), T2, T3) / (Skip, Skip, Keep, Keep) => (T2 => 2, T3 => 3));
impl_task_fn!(((), T1, (), T3) / (Skip, Keep, Skip, Keep) => (T1 => 1, T3 => 3));
impl_task_fn!(((), T1, T2, ()) / (Skip, Keep, Keep, Skip) => (T1 => 1, T2 => 2));
impl_task_fn!((T0, (), (), T3) / (Keep, Skip, Skip, Keep) => (T0 => 0, T3 => 3));
impl_task_fn!((T0, (), T2, ()) / (Keep, Skip, Keep, Skip) => (T0 => 0, T2 => 2));
impl_task_fn!((T0, T1, (), ()) / (Keep, Keep, Skip, Skip) => (T0 => 0, T1 => 1));
impl_task_fn!(((), (), (), T3) / (Skip, Skip, Skip, Keep) => (T3 => 3));
impl_task_fn!(((), (), T2, ()) / (Skip, Skip, Keep, Skip) => (T2 => 2));
impl_task_fn!(((), T1, (), ()) / (Skip, Keep, Skip, Skip) => (T1 => 1));
impl_task_fn!((T0, (), (), ()) / (Keep, Skip, Skip, Skip) => (T0 => 0));
impl_task_fn!(((), (), (), ()) / (Skip, Skip, Skip, Skip) => ());

macro_rules! impl_indexed_input {
    (($($T:ident),+)[$idx:tt] => $V:ident) => {
        impl<$($T: Payload),+> IndexedInput<$idx> for ($($T,)+) {
            type Value = $V;

            fn slot(edges: &Self::Edges) -> &Option<Arc<Edge<$V>>> {
                &edges.$idx
            }

            fn slot_mut(edges: &mut Self::Edges) -> &mut Option<Arc<Edge<$V>>> {
                &mut edges.$idx
            }
        }
    };
}

impl_indexed_input!((T0)[0] => T0);

impl_indexed_input!((T0, T1)[0] => T0);
impl_indexed_input!((T0, T1)[1] => T1);

impl_indexed_input!((T0, T1, T2)[0] => T0);
impl_indexed_input!((T0, T1, T2)[1] => T1);
impl_indexed_input!((T0, T1, T2)[2] => T2);

impl_indexed_input!((T0, T1, T2, T3)[0] => T0);
impl_indexed_input!((T0, T1, T2, T3)[1] => T1);
impl_indexed_input!((T0, T1, T2, T3)[2] => T2);
impl_indexed_input!((T0, T1, T2, T3)[3] => T3);

impl_indexed_input!((T0, T1, T2, T3, T4)[0] => T0);
impl_indexed_input!((T0, T1, T2, T3, T4)[1] => T1);
impl_indexed_input!((T0, T1, T2, T3, T4)[2] => T2);
impl_indexed_input!((T0, T1, T2, T3, T4)[3] => T3);
impl_indexed_input!((T0, T1, T2, T3, T4)[4] => T4);

impl_indexed_input!((T0, T1, T2, T3, T4, T5)[0] => T0);
impl_indexed_input!((T0, T1, T2, T3, T4, T5)[1] => T1);
impl_indexed_input!((T0, T1, T2, T3, T4, T5)[2] => T2);
impl_indexed_input!((T0, T1, T2, T3, T4, T5)[3] => T3);
impl_indexed_input!((T0, T1, T2, T3, T4, T5)[4] => T4);
impl_indexed_input!((T0, T1, T2, T3, T4, T5)[5] => T5);

impl_indexed_input!((T0, T1, T2, T3, T4, T5, T6)[0] => T0);
impl_indexed_input!((T0, T1, T2, T3, T4, T5, T6)[1] => T1);
impl_indexed_input!((T0, T1, T2, T3, T4, T5, T6)[2] => T2);
impl_indexed_input!((T0, T1, T2, T3, T4, T5, T6)[3] => T3);
impl_indexed_input!((T0, T1, T2, T3, T4, T5, T6)[4] => T4);
impl_indexed_input!((T0, T1, T2, T3, T4, T5, T6)[5] => T5);
impl_indexed_input!((T0, T1, T2, T3, T4, T5, T6)[6] => T6);

impl_indexed_input!((T0, T1, T2, T3, T4, T5, T6, T7)[0] => T0);
impl_indexed_input!((T0, T1, T2, T3, T4, T5, T6, T7)[1] => T1);
impl_indexed_input!((T0, T1, T2, T3, T4, T5, T6, T7)[2] => T2);
impl_indexed_input!((T0, T1, T2, T3, T4, T5, T6, T7)[3] => T3);
impl_indexed_input!((T0, T1, T2, T3, T4, T5, T6, T7)[4] => T4);
impl_indexed_input!((T0, T1, T2, T3, T4, T5, T6, T7)[5] => T5);
impl_indexed_input!((T0, T1, T2, T3, T4, T5, T6, T7)[6] => T6);
impl_indexed_input!((T0, T1, T2, T3, T4, T5, T6, T7)[7] => T7);
