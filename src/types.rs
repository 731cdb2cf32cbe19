use crate::sync::UnsafeCell;
use core::fmt;
use rustc_hash::FxHashSet;

/// The absence of a payload.
///
/// An `Edge<Unit>` synchronizes without carrying data, and a unit-typed task
/// input still gates execution but is dropped from the task callable's
/// argument list.
pub type Unit = ();

/// Kinds of values an edge can carry between tasks.
///
/// Blanket-implemented: any clonable, defaultable, thread-safe `'static` type
/// qualifies. `Default` supplies the value of an unbound input slot; `Clone`
/// lets many consumers read one producer's output.
pub trait Payload: Clone + Default + Send + Sync + 'static {}

impl<T: Clone + Default + Send + Sync + 'static> Payload for T {}

/// Set of node identities visited while assigning reachability.
///
/// Shared across a whole task collection so overlapping predecessor chains are
/// walked once.
pub type VisitMarker = FxHashSet<usize>;

/// An `UnsafeCell` that is `Sync` when its payload permits, used for
/// single-writer slots published through a release-store and read after an
/// acquire-load (edge payloads, task results, task timing).
///
/// Correctness is ensured by the publication protocol, not by this type: the
/// writer must be unique and every reader must first observe the accompanying
/// flag.
#[repr(transparent)]
pub(crate) struct SyncCell<T>(UnsafeCell<T>);

unsafe impl<T: Send> Send for SyncCell<T> {}
unsafe impl<T: Send + Sync> Sync for SyncCell<T> {}

impl<T> SyncCell<T> {
    pub(crate) fn new(value: T) -> Self {
        Self(UnsafeCell::new(value))
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(*const T) -> R) -> R {
        self.0.with(f)
    }

    pub(crate) fn with_mut<R>(&self, f: impl FnOnce(*mut T) -> R) -> R {
        self.0.with_mut(f)
    }
}

impl<T> fmt::Debug for SyncCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("SyncCell(..)")
    }
}
