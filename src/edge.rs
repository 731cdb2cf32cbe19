use crate::{
    node::GraphNode,
    sync::{AtomicBool, Condvar, Mutex, Ordering},
    types::{Payload, SyncCell},
};
use derive_more::Debug;
use std::sync::{Arc, Weak};

/// One-shot broadcast latch carrying a single value from one producer task to
/// any number of consumer tasks.
///
/// An edge starts empty. The producer calls [`set`](Edge::set) exactly once,
/// which stores the payload and flips the retrievable flag with release
/// semantics; consumers block in [`wait_retrievable`](Edge::wait_retrievable)
/// and then read the payload with [`get`](Edge::get). After the flip the
/// payload is immutable, so reads need no further synchronization.
///
/// Unit edges (`Edge<()>`) carry no data and only signal completion.
#[derive(Debug)]
pub struct Edge<T> {
    #[debug(skip)]
    slot: SyncCell<Option<T>>,
    /// Taken by the first `set` call; a second call is a contract violation.
    claimed: AtomicBool,
    retrievable: AtomicBool,
    #[debug(skip)]
    lock: Mutex<()>,
    #[debug(skip)]
    ready: Condvar,
    #[debug(skip)]
    owner: Weak<dyn GraphNode>,
}

impl<T: Payload> Edge<T> {
    pub(crate) fn new(owner: Weak<dyn GraphNode>) -> Arc<Self> {
        Arc::new(Self {
            slot: SyncCell::new(None),
            claimed: AtomicBool::new(false),
            retrievable: AtomicBool::new(false),
            lock: Mutex::new(()),
            ready: Condvar::new(),
            owner,
        })
    }

    /// Store the payload, mark the edge retrievable and wake every consumer
    /// blocked in [`wait_retrievable`](Edge::wait_retrievable).
    ///
    /// # Panics
    ///
    /// If called more than once: an edge is a one-shot latch and its payload
    /// is immutable once published.
    pub fn set(&self, value: T) {
        let already_set = self.claimed.swap(true, Ordering::AcqRel);
        assert!(!already_set, "Edge::set called twice on the same edge");
        self.slot.with_mut(|slot| {
            // SAFETY: the claim above makes this thread the only writer ever,
            // and no consumer dereferences the slot until `retrievable` is
            // published below.
            unsafe { *slot = Some(value) };
        });
        {
            // The store happens under the latch mutex so a consumer that just
            // checked the flag cannot miss the notification.
            let _guard = self.lock.lock().expect("edge latch poisoned");
            self.retrievable.store(true, Ordering::Release);
        }
        self.ready.notify_all();
    }

    /// Copy of the stored payload.
    ///
    /// # Panics
    ///
    /// If the edge is not yet retrievable. Callers must first observe
    /// [`is_retrievable`](Edge::is_retrievable) or return from
    /// [`wait_retrievable`](Edge::wait_retrievable).
    pub fn get(&self) -> T {
        assert!(
            self.is_retrievable(),
            "Edge::get called before the edge became retrievable"
        );
        self.slot.with(|slot| {
            // SAFETY: `retrievable` was loaded with acquire ordering, so the
            // producer's write happens-before this read, and the slot is never
            // written again.
            unsafe { (*slot).clone() }.expect("retrievable edge holds a value")
        })
    }

    /// Whether the payload has been published. Lock-free; the answer may be
    /// stale the moment it returns.
    pub fn is_retrievable(&self) -> bool {
        self.retrievable.load(Ordering::Acquire)
    }

    /// Block until the payload is published. Returns immediately thereafter;
    /// safe to call from any number of consumers.
    pub fn wait_retrievable(&self) {
        if self.is_retrievable() {
            return;
        }
        let mut guard = self.lock.lock().expect("edge latch poisoned");
        while !self.is_retrievable() {
            guard = self.ready.wait(guard).expect("edge latch poisoned");
        }
    }

    /// The node whose task produces this edge's value, if it is still alive.
    pub fn owner(&self) -> Option<Arc<dyn GraphNode>> {
        self.owner.upgrade()
    }
}

/// Type-erased view of an [`Edge`], for waiting and graph traversal where the
/// payload type is irrelevant.
pub trait GraphEdge: Send + Sync {
    /// See [`Edge::is_retrievable`].
    fn is_retrievable(&self) -> bool;
    /// See [`Edge::wait_retrievable`].
    fn wait_retrievable(&self);
    /// See [`Edge::owner`].
    fn owner(&self) -> Option<Arc<dyn GraphNode>>;
}

impl<T: Payload> GraphEdge for Edge<T> {
    fn is_retrievable(&self) -> bool {
        Edge::is_retrievable(self)
    }

    fn wait_retrievable(&self) {
        Edge::wait_retrievable(self)
    }

    fn owner(&self) -> Option<Arc<dyn GraphNode>> {
        Edge::owner(self)
    }
}
