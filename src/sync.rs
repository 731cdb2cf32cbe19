#[cfg(feature = "loom")]
mod imp {
    pub(crate) use loom::{
        cell::UnsafeCell,
        sync::{
            Condvar, Mutex, RwLock,
            atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering},
        },
        thread,
    };
}

#[cfg(not(feature = "loom"))]
mod imp {
    pub(crate) use core::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
    pub(crate) use std::{
        sync::{Condvar, Mutex, RwLock},
        thread,
    };

    /// `core::cell::UnsafeCell` behind the closure-based access API of
    /// `loom::cell::UnsafeCell`, so call sites read identically under both
    /// backends. Dereferencing the raw pointer inside the closure is the
    /// caller's unsafe obligation.
    #[repr(transparent)]
    pub(crate) struct UnsafeCell<T>(core::cell::UnsafeCell<T>);

    impl<T> UnsafeCell<T> {
        pub(crate) fn new(value: T) -> Self {
            Self(core::cell::UnsafeCell::new(value))
        }

        pub(crate) fn with<R>(&self, f: impl FnOnce(*const T) -> R) -> R {
            f(self.0.get())
        }

        pub(crate) fn with_mut<R>(&self, f: impl FnOnce(*mut T) -> R) -> R {
            f(self.0.get())
        }
    }
}

pub(crate) use imp::*;
