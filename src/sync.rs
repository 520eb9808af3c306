//! Mutex wrapper - uses parking_lot if available, std otherwise.
//!
//! Capture is not a hot path; correctness over throughput. The std variant
//! treats poisoning as unrecoverable since a panic while holding any of the
//! crate's locks means the registry or gate is in an unknown state.

#[cfg(feature = "parking_lot")]
pub(crate) use parking_lot::Mutex;

#[cfg(not(feature = "parking_lot"))]
mod std_mutex {
    use std::sync::{Mutex as StdMutex, MutexGuard as StdMutexGuard};

    /// Thin wrapper around std::sync::Mutex with parking_lot's lock() shape.
    pub struct Mutex<T>(StdMutex<T>);

    impl<T> Mutex<T> {
        /// Create a new mutex.
        pub const fn new(value: T) -> Self {
            Self(StdMutex::new(value))
        }

        /// Lock the mutex.
        pub fn lock(&self) -> MutexGuard<'_, T> {
            MutexGuard(self.0.lock().expect("stacksnap mutex poisoned"))
        }
    }

    /// Guard for std mutex.
    pub struct MutexGuard<'a, T>(StdMutexGuard<'a, T>);

    impl<T> std::ops::Deref for MutexGuard<'_, T> {
        type Target = T;

        fn deref(&self) -> &Self::Target {
            &self.0
        }
    }

    impl<T> std::ops::DerefMut for MutexGuard<'_, T> {
        fn deref_mut(&mut self) -> &mut Self::Target {
            &mut self.0
        }
    }
}

#[cfg(not(feature = "parking_lot"))]
pub(crate) use std_mutex::Mutex;
