//! Process shutdown - detour uninstallation and the finalizing flag.
//!
//! Pending detour uninstalls must run before teardown invalidates the
//! hooking facility. Rust has no portable process-exit callback in std, so
//! shutdown is explicit: call [`shutdown`] late in `main`, or hold a
//! [`ShutdownGuard`] for the life of the program. Running it is armed once,
//! no matter how many kinds get patched, and it executes at most once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

use crate::gate;

/// Set by the first detour install; makes `shutdown` log when it has
/// nothing to do versus when it was never needed.
static ARMED: AtomicBool = AtomicBool::new(false);

static RUN: Once = Once::new();

/// Arm the shutdown runner. Called on the first detour install; later
/// installs find it already armed.
pub(crate) fn arm() {
    if !ARMED.swap(true, Ordering::AcqRel) {
        #[cfg(feature = "log")]
        log::debug!("stacksnap: shutdown runner armed");
    }
}

/// Run shutdown: mark the process finalizing (construction hooks stop
/// attaching) and uninstall all pending detour hooks. Idempotent; only the
/// first call does anything.
pub fn shutdown() {
    RUN.call_once(|| {
        gate::mark_finalizing();

        #[cfg(feature = "detour")]
        if ARMED.load(Ordering::Acquire) {
            crate::registry::detour::run_uninstalls();
        }

        #[cfg(feature = "log")]
        log::debug!("stacksnap: shutdown complete");
    });
}

/// RAII handle that runs [`shutdown`] when dropped.
#[must_use = "the guard runs shutdown when dropped; bind it with `let`"]
pub struct ShutdownGuard {
    _priv: (),
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        shutdown();
    }
}

/// A guard that runs [`shutdown`] at the end of its scope, typically the
/// whole of `main`.
pub fn shutdown_guard() -> ShutdownGuard {
    ShutdownGuard { _priv: () }
}
