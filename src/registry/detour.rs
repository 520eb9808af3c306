//! External hook table - the detour interception strategy.
//!
//! Hooks live outside the kind records, keyed by kind id, so even sealed
//! kinds can be intercepted without mutating them permanently. Every install
//! collects an uninstall callback; all pending callbacks run at shutdown,
//! before teardown invalidates the hooking facility.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::sync::Mutex;

use super::{ConstructHook, KindId};

static TABLE: OnceLock<Mutex<HashMap<KindId, ConstructHook>>> = OnceLock::new();

static UNINSTALLS: OnceLock<Mutex<Vec<Box<dyn FnOnce() + Send>>>> = OnceLock::new();

fn table() -> &'static Mutex<HashMap<KindId, ConstructHook>> {
    TABLE.get_or_init(|| Mutex::new(HashMap::new()))
}

fn uninstalls() -> &'static Mutex<Vec<Box<dyn FnOnce() + Send>>> {
    UNINSTALLS.get_or_init(|| Mutex::new(Vec::new()))
}

/// Redirect constructions of `kind` through `hook` and collect the matching
/// uninstall callback.
pub(crate) fn install(kind: KindId, hook: ConstructHook) {
    table().lock().insert(kind, hook);
    uninstalls().lock().push(Box::new(move || {
        table().lock().remove(&kind);
    }));
}

/// The hook currently redirecting `kind`, if any.
pub(crate) fn lookup(kind: KindId) -> Option<ConstructHook> {
    table().lock().get(&kind).cloned()
}

/// Number of uninstall callbacks not yet run.
pub(crate) fn pending_uninstalls() -> usize {
    uninstalls().lock().len()
}

/// Run and drain every pending uninstall callback.
pub(crate) fn run_uninstalls() {
    // Drain under this lock, run outside it; callbacks take the table lock.
    let pending: Vec<_> = uninstalls().lock().drain(..).collect();
    #[cfg(feature = "log")]
    log::debug!("stacksnap: running {} detour uninstalls", pending.len());
    for uninstall in pending {
        uninstall();
    }
}
