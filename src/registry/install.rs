//! Interception installer and registry walker.
//!
//! Patches a construction hook onto registered kinds so every future
//! `Traced` construction of that kind attaches a snapshot. Two strategies:
//! *direct* stores the hook on the kind record itself; *detour* (the
//! `detour` feature, default) routes through an external hook table whose
//! entries are uninstalled at shutdown. The strategy is fixed at compile
//! time by the feature set.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use crate::capture::{self, Snapshot};
use crate::gate;
use crate::sync::Mutex;

use super::{ConstructHook, KindId, KIND_DYNAMIC, KIND_SEALED};

/// How hooks are attached to kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallStrategy {
    /// Store the hook on the kind record.
    Direct,
    /// Route through the external detour table; requires the `detour`
    /// feature and supports uninstallation at shutdown.
    Detour,
}

impl InstallStrategy {
    /// The strategy selected for this build.
    pub fn selected() -> Self {
        if cfg!(feature = "detour") {
            InstallStrategy::Detour
        } else {
            InstallStrategy::Direct
        }
    }
}

/// Capture offset used by construction hooks. The crate's machinery pushes
/// no scope frames, so hooks always capture the full open stack; `start`
/// offsets count caller-pushed scopes only. One convention for both
/// strategies.
const ATTACH_OFFSET: usize = 0;

/// Kinds already patched. Plain set: kinds live for the whole process, so
/// nothing here needs weak tracking.
static INSTALLED: OnceLock<Mutex<HashSet<KindId>>> = OnceLock::new();

fn installed() -> &'static Mutex<HashSet<KindId>> {
    INSTALLED.get_or_init(|| Mutex::new(HashSet::new()))
}

pub(crate) fn is_installed(kind: KindId) -> bool {
    installed().lock().contains(&kind)
}

fn make_hook() -> ConstructHook {
    Arc::new(|slot: &mut Option<Snapshot>| {
        // Attach at most once: a non-empty snapshot from an earlier
        // construction path is never overwritten.
        let already = slot.as_ref().is_some_and(|snap| !snap.is_empty());
        if !already && !gate::is_finalizing() {
            *slot = capture::capture_now(ATTACH_OFFSET);
        }
    })
}

/// Install the construction hook for one kind. Idempotent; the kind is
/// recorded as installed *before* patching so a re-entrant walk cannot
/// double-wrap it.
pub fn install(kind: KindId) {
    install_with(kind, InstallStrategy::selected());
}

pub(crate) fn install_with(kind: KindId, strategy: InstallStrategy) {
    if !installed().lock().insert(kind) {
        return;
    }

    let record = super::record(kind);
    let prev_flags = record.flags();
    record.set_flags((prev_flags | KIND_DYNAMIC) & !KIND_SEALED);

    match strategy {
        InstallStrategy::Direct => record.set_hook(make_hook()),
        InstallStrategy::Detour => {
            #[cfg(feature = "detour")]
            {
                super::detour::install(kind, make_hook());
                crate::shutdown::arm();
            }
            #[cfg(not(feature = "detour"))]
            record.set_hook(make_hook());
        }
    }

    // Restore the prior flags minus the sealed bit: the kind must end up
    // patchable for bookkeeping, not bit-for-bit identical to before.
    record.set_flags(prev_flags & !KIND_SEALED);

    #[cfg(feature = "log")]
    log::debug!(
        "stacksnap: installed {:?} hook for kind `{}`",
        strategy,
        record.name()
    );
    #[cfg(not(feature = "log"))]
    let _ = record.name();
}

/// Walk the kind graph breadth-first from the root and install every kind
/// not in `ignored`. Kinds registered after the walk are picked up by the
/// next call.
pub fn install_all(ignored: &[KindId]) {
    let mut queue = std::collections::VecDeque::new();
    queue.push_back(super::root_kind());
    while let Some(kind) = queue.pop_front() {
        queue.extend(super::children(kind));
        if !ignored.contains(&kind) {
            install(kind);
        }
    }
}

/// The default ignore set for [`install_all`].
///
/// Without the detour facility the root kind must stay unpatched (directly
/// hooking the graph root recurses through every construction path, a known
/// limitation); with it, nothing is ignored.
pub fn default_ignored() -> Vec<KindId> {
    match InstallStrategy::selected() {
        InstallStrategy::Direct => vec![super::root_kind()],
        InstallStrategy::Detour => Vec::new(),
    }
}
