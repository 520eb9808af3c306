//! Process-wide error-kind registry.
//!
//! Error kinds form a rooted graph: every kind names a parent, with a single
//! built-in root at the top. Kinds are registered at runtime (keyed by the
//! Rust type that carries them), and the installer walks the graph
//! breadth-first to patch a construction hook onto each kind. Kinds
//! registered after a walk are not patched until [`install_all`] runs again.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock};

use crate::capture::Snapshot;
use crate::sync::Mutex;

mod install;

#[cfg(feature = "detour")]
pub(crate) mod detour;

pub use install::{default_ignored, install, install_all, InstallStrategy};

/// Opaque identifier of a registered error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KindId(u32);

/// Hook replacement on the kind record is forbidden while set. Built-in
/// kinds start sealed; the installer unseals, patches, and restores the
/// prior flags with this bit still cleared.
pub(crate) const KIND_SEALED: u32 = 1 << 8;

/// The kind was created (or patched) at runtime.
pub(crate) const KIND_DYNAMIC: u32 = 1 << 9;

/// A construction hook: given the new instance's snapshot slot, attach a
/// capture unless the slot already holds a non-empty snapshot.
pub(crate) type ConstructHook = Arc<dyn Fn(&mut Option<Snapshot>) + Send + Sync>;

/// One registered kind.
pub(crate) struct KindRecord {
    name: &'static str,
    parent: Option<KindId>,
    flags: AtomicU32,
    hook: Mutex<Option<ConstructHook>>,
}

impl KindRecord {
    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn flags(&self) -> u32 {
        self.flags.load(Ordering::Acquire)
    }

    pub(crate) fn set_flags(&self, flags: u32) {
        self.flags.store(flags, Ordering::Release);
    }

    /// Replace the construction hook. Panics on a sealed kind: that is a
    /// programmer error in the installer, not a runtime condition.
    pub(crate) fn set_hook(&self, hook: ConstructHook) {
        assert!(
            self.flags() & KIND_SEALED == 0,
            "hook replaced on sealed kind `{}`",
            self.name
        );
        *self.hook.lock() = Some(hook);
    }

    pub(crate) fn hook(&self) -> Option<ConstructHook> {
        self.hook.lock().clone()
    }
}

struct Registry {
    kinds: Vec<Arc<KindRecord>>,
    by_type: HashMap<TypeId, KindId>,
    by_name: HashMap<&'static str, KindId>,
}

impl Registry {
    fn with_root() -> Self {
        let mut registry = Self {
            kinds: Vec::new(),
            by_type: HashMap::new(),
            by_name: HashMap::new(),
        };
        // The root kind anchors the graph; it has no carrier type and
        // starts sealed like the built-ins.
        registry.push(None, "Error", None, KIND_SEALED);
        registry
    }

    fn push(
        &mut self,
        type_id: Option<TypeId>,
        name: &'static str,
        parent: Option<KindId>,
        flags: u32,
    ) -> KindId {
        let id = KindId(self.kinds.len() as u32);
        self.kinds.push(Arc::new(KindRecord {
            name,
            parent,
            flags: AtomicU32::new(flags),
            hook: Mutex::new(None),
        }));
        if let Some(type_id) = type_id {
            self.by_type.insert(type_id, id);
        }
        self.by_name.insert(name, id);
        id
    }
}

static REGISTRY: OnceLock<Mutex<Registry>> = OnceLock::new();

fn registry() -> &'static Mutex<Registry> {
    REGISTRY.get_or_init(|| Mutex::new(Registry::with_root()))
}

/// The root of the kind graph.
pub fn root_kind() -> KindId {
    let _ = registry();
    KindId(0)
}

/// Register an error kind carried by `T` under `parent` (the root when
/// `None`). Idempotent: re-registering the same type returns its existing
/// id without touching flags or hooks.
pub fn register_kind<T: 'static>(name: &'static str, parent: Option<KindId>) -> KindId {
    register_with_flags::<T>(name, parent, KIND_DYNAMIC)
}

/// Register a sealed (built-in style) kind.
pub(crate) fn register_sealed<T: 'static>(name: &'static str, parent: Option<KindId>) -> KindId {
    register_with_flags::<T>(name, parent, KIND_SEALED)
}

fn register_with_flags<T: 'static>(
    name: &'static str,
    parent: Option<KindId>,
    flags: u32,
) -> KindId {
    let type_id = TypeId::of::<T>();
    let mut registry = registry().lock();
    if let Some(&id) = registry.by_type.get(&type_id) {
        return id;
    }
    let parent = Some(parent.unwrap_or(KindId(0)));
    registry.push(Some(type_id), name, parent, flags)
}

/// Look up the kind registered for `T`, if any.
pub fn kind_of<T: 'static>() -> Option<KindId> {
    registry().lock().by_type.get(&TypeId::of::<T>()).copied()
}

/// Look up a kind by its registered name.
pub fn kind_named(name: &str) -> Option<KindId> {
    registry().lock().by_name.get(name).copied()
}

pub(crate) fn record(kind: KindId) -> Arc<KindRecord> {
    registry().lock().kinds[kind.0 as usize].clone()
}

/// Direct children of `kind`, in registration order.
pub(crate) fn children(kind: KindId) -> Vec<KindId> {
    let registry = registry().lock();
    (0..registry.kinds.len() as u32)
        .map(KindId)
        .filter(|id| registry.kinds[id.0 as usize].parent == Some(kind))
        .collect()
}

/// Run the construction hook installed for `kind`, if any. Detour-table
/// hooks shadow hooks stored on the record.
pub(crate) fn run_hook(kind: KindId, slot: &mut Option<Snapshot>) {
    #[cfg(feature = "detour")]
    if let Some(hook) = detour::lookup(kind) {
        hook(slot);
        return;
    }
    if let Some(hook) = record(kind).hook() {
        hook(slot);
    }
}

/// Pre-register a set of std error kinds, sealed, under the root.
///
/// Hosts get snapshots on `Traced<std::io::Error>` and friends without
/// registering anything themselves.
pub(crate) fn ensure_builtin_kinds() {
    let root = root_kind();
    register_sealed::<std::io::Error>("std::io::Error", Some(root));
    register_sealed::<std::fmt::Error>("std::fmt::Error", Some(root));
    register_sealed::<std::num::ParseIntError>("std::num::ParseIntError", Some(root));
    register_sealed::<std::num::ParseFloatError>("std::num::ParseFloatError", Some(root));
    register_sealed::<std::str::Utf8Error>("std::str::Utf8Error", Some(root));
}
