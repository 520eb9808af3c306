//! Per-module globals registry - the module-scope half of a frame.
//!
//! Each module context owns one shared table; scope frames link to it by
//! `Arc`, so "two frames share a module context" is pointer identity. The
//! renderer uses that identity to print globals once per context instead of
//! once per frame.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};

use crate::sync::Mutex;
use crate::value::ValueRepr;

/// The globals table of one module context.
pub struct ModuleGlobals {
    module: &'static str,
    entries: Mutex<BTreeMap<String, ValueRepr>>,
}

impl ModuleGlobals {
    fn new(module: &'static str) -> Self {
        // Every context carries its own name, like an interpreter's
        // module-globals mapping would.
        let mut entries = BTreeMap::new();
        entries.insert(
            "__name__".to_string(),
            ValueRepr::with_kind(crate::value::ValueKind::Plain, format!("{module:?}")),
        );
        Self {
            module,
            entries: Mutex::new(entries),
        }
    }

    /// The module path this table belongs to.
    pub fn module(&self) -> &'static str {
        self.module
    }

    /// Insert or overwrite one entry.
    pub fn set(&self, name: impl Into<String>, value: ValueRepr) {
        self.entries.lock().insert(name.into(), value);
    }

    /// Clone the current entries, sorted by name.
    pub fn entries(&self) -> BTreeMap<String, ValueRepr> {
        self.entries.lock().clone()
    }

    /// Number of entries (including the auto-seeded `__name__`).
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the table holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl std::fmt::Debug for ModuleGlobals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleGlobals")
            .field("module", &self.module)
            .field("entries", &self.len())
            .finish()
    }
}

/// Process-wide registry of module globals tables.
static REGISTRY: OnceLock<Mutex<HashMap<&'static str, Arc<ModuleGlobals>>>> = OnceLock::new();

fn registry() -> &'static Mutex<HashMap<&'static str, Arc<ModuleGlobals>>> {
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Get (creating on first use) the globals table for `module`.
///
/// `module` is normally `module_path!()`; the [`crate::snap_global!`] and
/// [`crate::snap_scope!`] macros pass it implicitly.
pub fn module_globals(module: &'static str) -> Arc<ModuleGlobals> {
    let mut map = registry().lock();
    map.entry(module)
        .or_insert_with(|| Arc::new(ModuleGlobals::new(module)))
        .clone()
}

/// Register one global in `module`'s table.
pub fn register(module: &'static str, name: impl Into<String>, value: ValueRepr) {
    module_globals(module).set(name, value);
}

/// Whether two optional globals links refer to the same module context.
pub(crate) fn same_context(a: &Option<Arc<ModuleGlobals>>, b: &Option<Arc<ModuleGlobals>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
