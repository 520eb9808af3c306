//! Thread-local scope stack - the call-frame model snapshots are built from.
//!
//! Each thread keeps a stack of named scopes pushed by RAII guards. A scope
//! carries the code name and source file of the function that opened it, the
//! locals recorded into it so far, and a link to its module's globals table.
//! Capturing walks this stack from the innermost scope outward, which is the
//! crate's analog of following caller links up to the root frame.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::globals::{module_globals, ModuleGlobals};
use crate::value::ValueRepr;

/// One live scope on a thread's stack.
struct ScopeFrame {
    code_name: &'static str,
    file_name: &'static str,
    line: u32,
    locals: BTreeMap<String, ValueRepr>,
    globals: Option<Arc<ModuleGlobals>>,
    module_scope: bool,
}

/// An owned copy of one frame, as stored in a snapshot.
///
/// Snapshots outlive the scopes they were taken from, so records own their
/// data; only the globals table is shared (by `Arc`), which also lets the
/// renderer detect frames from the same module context.
#[derive(Debug, Clone)]
pub struct FrameRecord {
    /// Name of the function or scope this frame belongs to.
    pub code_name: String,
    /// Source file that opened the scope (basename is rendered).
    pub file_name: String,
    /// Source line, when known.
    pub line: Option<u32>,
    /// Recorded local variables, sorted by name.
    pub locals: BTreeMap<String, ValueRepr>,
    /// Module globals table linked to this frame, if any.
    pub globals: Option<Arc<ModuleGlobals>>,
    /// Whether this frame *is* the module scope (locals are the globals).
    pub module_scope: bool,
}

impl FrameRecord {
    /// A bare frame with no recorded variables (native fallback frames).
    pub fn bare(code_name: impl Into<String>, file_name: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            code_name: code_name.into(),
            file_name: file_name.into(),
            line,
            locals: BTreeMap::new(),
            globals: None,
            module_scope: false,
        }
    }

    /// Whether the frame carries nothing worth a variable listing.
    pub fn is_bare(&self) -> bool {
        self.locals.is_empty() && self.globals.is_none()
    }
}

impl From<&ScopeFrame> for FrameRecord {
    fn from(frame: &ScopeFrame) -> Self {
        Self {
            code_name: frame.code_name.to_string(),
            file_name: frame.file_name.to_string(),
            line: Some(frame.line),
            locals: frame.locals.clone(),
            globals: frame.globals.clone(),
            module_scope: frame.module_scope,
        }
    }
}

thread_local! {
    static SCOPE_STACK: RefCell<Vec<ScopeFrame>> = const { RefCell::new(Vec::new()) };
}

/// RAII guard for a named scope.
///
/// Pops its frame when dropped. Usually created through
/// [`crate::snap_scope!`], which fills in the source location and module
/// globals automatically.
pub struct ScopeGuard {
    _priv: (),
}

impl ScopeGuard {
    /// Push a scope frame and return its guard.
    pub fn enter(
        code_name: &'static str,
        file_name: &'static str,
        line: u32,
        module: &'static str,
    ) -> Self {
        SCOPE_STACK.with(|stack| {
            stack.borrow_mut().push(ScopeFrame {
                code_name,
                file_name,
                line,
                locals: BTreeMap::new(),
                globals: Some(module_globals(module)),
                module_scope: false,
            });
        });
        Self { _priv: () }
    }

    /// Push a module-scope frame: its "locals" are the module globals, so
    /// the renderer skips the locals section for it.
    pub fn enter_module(file_name: &'static str, line: u32, module: &'static str) -> Self {
        SCOPE_STACK.with(|stack| {
            stack.borrow_mut().push(ScopeFrame {
                code_name: "<module>",
                file_name,
                line,
                locals: BTreeMap::new(),
                globals: Some(module_globals(module)),
                module_scope: true,
            });
        });
        Self { _priv: () }
    }
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        SCOPE_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Record a named value into the innermost scope.
///
/// No-op when the current thread has no open scope. Re-recording the same
/// name overwrites the previous representation, like reassigning a local.
pub fn record(name: impl Into<String>, value: ValueRepr) {
    SCOPE_STACK.with(|stack| {
        if let Some(frame) = stack.borrow_mut().last_mut() {
            frame.locals.insert(name.into(), value);
        }
    });
}

/// Depth of the current thread's scope stack.
pub fn depth() -> usize {
    SCOPE_STACK.with(|stack| stack.borrow().len())
}

/// Copy the current thread's frames, innermost first, skipping the `skip`
/// innermost scopes. Returns `None` when `skip` exceeds the stack depth.
pub(crate) fn snapshot_frames(skip: usize) -> Option<Vec<FrameRecord>> {
    SCOPE_STACK.with(|stack| {
        let stack = stack.borrow();
        if skip > stack.len() {
            return None;
        }
        Some(
            stack[..stack.len() - skip]
                .iter()
                .rev()
                .map(FrameRecord::from)
                .collect(),
        )
    })
}
