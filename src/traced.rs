//! The traced error wrapper - where snapshots get attached.
//!
//! `Traced<E>` is the crate's construction path: wrapping a payload runs the
//! hook installed for the payload's registered kind, which attaches a scope
//! snapshot exactly once. A native backtrace recorded at construction serves
//! as the propagation-trace fallback for rendering when no snapshot exists
//! (kind unregistered, capture disabled, or capture suppressed).

use std::fmt;

use backtrace::Backtrace;

use crate::capture::Snapshot;
use crate::registry;
use crate::scope::FrameRecord;

/// Native symbol prefixes skipped at the head of fallback frames, so the
/// listing starts at user code rather than capture machinery.
const INTERNAL_SYMBOL_PREFIXES: &[&str] = &[
    "backtrace::",
    "stacksnap::traced",
    "stacksnap::capture",
    "std::panicking",
    "core::panicking",
];

/// Anything the renderer can draw a stack from.
pub trait Snapshotted {
    /// The scope snapshot attached at construction, if any.
    fn snapshot(&self) -> Option<&Snapshot>;

    /// Resolved native frames from the propagation trace, innermost first,
    /// with leading machinery frames skipped. May be empty.
    fn origin_frames(&self) -> Vec<FrameRecord>;
}

/// An error payload with state captured at construction time.
pub struct Traced<E> {
    inner: E,
    snapshot: Option<Snapshot>,
    origin: Backtrace,
}

impl<E: 'static> Traced<E> {
    /// Wrap `inner`, running the construction hook registered for `E`'s
    /// kind. The snapshot is attached here or never.
    pub fn new(inner: E) -> Self {
        let mut snapshot = None;
        if let Some(kind) = registry::kind_of::<E>() {
            registry::run_hook(kind, &mut snapshot);
        }
        Self {
            inner,
            snapshot,
            // Unresolved is cheap; symbols resolve on a clone at render time.
            origin: Backtrace::new_unresolved(),
        }
    }

    /// Convert the payload while keeping the captured state.
    ///
    /// The hook for the target kind still runs, but a non-empty snapshot
    /// from the original construction is never overwritten.
    pub fn map<F: 'static>(self, f: impl FnOnce(E) -> F) -> Traced<F> {
        let mut snapshot = self.snapshot;
        if let Some(kind) = registry::kind_of::<F>() {
            registry::run_hook(kind, &mut snapshot);
        }
        Traced {
            inner: f(self.inner),
            snapshot,
            origin: self.origin,
        }
    }

    /// The wrapped payload.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Unwrap the payload, releasing the snapshot and its recorded state.
    pub fn into_inner(self) -> E {
        self.inner
    }

    /// Drop the attached snapshot in place.
    ///
    /// Snapshots hold clones of recorded variable representations; hosts
    /// that keep errors alive long after rendering can release that state
    /// without unwrapping.
    pub fn release_snapshot(&mut self) {
        self.snapshot = None;
    }
}

impl<E: 'static> Snapshotted for Traced<E> {
    fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    fn origin_frames(&self) -> Vec<FrameRecord> {
        let mut resolved = self.origin.clone();
        resolved.resolve();

        let mut frames = Vec::new();
        for frame in resolved.frames() {
            for symbol in frame.symbols() {
                let name = match symbol.name() {
                    Some(name) => name.to_string(),
                    None => continue,
                };
                let file = symbol
                    .filename()
                    .and_then(|path| path.file_name())
                    .map(|base| base.to_string_lossy().into_owned())
                    .unwrap_or_default();
                frames.push(FrameRecord::bare(name, file, symbol.lineno()));
            }
        }

        let skip = frames
            .iter()
            .take_while(|f| {
                INTERNAL_SYMBOL_PREFIXES
                    .iter()
                    .any(|prefix| f.code_name.starts_with(prefix))
            })
            .count();
        frames.drain(..skip);
        frames
    }
}

impl<E: fmt::Debug> fmt::Debug for Traced<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traced")
            .field("inner", &self.inner)
            .field(
                "snapshot",
                &self.snapshot.as_ref().map(|snap| snap.len()),
            )
            .finish_non_exhaustive()
    }
}

impl<E: fmt::Display> fmt::Display for Traced<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl<E: std::error::Error + 'static> std::error::Error for Traced<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

impl<E: 'static> From<E> for Traced<E> {
    fn from(inner: E) -> Self {
        Traced::new(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{install, register_kind};
    use crate::scope::ScopeGuard;
    use crate::value::ValueRepr;

    #[derive(Debug)]
    struct Boom(&'static str);

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom: {}", self.0)
        }
    }

    impl std::error::Error for Boom {}

    fn installed_boom_kind() -> crate::KindId {
        let kind = register_kind::<Boom>("traced::tests::Boom", None);
        install(kind);
        kind
    }

    #[test]
    fn test_snapshot_attached_at_construction() {
        let _lock = crate::gate::test_guard();
        crate::gate::reset_for_tests();
        installed_boom_kind();

        let _scope = ScopeGuard::enter("failing_fn", "traced.rs", 1, module_path!());
        crate::scope::record("n", ValueRepr::plain(&42));

        let err = Traced::new(Boom("x"));
        let snap = err.snapshot().expect("snapshot missing");
        assert_eq!(snap.frames()[0].code_name, "failing_fn");
        assert_eq!(snap.frames()[0].locals["n"].repr, "42");
    }

    #[test]
    fn test_disabled_gate_means_absent_not_empty() {
        let _lock = crate::gate::test_guard();
        crate::gate::reset_for_tests();
        installed_boom_kind();

        crate::gate::disable();
        let err = Traced::new(Boom("x"));
        assert!(err.snapshot().is_none());
        crate::gate::reset_for_tests();
    }

    #[test]
    fn test_unregistered_payload_gets_no_snapshot() {
        let _lock = crate::gate::test_guard();
        crate::gate::reset_for_tests();

        #[derive(Debug)]
        struct Unregistered;
        let err = Traced::new(Unregistered);
        assert!(err.snapshot().is_none());
    }

    #[test]
    fn test_map_preserves_snapshot() {
        let _lock = crate::gate::test_guard();
        crate::gate::reset_for_tests();
        installed_boom_kind();

        let _scope = ScopeGuard::enter("origin_fn", "traced.rs", 1, module_path!());
        let err = Traced::new(Boom("first"));
        let original_frame = err.snapshot().unwrap().frames()[0].code_name.clone();

        // Chained construction must not overwrite the original snapshot.
        let _inner = ScopeGuard::enter("rewrap_fn", "traced.rs", 2, module_path!());
        let mapped = err.map(|b| Boom(b.0));
        assert_eq!(
            mapped.snapshot().unwrap().frames()[0].code_name,
            original_frame
        );
    }

    #[test]
    fn test_reentrant_construction_gets_absent_snapshot() {
        let _lock = crate::gate::test_guard();
        crate::gate::reset_for_tests();
        installed_boom_kind();

        let _scope = ScopeGuard::enter("f", "traced.rs", 1, module_path!());
        crate::capture::with_reentrancy_flag(|| {
            let err = Traced::new(Boom("inner"));
            assert!(err.snapshot().is_none());
        });
    }

    #[test]
    fn test_release_snapshot() {
        let _lock = crate::gate::test_guard();
        crate::gate::reset_for_tests();
        installed_boom_kind();

        let _scope = ScopeGuard::enter("f", "traced.rs", 1, module_path!());
        let mut err = Traced::new(Boom("x"));
        assert!(err.snapshot().is_some());
        err.release_snapshot();
        assert!(err.snapshot().is_none());
    }

    #[test]
    fn test_error_impl_delegates() {
        let err = Traced::new(Boom("io"));
        assert_eq!(err.to_string(), "boom: io");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn test_origin_frames_resolve() {
        let err = Traced::new(Boom("x"));
        // Frame content is platform-dependent; only shape is asserted.
        let frames = err.origin_frames();
        for frame in &frames {
            assert!(!frame.code_name.is_empty());
            assert!(frame.is_bare());
        }
    }
}
