//! Value representations recorded into scopes.
//!
//! Scope frames die with their stack, so values are formatted eagerly into
//! owned strings at record time; snapshots never borrow from live frames.

use std::borrow::Cow;
use std::fmt::Debug;

/// Classification of a recorded value.
///
/// Used by the brief-mode globals filter: functions, modules, built-ins and
/// types are considered noise when reading a state dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// An ordinary data value (the only kind brief mode keeps).
    Plain,
    /// A user-defined function.
    Function,
    /// A built-in / foreign function.
    Builtin,
    /// A module reference.
    Module,
    /// A type object.
    Type,
}

impl ValueKind {
    /// Whether brief mode filters this kind out of globals listings.
    pub fn is_noise(self) -> bool {
        !matches!(self, ValueKind::Plain)
    }
}

/// An eagerly formatted representation of a recorded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRepr {
    /// Classification for filtering.
    pub kind: ValueKind,
    /// Full `Debug` representation; truncation happens at render time.
    pub repr: String,
}

impl ValueRepr {
    /// Record a plain data value from its `Debug` form.
    pub fn plain(value: &dyn Debug) -> Self {
        Self {
            kind: ValueKind::Plain,
            repr: format!("{value:?}"),
        }
    }

    /// Build a representation with an explicit kind.
    pub fn with_kind(kind: ValueKind, repr: impl Into<String>) -> Self {
        Self {
            kind,
            repr: repr.into(),
        }
    }

    /// Placeholder representation for a function named `name`.
    pub fn function(name: &str) -> Self {
        Self::with_kind(ValueKind::Function, format!("<function {name}>"))
    }

    /// Placeholder representation for a module named `name`.
    pub fn module(name: &str) -> Self {
        Self::with_kind(ValueKind::Module, format!("<module {name}>"))
    }

    /// Placeholder representation for a type named `name`.
    pub fn type_object(name: &str) -> Self {
        Self::with_kind(ValueKind::Type, format!("<type {name}>"))
    }
}

/// Dunder-named globals that brief mode keeps (informational, not noise).
pub const DUNDER_ALLOWLIST: &[&str] = &["__name__", "__file__", "__version__"];

/// Whether `name` is a dunder name (`__x__`).
pub fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

/// Truncate a representation to at most `max` characters.
///
/// Operates on char boundaries and never panics; truncated output carries a
/// `...` suffix. `max == 0` disables truncation.
pub fn truncate_repr(repr: &str, max: usize) -> Cow<'_, str> {
    if max == 0 || repr.chars().count() <= max {
        return Cow::Borrowed(repr);
    }
    let mut out: String = repr.chars().take(max).collect();
    out.push_str("...");
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_repr_uses_debug() {
        let v = ValueRepr::plain(&42);
        assert_eq!(v.repr, "42");
        assert_eq!(v.kind, ValueKind::Plain);

        let s = ValueRepr::plain(&"abc");
        assert_eq!(s.repr, "\"abc\"");
    }

    #[test]
    fn test_noise_kinds() {
        assert!(!ValueKind::Plain.is_noise());
        assert!(ValueKind::Function.is_noise());
        assert!(ValueKind::Builtin.is_noise());
        assert!(ValueKind::Module.is_noise());
        assert!(ValueKind::Type.is_noise());
    }

    #[test]
    fn test_truncate_short_is_borrowed() {
        let r = truncate_repr("short", 10);
        assert_eq!(r, "short");
        assert!(matches!(r, Cow::Borrowed(_)));
    }

    #[test]
    fn test_truncate_long() {
        assert_eq!(truncate_repr("abcdefgh", 4), "abcd...");
    }

    #[test]
    fn test_truncate_multibyte_boundary() {
        // Must cut on char boundaries, not bytes.
        assert_eq!(truncate_repr("αβγδε", 3), "αβγ...");
    }

    #[test]
    fn test_truncate_zero_disables() {
        assert_eq!(truncate_repr("abcdefgh", 0), "abcdefgh");
    }

    #[test]
    fn test_dunder_detection() {
        assert!(is_dunder("__name__"));
        assert!(!is_dunder("name"));
        assert!(!is_dunder("____"));
        assert!(!is_dunder("__x"));
    }
}
