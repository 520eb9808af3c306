//! Crate error types.

/// Usage errors surfaced by the crate's own API.
///
/// Runtime capture failures never show up here: capture degrades to an empty
/// or absent snapshot instead of failing, so it can never be the cause of a
/// new failure during failure handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SnapError {
    /// `enable()` was called before `init()`.
    #[error("capture must be initialized before it can be enabled; call init() first")]
    NotInitialized,
}
