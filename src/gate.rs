//! Process-wide enablement gate for snapshot capture.
//!
//! A single mutex guards the flag; reads take it too. Simple correctness
//! over throughput - capture is not a hot path. Separate atomics track
//! whether `init` has run (enabling before that is a usage error) and
//! whether the process is finalizing (hooks stop attaching then).

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::SnapError;
use crate::sync::Mutex;

/// Enabled by default, matching capture-on from the first `init`.
static ENABLED: Mutex<bool> = Mutex::new(true);

static INITIALIZED: AtomicBool = AtomicBool::new(false);

static FINALIZING: AtomicBool = AtomicBool::new(false);

/// Enable snapshot capture.
///
/// Fails with [`SnapError::NotInitialized`] if [`crate::init`] has not run;
/// the gate is left unchanged in that case.
pub fn enable() -> Result<(), SnapError> {
    if !INITIALIZED.load(Ordering::Acquire) {
        return Err(SnapError::NotInitialized);
    }
    *ENABLED.lock() = true;
    Ok(())
}

/// Disable snapshot capture. Always permitted.
pub fn disable() {
    *ENABLED.lock() = false;
}

/// Whether capture is currently enabled.
pub fn is_enabled() -> bool {
    *ENABLED.lock()
}

/// Mark global initialization as done.
pub(crate) fn mark_initialized() {
    INITIALIZED.store(true, Ordering::Release);
}

/// Whether `init` has run.
pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::Acquire)
}

/// Mark the process as finalizing; construction hooks stop attaching.
pub(crate) fn mark_finalizing() {
    FINALIZING.store(true, Ordering::Release);
}

/// Whether shutdown has begun.
pub fn is_finalizing() -> bool {
    FINALIZING.load(Ordering::Acquire)
}

#[cfg(test)]
pub(crate) fn reset_for_tests() {
    *ENABLED.lock() = true;
    FINALIZING.store(false, Ordering::Release);
}

/// Unit tests toggling process-global state serialize on this lock.
#[cfg(test)]
pub(crate) static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
pub(crate) fn test_guard() -> std::sync::MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enable_before_init_is_an_error() {
        let _lock = test_guard();
        // Meaningful only before another test initializes this process; the
        // `enable_before_init` integration binary covers the strict ordering.
        if !is_initialized() {
            assert!(matches!(enable(), Err(SnapError::NotInitialized)));
            assert!(is_enabled(), "failed enable must leave the gate unchanged");
        }
    }

    #[test]
    fn test_disable_then_reenable() {
        let _lock = test_guard();
        reset_for_tests();
        mark_initialized();

        disable();
        assert!(!is_enabled());

        enable().unwrap();
        assert!(is_enabled());
    }
}
