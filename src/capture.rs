//! Frame snapshot capturer.
//!
//! Walks the current thread's scope stack from the innermost scope outward
//! and returns an owned, ordered snapshot. A thread-local reentrancy flag
//! suppresses capture triggered from inside an in-progress capture - that is
//! what prevents infinite recursion when the capture path itself constructs
//! an error. Capture on other threads proceeds independently.

use std::cell::Cell;

use crate::gate;
use crate::scope::{self, FrameRecord};

/// Internal scope names skipped at the head of a snapshot: machinery frames
/// are never user-relevant. Normally the crate's own code pushes no scopes,
/// so this list only matters when a host embeds capture inside its own
/// instrumented wrappers.
const IGNORED_FRAME_NAMES: &[&str] = &["__attach__", "__capture__"];

thread_local! {
    static IN_CAPTURE: Cell<bool> = const { Cell::new(false) };
}

/// Resets the reentrancy flag on drop, so the flag is released even when a
/// frame walk unwinds.
struct ReentrancyGuard;

impl ReentrancyGuard {
    /// Claim the flag.  `None` if this thread is already capturing.
    fn claim() -> Option<Self> {
        IN_CAPTURE.with(|flag| {
            if flag.get() {
                None
            } else {
                flag.set(true);
                Some(ReentrancyGuard)
            }
        })
    }
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        IN_CAPTURE.with(|flag| flag.set(false));
    }
}

/// An ordered sequence of frame records, innermost (point of failure) first.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    frames: Vec<FrameRecord>,
}

impl Snapshot {
    /// An empty snapshot: capture ran but found no eligible frames.
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_frames(frames: Vec<FrameRecord>) -> Self {
        Self { frames }
    }

    /// The captured frames, innermost first.
    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    /// Whether no frames were captured.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of captured frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

/// Capture the current thread's scope stack.
///
/// `start` is the number of innermost scopes to skip (0 captures everything
/// that is open). Returns `None` when capture is suppressed: the gate is
/// disabled or this thread is already inside a capture. An offset past the
/// top of the stack degrades to an empty snapshot.
pub fn capture_now(start: usize) -> Option<Snapshot> {
    if !gate::is_enabled() {
        return None;
    }
    let _guard = ReentrancyGuard::claim()?;

    let mut frames = match scope::snapshot_frames(start) {
        Some(frames) => frames,
        None => return Some(Snapshot::empty()),
    };

    // Skip leading machinery frames so the snapshot starts at user code.
    let skip = frames
        .iter()
        .take_while(|f| IGNORED_FRAME_NAMES.contains(&f.code_name.as_str()))
        .count();
    frames.drain(..skip);

    Some(Snapshot::from_frames(frames))
}

/// Run `f` with the reentrancy flag held, as an in-progress capture would.
#[cfg(test)]
pub(crate) fn with_reentrancy_flag<R>(f: impl FnOnce() -> R) -> R {
    let _guard = ReentrancyGuard::claim().expect("reentrancy flag already held");
    f()
}
