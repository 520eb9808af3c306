//! # stacksnap
//!
//! Capture program state at the moment an error value is *constructed*, not
//! where it is caught, so diagnostic output reflects the state at the point
//! of failure rather than after unwinding.
//!
//! ## How it works
//!
//! - Code pushes named scopes ([`snap_scope!`]) and records local values into
//!   them ([`snap_record!`]); modules register globals ([`snap_global!`]).
//! - Error kinds are registered into a process-wide kind registry
//!   ([`register_kind`]). [`init`] walks the kind graph breadth-first and
//!   installs a post-construction hook on every kind.
//! - Wrapping a payload in [`Traced`] runs the installed hook, which attaches
//!   a snapshot of the current thread's scope stack exactly once. A native
//!   backtrace recorded at construction serves as the rendering fallback.
//! - [`render`] formats a snapshot (or the fallback trace) as per-frame local
//!   variable listings, with globals printed once per module context.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stacksnap::{SnapConfig, Traced};
//!
//! #[derive(Debug)]
//! struct ParseFailed(String);
//! # impl std::fmt::Display for ParseFailed {
//! #     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
//! # }
//! # impl std::error::Error for ParseFailed {}
//!
//! stacksnap::register_kind::<ParseFailed>("ParseFailed", Some(stacksnap::root_kind()));
//! stacksnap::init(SnapConfig::default());
//!
//! fn parse(input: &str) -> Result<u32, Traced<ParseFailed>> {
//!     let _scope = stacksnap::snap_scope!("parse");
//!     stacksnap::snap_record!(input);
//!     Err(Traced::new(ParseFailed(format!("bad input: {input}"))))
//! }
//!
//! if let Err(err) = parse("oops") {
//!     stacksnap::render(&err, &mut std::io::stderr().lock(), &Default::default()).ok();
//! }
//! ```

pub mod capture;
pub mod gate;
pub mod globals;
pub mod hook;
pub mod registry;
pub mod render;
pub mod scope;
pub mod traced;
pub mod value;

mod config;
mod error;
mod macros;
mod shutdown;
mod sync;

// Core capture
pub use capture::{capture_now, Snapshot};
pub use scope::{record, FrameRecord, ScopeGuard};
pub use value::{ValueKind, ValueRepr};

// Enablement gate
pub use gate::{disable, enable, is_enabled, is_finalizing, is_initialized};

// Kind registry
pub use registry::{
    install, install_all, kind_of, register_kind, root_kind, InstallStrategy, KindId,
};

// Traced errors
pub use traced::{Snapshotted, Traced};

// Rendering
pub use render::{render, render_caught, render_current, RenderOptions};

// Global hook manager
pub use hook::{install_panic_hook, remove_panic_hook};

// Lifecycle
pub use config::{init, init_default, SnapConfig};
pub use error::SnapError;
pub use shutdown::{shutdown, shutdown_guard, ShutdownGuard};
