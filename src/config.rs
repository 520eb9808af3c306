//! One-time initialization and its configuration.

use crate::gate;
use crate::hook;
use crate::registry::{self, KindId};
use crate::render::RenderOptions;

/// Configuration for [`init`].
#[derive(Debug, Clone)]
pub struct SnapConfig {
    /// Kinds excluded from the install walk. Defaults to the strategy's
    /// ignore set (the root kind in direct mode, nothing in detour mode).
    pub ignored: Vec<KindId>,

    /// Rendering options used by the panic hook.
    pub render: RenderOptions,

    /// Whether to install the rendering panic hook.
    pub panic_hook: bool,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            ignored: registry::default_ignored(),
            render: RenderOptions::default(),
            panic_hook: true,
        }
    }
}

impl SnapConfig {
    /// Builder pattern: replace the ignore set.
    pub fn with_ignored(mut self, ignored: Vec<KindId>) -> Self {
        self.ignored = ignored;
        self
    }

    /// Builder pattern: add one kind to the ignore set.
    pub fn ignore(mut self, kind: KindId) -> Self {
        self.ignored.push(kind);
        self
    }

    /// Builder pattern: set rendering options.
    pub fn with_render(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    /// Builder pattern: skip the panic hook.
    pub fn without_panic_hook(mut self) -> Self {
        self.panic_hook = false;
        self
    }
}

/// One-time setup: seed the built-in kinds, walk the kind graph installing
/// construction hooks, and (by default) install the panic hook.
///
/// Idempotent: a second call re-walks the graph - picking up kinds
/// registered since - without double-patching anything. Must run before
/// [`crate::enable`].
pub fn init(config: SnapConfig) {
    registry::ensure_builtin_kinds();
    gate::mark_initialized();
    registry::install_all(&config.ignored);
    if config.panic_hook {
        hook::install_panic_hook(config.render);
    }

    #[cfg(feature = "log")]
    log::debug!("stacksnap: initialized");
}

/// [`init`] with the default configuration.
pub fn init_default() {
    init(SnapConfig::default());
}
