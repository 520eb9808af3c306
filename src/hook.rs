//! Global hook manager - automatic rendering on unhandled panics.
//!
//! Installs a process-wide panic hook that prints a banner, the panic
//! summary, and the current-stack rendering. Install and remove are both
//! idempotent: hook lifecycle mistakes are common and non-destructive, so
//! no-ops beat errors here. Remove restores exactly the hook that was
//! active before install.

use std::io::Write;
use std::panic::PanicHookInfo;

use crate::render::{render_current, RenderOptions};
use crate::sync::Mutex;

type PanicHook = Box<dyn Fn(&PanicHookInfo<'_>) + Send + Sync + 'static>;

/// The hook that was active before ours; `Some` means ours is installed.
static PREVIOUS: Mutex<Option<PanicHook>> = Mutex::new(None);

/// Install the rendering panic hook. A second install while active is a
/// no-op.
pub fn install_panic_hook(options: RenderOptions) {
    let mut previous = PREVIOUS.lock();
    if previous.is_some() {
        return;
    }
    *previous = Some(std::panic::take_hook());

    std::panic::set_hook(Box::new(move |info| {
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "\n{0} Error: {0}", "-".repeat(20));
        let _ = writeln!(err, "{info}");
        let _ = writeln!(err);
        let _ = render_current(&mut err, &options);
        let _ = writeln!(err, "{}\n", "-".repeat(48));
    }));

    #[cfg(feature = "log")]
    log::debug!("stacksnap: panic hook installed");
}

/// Restore the hook that was active before [`install_panic_hook`] and clear
/// the saved reference. A no-op when nothing is installed.
pub fn remove_panic_hook() {
    let mut previous = PREVIOUS.lock();
    if let Some(saved) = previous.take() {
        // Discard our hook; put back exactly what was there before.
        let _ = std::panic::take_hook();
        std::panic::set_hook(saved);

        #[cfg(feature = "log")]
        log::debug!("stacksnap: panic hook removed");
    }
}

/// Whether the rendering panic hook is currently installed.
pub fn panic_hook_installed() -> bool {
    PREVIOUS.lock().is_some()
}
