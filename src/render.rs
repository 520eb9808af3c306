//! Stack renderer - turns snapshots into human-readable text.
//!
//! Snapshot frames are rendered as per-frame local-variable listings, with
//! the globals of a module context printed once at the outermost frame of
//! that context rather than repeated per frame. When an error carries no
//! snapshot the renderer falls back to its native propagation trace, and
//! when not even that yields frames it prints a one-line placeholder.

use std::io::{self, Write};

use crate::capture;
use crate::globals;
use crate::scope::FrameRecord;
use crate::traced::Snapshotted;
use crate::value::{is_dunder, truncate_repr, ValueRepr, DUNDER_ALLOWLIST};

/// Rendering options.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Maximum characters of a value representation (0 = unlimited).
    pub max_repr_len: usize,

    /// Brief mode: filter noise out of globals listings (dunder names
    /// outside the allow-list; function, built-in, module and type values).
    pub brief: bool,

    /// Cap on the variable-name column width, so one long name cannot
    /// degenerate the alignment of the whole listing.
    pub name_width_cap: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_repr_len: 120,
            brief: true,
            name_width_cap: 20,
        }
    }
}

impl RenderOptions {
    /// Builder pattern: set the value truncation length.
    pub fn with_max_repr_len(mut self, len: usize) -> Self {
        self.max_repr_len = len;
        self
    }

    /// Builder pattern: enable or disable brief mode.
    pub fn with_brief(mut self, brief: bool) -> Self {
        self.brief = brief;
        self
    }

    /// Builder pattern: set the name column width cap.
    pub fn with_name_width_cap(mut self, cap: usize) -> Self {
        self.name_width_cap = cap;
        self
    }
}

/// Render the stack of `err` into `out`.
///
/// Prefers the attached snapshot; falls back to the native propagation
/// trace; prints `No stack information.` when neither yields frames.
pub fn render(
    err: &dyn Snapshotted,
    out: &mut dyn Write,
    options: &RenderOptions,
) -> io::Result<()> {
    match err.snapshot() {
        Some(snapshot) if !snapshot.is_empty() => {
            render_frames(snapshot.frames(), out, options)
        }
        _ => {
            let frames = err.origin_frames();
            if frames.is_empty() {
                no_information(out)
            } else {
                render_frames(&frames, out, options)
            }
        }
    }
}

/// Render an error summary (message plus source chain) followed by its
/// stack. The catch-site counterpart of the automatic panic-hook output.
pub fn render_caught<E>(err: &E, out: &mut dyn Write, options: &RenderOptions) -> io::Result<()>
where
    E: Snapshotted + std::error::Error,
{
    writeln!(out)?;
    writeln!(out, "Error: {err}")?;
    let mut source = err.source();
    while let Some(cause) = source {
        writeln!(out, "Caused by: {cause}")?;
        source = cause.source();
    }
    writeln!(out)?;
    render(err, out, options)
}

/// Render a capture of the live scope stack, as the panic hook does.
///
/// There is no in-flight error object here; the current thread's open
/// scopes are the closest available picture of the failure in progress.
pub fn render_current(out: &mut dyn Write, options: &RenderOptions) -> io::Result<()> {
    match capture::capture_now(0) {
        Some(snapshot) if !snapshot.is_empty() => render_frames(snapshot.frames(), out, options),
        _ => no_information(out),
    }
}

fn no_information(out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "No stack information.")?;
    writeln!(out)
}

/// Display only the basename of a recorded source path.
fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

fn render_frames(
    frames: &[FrameRecord],
    out: &mut dyn Write,
    options: &RenderOptions,
) -> io::Result<()> {
    for (index, frame) in frames.iter().enumerate() {
        if frame.is_bare() {
            // Native fallback frames have nothing to list; one line each.
            match frame.line {
                Some(line) => {
                    writeln!(out, "{} ({}:{})", frame.code_name, basename(&frame.file_name), line)?
                }
                None => writeln!(out, "{} ({})", frame.code_name, basename(&frame.file_name))?,
            }
            continue;
        }

        if !frame.module_scope {
            writeln!(
                out,
                "Local variables of {} ({}):",
                frame.code_name,
                basename(&frame.file_name)
            )?;
            write_listing(out, frame.locals.iter(), options)?;
        }

        // Globals print once per module context: at the outermost frame of
        // a run of frames sharing the same table.
        let context_boundary = match frames.get(index + 1) {
            Some(next) => !globals::same_context(&frame.globals, &next.globals),
            None => true,
        };
        if let Some(table) = &frame.globals {
            if context_boundary {
                writeln!(out, "Global variables of {}:", frame.code_name)?;
                let entries = table.entries();
                let filtered = entries
                    .iter()
                    .filter(|(name, value)| !options.brief || keep_in_brief(name, value));
                write_listing(out, filtered, options)?;
            }
        }

        writeln!(out)?;
    }
    Ok(())
}

/// Brief-mode globals filter: drop noise values and private dunder names.
fn keep_in_brief(name: &str, value: &ValueRepr) -> bool {
    if is_dunder(name) && !DUNDER_ALLOWLIST.contains(&name) {
        return false;
    }
    !value.kind.is_noise()
}

fn write_listing<'a>(
    out: &mut dyn Write,
    entries: impl Iterator<Item = (&'a String, &'a ValueRepr)> + Clone,
    options: &RenderOptions,
) -> io::Result<()> {
    let longest = entries
        .clone()
        .map(|(name, _)| name.chars().count())
        .max()
        .unwrap_or(0);
    let width = longest.min(options.name_width_cap);

    let mut any = false;
    for (name, value) in entries {
        any = true;
        writeln!(
            out,
            "  {:<width$} = {}",
            name,
            truncate_repr(&value.repr, options.max_repr_len),
            width = width
        )?;
    }
    if !any {
        writeln!(out, "  (none)")?;
    }
    Ok(())
}
