//! Catch-and-render example for stacksnap
//!
//! Demonstrates registering an error kind, recording scope state, and
//! rendering the snapshot attached at the construction site.

use std::fmt;

use stacksnap::{RenderOptions, SnapConfig, Traced};

#[derive(Debug)]
struct LookupFailed {
    key: String,
}

impl fmt::Display for LookupFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no entry for key {:?}", self.key)
    }
}

impl std::error::Error for LookupFailed {}

fn lookup(key: &str) -> Result<u32, Traced<LookupFailed>> {
    let _scope = stacksnap::snap_scope!("lookup");
    stacksnap::snap_record!(key);

    let table = [("alpha", 1u32), ("beta", 2)];
    stacksnap::snap_record!(table_len = table.len());

    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .ok_or_else(|| Traced::new(LookupFailed { key: key.to_string() }))
}

fn resolve_all(keys: &[&str]) -> Result<u32, Traced<LookupFailed>> {
    let _scope = stacksnap::snap_scope!("resolve_all");
    stacksnap::snap_record!(count = keys.len());

    let mut sum = 0;
    for key in keys {
        sum += lookup(key)?;
        stacksnap::snap_record!(sum);
    }
    Ok(sum)
}

fn main() {
    stacksnap::snap_global!(mod demo);
    stacksnap::register_kind::<LookupFailed>("LookupFailed", None);
    stacksnap::init(SnapConfig::default().without_panic_hook());
    let _shutdown = stacksnap::shutdown_guard();

    println!("Resolving [alpha, beta]...");
    println!("sum = {}\n", resolve_all(&["alpha", "beta"]).unwrap());

    println!("Resolving [alpha, gamma]...");
    if let Err(err) = resolve_all(&["alpha", "gamma"]) {
        // The snapshot shows the state *inside* lookup at construction
        // time, even though we only see the error out here.
        let mut out = std::io::stderr().lock();
        stacksnap::render_caught(&err, &mut out, &RenderOptions::default()).unwrap();
    }
}
