//! Build script for stacksnap.
//!
//! Emits feature-related notes so users see strategy limitations at build
//! time rather than discovering them from missing snapshots at runtime.

use std::env;

fn main() {
    // Re-run if features change
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_DETOUR");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_PARKING_LOT");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_LOG");

    let detour_enabled = env::var("CARGO_FEATURE_DETOUR").is_ok();
    let parking_lot_enabled = env::var("CARGO_FEATURE_PARKING_LOT").is_ok();

    if !detour_enabled {
        println!(
            "cargo:warning=stacksnap: `detour` feature disabled - the direct \
             install strategy is used and the root error kind stays unpatched \
             (instances of the root kind itself never get a snapshot)"
        );
    }

    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    if profile == "release" && !parking_lot_enabled {
        println!(
            "cargo:warning=stacksnap: consider the `parking_lot` feature for \
             faster gate/registry locking in release builds"
        );
    }
}
