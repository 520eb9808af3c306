//! Panic hook example for stacksnap
//!
//! Demonstrates the automatic banner output: a panic anywhere in the
//! program prints the current thread's recorded scope state.

use stacksnap::SnapConfig;

fn checkout(cart_items: usize, balance: i64) {
    let _scope = stacksnap::snap_scope!("checkout");
    stacksnap::snap_record!(cart_items);
    stacksnap::snap_record!(balance);

    let total = cart_items as i64 * 25;
    stacksnap::snap_record!(total);

    if balance < total {
        panic!("insufficient balance: have {balance}, need {total}");
    }
    println!("charged {total}, remaining {}", balance - total);
}

fn main() {
    // Default config installs the panic hook.
    stacksnap::init(SnapConfig::default());
    let _shutdown = stacksnap::shutdown_guard();

    println!("First checkout succeeds:");
    checkout(2, 100);

    println!("\nSecond checkout panics; the hook prints the live scopes:");
    checkout(10, 100);
}
