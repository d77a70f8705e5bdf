//! Binary entry point for `txn-delete`.

use std::process;

fn main() {
    if let Err(e) = txn_delete::run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
