//! Soft cloud demo.
//!
//! Run with `cargo run --example cloud [options.json]`. Without an argument the
//! built-in cloud preset is used.

use cumulus::*;

fn main() -> Result<()> {
    let options = match std::env::args().nth(1) {
        Some(path) => Options::load(path)?,
        None => Options::cloud(),
    };
    run(options)
}
