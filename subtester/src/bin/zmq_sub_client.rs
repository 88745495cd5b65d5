//! Prints `[address] content` for every two-frame message published on the
//! endpoint.
//!
//! Messages with another frame count are logged and skipped, or stop the
//! client with `--on-malformed reject`.

use std::process::ExitCode;
use subtester::app::{main_with, Variant};

fn main() -> ExitCode {
    main_with(Variant::Envelope)
}
