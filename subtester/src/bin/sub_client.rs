//! Prints every frame published on the endpoint as soon as it arrives.
//!
//! Frames of one multipart message are joined with `...`; the last frame
//! ends the line.
//!
//! ```text
//! sub-client [ENDPOINT]        # default tcp://localhost:5501
//! ```

use std::process::ExitCode;
use subtester::app::{main_with, Variant};

fn main() -> ExitCode {
    main_with(Variant::Frames)
}
