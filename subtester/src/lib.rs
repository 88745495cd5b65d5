//! # Subtester
//!
//! Test clients for ZeroMQ publish/subscribe endpoints, such as the status
//! port of a DASTARD server. A client connects a SUB socket, subscribes to
//! every topic (or the prefixes given with `--topic`), and prints what it
//! receives.
//!
//! Two binaries are built:
//!
//! - **`sub-client`**: prints each frame as it arrives. Frames of one
//!   multipart message are joined with `...`; the last one ends the line.
//! - **`zmq-sub-client`**: prints two-frame messages as `[address] content`
//!   and reports messages with any other frame count.
//!
//! ## Architecture
//!
//! - **`subtester-core`**: frames, renderers, endpoint parsing, monitor event
//!   decoding, connection policy (no I/O)
//! - **`subtester`**: libzmq SUB socket, receive loop, CLI (this crate)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::atomic::AtomicBool;
//! use subtester::prelude::*;
//!
//! # fn example() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let config = SubscriberConfig::new(Endpoint::parse("localhost:5501")?);
//! let subscriber = Subscriber::connect(&config)?;
//! let mut listener = Listener::new(subscriber, EnvelopeRenderer::new(), &config);
//!
//! let running = AtomicBool::new(true);
//! listener.run(&mut std::io::stdout().lock(), &running)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Connection handling
//!
//! libzmq connects and reconnects in the background. The SUB socket's
//! monitor events are watched so a refused connection or a dropped publisher
//! is logged, and `--on-disconnect exit` / `--connect-timeout` turn them into
//! errors.

#![warn(clippy::all)]

pub mod app;
pub mod config;
pub mod dev_tracing;
pub mod error;
pub mod listener;
pub mod socket;

pub use error::{Error, Result};

pub mod prelude {
    pub use crate::config::{Cli, MalformedPolicy, SubscriberConfig};
    pub use crate::error::{Error, Result};
    pub use crate::listener::Listener;
    pub use crate::socket::{Readiness, Subscriber};
    pub use subtester_core::prelude::*;
}
