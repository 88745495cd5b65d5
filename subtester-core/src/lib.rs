//! Subtester Core
//!
//! Sans-IO building blocks for the subscriber test clients:
//! - Frames and multipart assembly (`frame`, `message`)
//! - Output renderers for both client variants (`render`)
//! - Endpoint parsing and normalisation (`endpoint`)
//! - Transport monitor event decoding (`event`)
//! - Connection tracking and disconnect policy (`tracker`)
//! - Per-topic message statistics (`stats`)
//! - Error types (`error`)
//!
//! Nothing in here touches a socket. The `subtester` crate drives these
//! types from a libzmq SUB socket.

#![deny(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

pub mod endpoint;
pub mod error;
pub mod event;
pub mod frame;
pub mod message;
pub mod render;
pub mod stats;
pub mod tracker;

pub mod prelude {
    pub use crate::endpoint::{Endpoint, EndpointError, DEFAULT_ENDPOINT};
    pub use crate::error::RenderError;
    pub use crate::event::{EventDecodeError, MonitorEvent, TransportEvent};
    pub use crate::frame::Frame;
    pub use crate::message::{MessageAssembler, Multipart};
    pub use crate::render::{EnvelopeRenderer, FrameRenderer, Progress, Renderer};
    pub use crate::stats::MessageStats;
    pub use crate::tracker::{ConnectionTracker, DisconnectPolicy, LinkState, TrackerVerdict};
}
