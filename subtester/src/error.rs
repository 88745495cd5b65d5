//! Subscriber error types.

use std::io;
use subtester_core::error::RenderError;
use subtester_core::event::EventDecodeError;
use subtester_core::tracker::LinkFailure;
use thiserror::Error;

/// Main error type for the subscriber runtime
#[derive(Error, Debug)]
pub enum Error {
    /// libzmq call failed
    #[error("ZeroMQ error: {0}")]
    Zmq(#[from] zmq::Error),

    /// Writing rendered output failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Connection refused for too long, dropped, or failed its handshake
    #[error(transparent)]
    Link(#[from] LinkFailure),

    /// Monitor socket delivered something that is not a monitor event
    #[error("Bad monitor event: {0}")]
    EventDecode(#[from] EventDecodeError),

    /// A logical message had the wrong number of frames
    #[error("Malformed message: {frames} frames (expected {expected})")]
    MalformedMessage { expected: usize, frames: usize },

    /// Signal handler could not be installed
    #[error("Signal handler error: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Result type alias for subscriber operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<RenderError> for Error {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Io(e) => Self::Io(e),
            RenderError::UnexpectedFrameCount { expected, frames } => Self::MalformedMessage {
                expected,
                frames: frames.len(),
            },
        }
    }
}

impl Error {
    /// Check if this is a connection error
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(self, Self::Link(_))
    }

    /// Check if the subscriber could keep going after this error
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::MalformedMessage { .. } | Self::EventDecode(_) => true,
            Self::Zmq(e) => matches!(e, zmq::Error::EAGAIN | zmq::Error::EINTR),
            Self::Io(e) => e.kind() == io::ErrorKind::Interrupted,
            _ => false,
        }
    }

    /// Downstream reader went away (e.g. output piped into `head`).
    #[must_use]
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Self::Io(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}
