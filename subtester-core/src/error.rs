//! Rendering errors.
//!
//! Endpoint and monitor decoding errors live next to their parsers
//! (`endpoint::EndpointError`, `event::EventDecodeError`).

use std::io;
use thiserror::Error;

use crate::message::Multipart;

/// Error returned by a [`Renderer`](crate::render::Renderer).
#[derive(Error, Debug)]
pub enum RenderError {
    /// Writing to the output failed
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A complete logical message did not have the expected number of frames
    #[error("Unexpected frame count: {} (expected {expected})", .frames.len())]
    UnexpectedFrameCount { expected: usize, frames: Multipart },
}

impl RenderError {
    /// Malformed input is skippable; output failures are not.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnexpectedFrameCount { .. })
    }

    /// Number of frames in the offending message, if any.
    #[must_use]
    pub fn frame_count(&self) -> Option<usize> {
        match self {
            Self::UnexpectedFrameCount { frames, .. } => Some(frames.len()),
            Self::Io(_) => None,
        }
    }
}
