//! Multipart message assembly.
//!
//! Frames arrive one at a time; a logical message is complete when a frame
//! without the `more` flag is pushed.

use bytes::Bytes;
use smallvec::SmallVec;

use crate::frame::Frame;

/// Frames of one logical message. Topic/content pairs stay inline.
pub type Multipart = SmallVec<[Bytes; 4]>;

/// Accumulates frames until the logical message is complete.
#[derive(Debug, Default)]
pub struct MessageAssembler {
    frames: Multipart,
}

impl MessageAssembler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push one frame. Returns the whole message once its last frame
    /// has arrived, leaving the assembler empty.
    pub fn push(&mut self, frame: &Frame) -> Option<Multipart> {
        self.frames.push(frame.data.clone());
        if frame.more {
            None
        } else {
            Some(std::mem::take(&mut self.frames))
        }
    }

    /// Number of frames held for the message in progress.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop a partially received message.
    pub fn clear(&mut self) {
        self.frames.clear();
    }
}
