//! A single transport frame.

use bytes::Bytes;

/// One frame as delivered by the SUB socket.
///
/// `more` mirrors `ZMQ_RCVMORE`: it is set on every frame of a logical
/// message except the last one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub data: Bytes,
    pub more: bool,
}

impl Frame {
    #[must_use]
    pub fn new(data: impl Into<Bytes>, more: bool) -> Self {
        Self {
            data: data.into(),
            more,
        }
    }

    /// A frame that closes its logical message.
    #[must_use]
    pub fn last(data: impl Into<Bytes>) -> Self {
        Self::new(data, false)
    }

    /// A frame followed by at least one more frame of the same message.
    #[must_use]
    pub fn more(data: impl Into<Bytes>) -> Self {
        Self::new(data, true)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Split a complete multipart message into frames with `more` set on
    /// all but the last.
    pub fn split_multipart<I, T>(parts: I) -> Vec<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<Bytes>,
    {
        let mut frames: Vec<Self> = parts.into_iter().map(Self::more).collect();
        if let Some(last) = frames.last_mut() {
            last.more = false;
        }
        frames
    }
}
