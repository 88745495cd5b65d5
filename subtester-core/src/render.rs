//! Output renderers for the two subscriber variants.
//!
//! - [`FrameRenderer`] writes every frame as soon as it arrives, joining the
//!   frames of a multipart message with `...` and ending it with a newline.
//! - [`EnvelopeRenderer`] waits for the whole message and prints
//!   `[address] content` for two-frame messages.
//!
//! Both renderers only keep state for the message in progress, so replaying
//! the same input produces the same bytes.

use bytes::{BufMut, BytesMut};
use std::io::Write;

use crate::error::RenderError;
use crate::frame::Frame;
use crate::message::MessageAssembler;

/// Written after a frame that has more frames following it.
pub const CONTINUATION_MARKER: &[u8] = b"...";

/// Frames in an address/content envelope.
pub const ENVELOPE_FRAMES: usize = 2;

/// Whether the frame just rendered finished its logical message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Partial,
    Complete,
}

impl Progress {
    #[inline]
    #[must_use]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// Turns received frames into bytes on an output stream.
pub trait Renderer {
    /// Feed one frame, writing whatever output it produces.
    fn render_frame<W: Write + ?Sized>(
        &mut self,
        frame: &Frame,
        out: &mut W,
    ) -> Result<Progress, RenderError>;

    /// Forget a partially received message (e.g. after the peer went away).
    fn reset(&mut self);
}

/// Frame-concatenating renderer.
///
/// Each frame is copied into one reusable, growable buffer together with its
/// terminator and written with a single `write_all`. There is no size limit:
/// payloads of any length, including embedded NUL bytes, are written in full.
///
/// A frame ends up on the output as soon as it arrives, so a [`reset`]
/// cannot take back a partial line. Instead the next frame starts a fresh
/// line.
///
/// [`reset`]: Renderer::reset
#[derive(Debug)]
pub struct FrameRenderer {
    buf: BytesMut,
    /// Last frame written had the `more` flag
    line_open: bool,
    /// Open line abandoned by `reset`, to be ended before the next frame
    break_line: bool,
}

impl FrameRenderer {
    /// Starting capacity; the buffer grows on demand.
    pub const INITIAL_CAPACITY: usize = 1000;

    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(Self::INITIAL_CAPACITY),
            line_open: false,
            break_line: false,
        }
    }

    /// Current capacity of the scratch buffer.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for FrameRenderer {
    fn render_frame<W: Write + ?Sized>(
        &mut self,
        frame: &Frame,
        out: &mut W,
    ) -> Result<Progress, RenderError> {
        self.buf.clear();
        self.buf.reserve(frame.len() + CONTINUATION_MARKER.len() + 1);
        if self.break_line {
            self.buf.put_u8(b'\n');
        }
        self.buf.put_slice(&frame.data);

        let progress = if frame.more {
            self.buf.put_slice(CONTINUATION_MARKER);
            Progress::Partial
        } else {
            self.buf.put_u8(b'\n');
            Progress::Complete
        };

        out.write_all(&self.buf)?;
        self.break_line = false;
        self.line_open = frame.more;
        Ok(progress)
    }

    fn reset(&mut self) {
        self.buf.clear();
        self.break_line |= self.line_open;
        self.line_open = false;
    }
}

/// Address/content renderer.
///
/// Only messages with exactly two frames are printed. Anything else is
/// returned as [`RenderError::UnexpectedFrameCount`] without writing, and the
/// caller decides whether to skip it or stop.
#[derive(Debug, Default)]
pub struct EnvelopeRenderer {
    assembler: MessageAssembler,
    line: String,
}

impl EnvelopeRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for EnvelopeRenderer {
    fn render_frame<W: Write + ?Sized>(
        &mut self,
        frame: &Frame,
        out: &mut W,
    ) -> Result<Progress, RenderError> {
        let Some(parts) = self.assembler.push(frame) else {
            return Ok(Progress::Partial);
        };

        if parts.len() != ENVELOPE_FRAMES {
            return Err(RenderError::UnexpectedFrameCount {
                expected: ENVELOPE_FRAMES,
                frames: parts,
            });
        }

        self.line.clear();
        self.line.push('[');
        self.line.push_str(&String::from_utf8_lossy(&parts[0]));
        self.line.push_str("] ");
        self.line.push_str(&String::from_utf8_lossy(&parts[1]));
        self.line.push('\n');

        out.write_all(self.line.as_bytes())?;
        Ok(Progress::Complete)
    }

    fn reset(&mut self) {
        self.assembler.clear();
        self.line.clear();
    }
}

/// Short printable preview of a frame for log lines.
#[must_use]
pub fn preview(data: &[u8], max: usize) -> String {
    let shown = &data[..data.len().min(max)];
    let mut text = String::from_utf8_lossy(shown).into_owned();
    if data.len() > max {
        text.push_str(&format!("... ({} bytes)", data.len()));
    }
    text
}
