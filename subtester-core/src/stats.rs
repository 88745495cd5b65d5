//! Per-topic message counters.
//!
//! The topic of a multipart message is its first frame, which is how the
//! publishers this tool listens to lay out their messages. Single-frame
//! messages have no topic. Per-topic counting is opt-in and bounded: keys are
//! cut to [`TOPIC_PREFIX_LEN`] bytes and at most [`MAX_TOPICS`] distinct keys
//! are kept, later ones are counted together as "other".

use bytes::Bytes;
use hashbrown::HashMap;
use std::fmt;

use crate::frame::Frame;

/// Longest topic key kept, in bytes.
pub const TOPIC_PREFIX_LEN: usize = 64;

/// Distinct topics tracked before counting the rest as other.
pub const MAX_TOPICS: usize = 1024;

#[derive(Debug, Default, Clone)]
pub struct MessageStats {
    messages: u64,
    frames: u64,
    bytes: u64,
    malformed: u64,
    track_topics: bool,
    per_topic: HashMap<Bytes, u64>,
    other_topics: u64,
    /// Last frame seen had the `more` flag
    mid_message: bool,
}

impl MessageStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Totals plus per-topic counts.
    #[must_use]
    pub fn with_topics() -> Self {
        Self {
            track_topics: true,
            ..Self::default()
        }
    }

    /// Count one received frame.
    pub fn observe(&mut self, frame: &Frame) {
        self.frames += 1;
        self.bytes += frame.len() as u64;

        if !self.mid_message {
            self.messages += 1;
            if self.track_topics && frame.more {
                self.count_topic(&frame.data);
            }
        }
        self.mid_message = frame.more;
    }

    fn count_topic(&mut self, topic: &[u8]) {
        let key = &topic[..topic.len().min(TOPIC_PREFIX_LEN)];

        if let Some(count) = self.per_topic.get_mut(key) {
            *count += 1;
        } else if self.per_topic.len() < MAX_TOPICS {
            // Copied so the key does not pin the whole frame buffer.
            self.per_topic.insert(Bytes::copy_from_slice(key), 1);
        } else {
            self.other_topics += 1;
        }
    }

    /// Count a message that could not be rendered.
    pub fn record_malformed(&mut self) {
        self.malformed += 1;
    }

    /// The next frame starts a new message (partial message discarded).
    pub fn resync(&mut self) {
        self.mid_message = false;
    }

    #[inline]
    #[must_use]
    pub const fn messages(&self) -> u64 {
        self.messages
    }

    #[inline]
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    #[inline]
    #[must_use]
    pub const fn bytes(&self) -> u64 {
        self.bytes
    }

    #[inline]
    #[must_use]
    pub const fn malformed(&self) -> u64 {
        self.malformed
    }

    /// Messages whose topic did not fit in the table.
    #[inline]
    #[must_use]
    pub const fn other_topics(&self) -> u64 {
        self.other_topics
    }

    /// Messages seen for `topic`.
    #[must_use]
    pub fn topic_count(&self, topic: &[u8]) -> u64 {
        self.per_topic.get(topic).copied().unwrap_or(0)
    }

    /// Topics and their counts, sorted by topic.
    #[must_use]
    pub fn topics(&self) -> Vec<(&Bytes, u64)> {
        let mut topics: Vec<_> = self.per_topic.iter().map(|(t, n)| (t, *n)).collect();
        topics.sort_unstable_by(|a, b| a.0.cmp(b.0));
        topics
    }

    /// Topic table, one `count<TAB>topic` line per topic.
    #[must_use]
    pub fn table(&self) -> String {
        let mut out = String::new();
        for (topic, count) in self.topics() {
            out.push_str(&format!("{count}\t{}\n", String::from_utf8_lossy(topic)));
        }
        if self.other_topics > 0 {
            out.push_str(&format!("{}\t(other)\n", self.other_topics));
        }
        out
    }
}

impl fmt::Display for MessageStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} messages ({} frames, {} bytes, {} malformed) across {} topics",
            self.messages,
            self.frames,
            self.bytes,
            self.malformed,
            self.per_topic.len()
        )
    }
}
