//! The receive loop.
//!
//! One thread alternates between waiting on the SUB socket (in short poll
//! slices) and rendering what arrived. Monitor events are applied after the
//! frames that were already queued, so messages received before a drop are
//! still printed.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use subtester_core::error::RenderError;
use subtester_core::render::{preview, Progress, Renderer};
use subtester_core::stats::MessageStats;
use subtester_core::tracker::{ConnectionTracker, TrackerVerdict};
use tracing::{debug, info, warn};

use crate::config::{MalformedPolicy, SubscriberConfig};
use crate::error::{Error, Result};
use crate::socket::Subscriber;

/// Messages handled per poll slice before the stop flag is checked again.
const MAX_BATCH: usize = 256;

/// Longest frame prefix shown in malformed-message warnings.
const PREVIEW_LEN: usize = 64;

/// Drives a [`Subscriber`] into a [`Renderer`].
pub struct Listener<R> {
    subscriber: Subscriber,
    renderer: R,
    tracker: ConnectionTracker,
    stats: MessageStats,
    malformed_policy: MalformedPolicy,
    poll_interval: Duration,
}

impl<R: Renderer> Listener<R> {
    pub fn new(subscriber: Subscriber, renderer: R, config: &SubscriberConfig) -> Self {
        Self {
            subscriber,
            renderer,
            tracker: ConnectionTracker::new(config.disconnect_policy, config.connect_timeout),
            stats: if config.print_stats {
                MessageStats::with_topics()
            } else {
                MessageStats::new()
            },
            malformed_policy: config.malformed_policy,
            poll_interval: config.poll_interval,
        }
    }

    /// Loop until `running` is cleared or a fatal condition occurs.
    pub fn run<W: Write + ?Sized>(&mut self, out: &mut W, running: &AtomicBool) -> Result<()> {
        info!(endpoint = %self.subscriber.endpoint(), "[SUB] Listening");

        while running.load(Ordering::SeqCst) {
            self.step(out)?;
        }

        debug!("[SUB] Stop requested");
        Ok(())
    }

    /// One poll slice: render queued messages, then apply monitor events.
    ///
    /// Returns how many logical messages were finished (printed or skipped).
    pub fn step<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<usize> {
        let ready = self.subscriber.poll(self.poll_interval)?;

        let mut handled = 0;
        if ready.frames {
            while let Some(frame) = self.subscriber.try_recv_frame()? {
                self.stats.observe(&frame);

                match self.renderer.render_frame(&frame, out) {
                    Ok(Progress::Complete) => out.flush()?,
                    Ok(Progress::Partial) => {}
                    Err(RenderError::UnexpectedFrameCount { expected, frames }) => {
                        self.on_malformed(expected, &frames)?;
                    }
                    Err(RenderError::Io(e)) => return Err(e.into()),
                }

                if !frame.more {
                    handled += 1;
                    if handled >= MAX_BATCH {
                        break;
                    }
                }
            }
        }

        if ready.events {
            for ev in self.subscriber.drain_events()? {
                match self.tracker.observe(&ev) {
                    TrackerVerdict::Continue => {}
                    TrackerVerdict::LinkLost => {
                        self.renderer.reset();
                        self.stats.resync();
                    }
                    TrackerVerdict::Fatal(failure) => return Err(failure.into()),
                }
            }
        }

        if let Some(failure) = self.tracker.check_deadline(Instant::now()) {
            return Err(failure.into());
        }

        Ok(handled)
    }

    fn on_malformed(&mut self, expected: usize, frames: &[bytes::Bytes]) -> Result<()> {
        self.stats.record_malformed();

        match self.malformed_policy {
            MalformedPolicy::Warn => {
                let parts: Vec<String> = frames.iter().map(|f| preview(f, PREVIEW_LEN)).collect();
                warn!(
                    frames = frames.len(),
                    expected,
                    "[SUB] Skipping message with unexpected frame count: {:?}",
                    parts
                );
                Ok(())
            }
            MalformedPolicy::Reject => Err(Error::MalformedMessage {
                expected,
                frames: frames.len(),
            }),
        }
    }

    pub fn stats(&self) -> &MessageStats {
        &self.stats
    }

    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    pub fn subscriber(&self) -> &Subscriber {
        &self.subscriber
    }
}
