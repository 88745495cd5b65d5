//! Connection tracking and the disconnect policy.
//!
//! libzmq reconnects on its own and never reports link problems through
//! `recv`. The tracker watches monitor events instead, so refused
//! connections and dropped publishers become visible, and decides whether
//! the subscriber keeps waiting or stops.

use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use crate::event::{MonitorEvent, TransportEvent};

/// What to do when an established connection is lost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DisconnectPolicy {
    /// Log it and let libzmq reconnect with the configured intervals.
    #[default]
    Reconnect,
    /// Stop the subscriber with an error.
    Exit,
}

/// Link state as seen through the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Never connected yet.
    Connecting,
    Connected,
    /// Was connected, waiting for libzmq to bring the link back.
    Reconnecting,
}

/// Outcome of feeding one event to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerVerdict {
    Continue,
    /// The link dropped; any partially received message is gone with it.
    LinkLost,
    /// Stop the subscriber.
    Fatal(LinkFailure),
}

/// Link conditions that end the subscriber.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkFailure {
    #[error("Disconnected from {endpoint}")]
    Disconnected { endpoint: String },

    #[error("Handshake with {endpoint} failed: {reason}")]
    HandshakeFailed { endpoint: String, reason: String },

    #[error("No connection established within {0:?}")]
    ConnectTimeout(Duration),
}

/// Tracks the SUB socket's link from monitor events.
#[derive(Debug, Clone)]
pub struct ConnectionTracker {
    policy: DisconnectPolicy,
    state: LinkState,
    started: Instant,
    connect_timeout: Option<Duration>,
    /// Failed attempts since the last successful connection
    retries: u32,
    disconnects: u32,
}

impl ConnectionTracker {
    #[must_use]
    pub fn new(policy: DisconnectPolicy, connect_timeout: Option<Duration>) -> Self {
        Self::started_at(policy, connect_timeout, Instant::now())
    }

    /// Same as [`new`](Self::new) with an explicit start time.
    #[must_use]
    pub const fn started_at(
        policy: DisconnectPolicy,
        connect_timeout: Option<Duration>,
        started: Instant,
    ) -> Self {
        Self {
            policy,
            state: LinkState::Connecting,
            started,
            connect_timeout,
            retries: 0,
            disconnects: 0,
        }
    }

    #[inline]
    #[must_use]
    pub const fn state(&self) -> LinkState {
        self.state
    }

    #[inline]
    #[must_use]
    pub const fn retries(&self) -> u32 {
        self.retries
    }

    #[inline]
    #[must_use]
    pub const fn disconnects(&self) -> u32 {
        self.disconnects
    }

    #[inline]
    #[must_use]
    pub const fn policy(&self) -> DisconnectPolicy {
        self.policy
    }

    /// Apply one monitor event.
    pub fn observe(&mut self, ev: &MonitorEvent) -> TrackerVerdict {
        match ev.event {
            TransportEvent::Connected => {
                if self.state != LinkState::Connected {
                    info!(endpoint = %ev.endpoint, "[MONITOR] Connected");
                }
                self.state = LinkState::Connected;
                self.retries = 0;
                TrackerVerdict::Continue
            }
            TransportEvent::HandshakeSucceeded => {
                debug!(endpoint = %ev.endpoint, "[MONITOR] Handshake succeeded");
                self.state = LinkState::Connected;
                self.retries = 0;
                TrackerVerdict::Continue
            }
            TransportEvent::ConnectDelayed => {
                debug!(endpoint = %ev.endpoint, "[MONITOR] Connect delayed");
                TrackerVerdict::Continue
            }
            TransportEvent::ConnectRetried { retry_in_ms } => {
                self.retries += 1;
                if self.retries == 1 {
                    warn!(
                        endpoint = %ev.endpoint,
                        retry_in_ms,
                        "[MONITOR] Connection refused or unreachable, retrying"
                    );
                } else {
                    debug!(
                        endpoint = %ev.endpoint,
                        attempt = self.retries,
                        retry_in_ms,
                        "[MONITOR] Connect retried"
                    );
                }
                TrackerVerdict::Continue
            }
            TransportEvent::Disconnected | TransportEvent::Closed => self.on_link_loss(ev),
            TransportEvent::HandshakeFailed(_) => match self.policy {
                DisconnectPolicy::Reconnect => {
                    warn!(endpoint = %ev.endpoint, "[MONITOR] {}", ev.event);
                    TrackerVerdict::Continue
                }
                DisconnectPolicy::Exit => TrackerVerdict::Fatal(LinkFailure::HandshakeFailed {
                    endpoint: ev.endpoint.clone(),
                    reason: ev.event.to_string(),
                }),
            },
            TransportEvent::MonitorStopped => {
                debug!("[MONITOR] Monitor stopped");
                TrackerVerdict::Continue
            }
            TransportEvent::Other { .. } => {
                trace!(endpoint = %ev.endpoint, "[MONITOR] {}", ev.event);
                TrackerVerdict::Continue
            }
        }
    }

    fn on_link_loss(&mut self, ev: &MonitorEvent) -> TrackerVerdict {
        // Failed connect attempts also close their descriptor.
        if self.state != LinkState::Connected {
            trace!(endpoint = %ev.endpoint, "[MONITOR] {} while not connected", ev.event);
            return TrackerVerdict::Continue;
        }

        self.disconnects += 1;
        match self.policy {
            DisconnectPolicy::Reconnect => {
                warn!(
                    endpoint = %ev.endpoint,
                    disconnects = self.disconnects,
                    "[MONITOR] Publisher connection lost, waiting for reconnect"
                );
                self.state = LinkState::Reconnecting;
                TrackerVerdict::LinkLost
            }
            DisconnectPolicy::Exit => TrackerVerdict::Fatal(LinkFailure::Disconnected {
                endpoint: ev.endpoint.clone(),
            }),
        }
    }

    /// Fails once the connect timeout has passed without ever connecting.
    ///
    /// Only the first connection is bounded; reconnects after a drop are
    /// governed by the disconnect policy.
    #[must_use]
    pub fn check_deadline(&self, now: Instant) -> Option<LinkFailure> {
        let timeout = self.connect_timeout?;
        if self.state == LinkState::Connecting && now.duration_since(self.started) >= timeout {
            Some(LinkFailure::ConnectTimeout(timeout))
        } else {
            None
        }
    }
}
