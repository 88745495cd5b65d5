//! Subscriber configuration.
//!
//! [`Cli`] is what users type (or export); [`SubscriberConfig`] is the
//! validated form the runtime works with.

use bytes::Bytes;
use clap::{Parser, ValueEnum};
use std::str::FromStr;
use std::time::Duration;
use subtester_core::endpoint::{Endpoint, DEFAULT_ENDPOINT};
use subtester_core::tracker::DisconnectPolicy;

/// What to do with a message whose frame count does not fit the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum MalformedPolicy {
    /// Log a warning and keep listening
    #[default]
    Warn,
    /// Stop with an error
    Reject,
}

/// `--on-disconnect` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OnDisconnect {
    /// Log the drop and wait for libzmq to reconnect
    #[default]
    Reconnect,
    /// Stop with an error
    Exit,
}

impl From<OnDisconnect> for DisconnectPolicy {
    fn from(value: OnDisconnect) -> Self {
        match value {
            OnDisconnect::Reconnect => DisconnectPolicy::Reconnect,
            OnDisconnect::Exit => DisconnectPolicy::Exit,
        }
    }
}

/// Subscribe to a ZeroMQ PUB endpoint and print every message received.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Publisher endpoint: tcp://host:port, host:port, ipc://path or inproc://name
    #[arg(
        value_name = "ENDPOINT",
        env = "SUBTESTER_ENDPOINT",
        default_value = DEFAULT_ENDPOINT,
        value_parser = Endpoint::from_str
    )]
    pub endpoint: Endpoint,

    /// Topic prefix to subscribe to (repeatable). Default: every topic
    #[arg(
        short = 't',
        long = "topic",
        value_name = "PREFIX",
        env = "SUBTESTER_TOPICS",
        value_delimiter = ','
    )]
    pub topics: Vec<String>,

    /// Behaviour when an established connection drops
    #[arg(long, value_enum, default_value_t = OnDisconnect::Reconnect)]
    pub on_disconnect: OnDisconnect,

    /// Behaviour when a message has an unexpected number of frames
    #[arg(long, value_enum, default_value_t = MalformedPolicy::Warn)]
    pub on_malformed: MalformedPolicy,

    /// Give up if no connection is established within this many milliseconds
    #[arg(long, value_name = "MILLIS")]
    pub connect_timeout: Option<u64>,

    /// Delay before reconnecting after a failure (ZMQ_RECONNECT_IVL)
    #[arg(long, value_name = "MILLIS", default_value_t = 100)]
    pub reconnect_ivl: u64,

    /// Upper bound for reconnect backoff, 0 disables backoff (ZMQ_RECONNECT_IVL_MAX)
    #[arg(long, value_name = "MILLIS", default_value_t = 0)]
    pub reconnect_ivl_max: u64,

    /// Receive high water mark in messages (ZMQ_RCVHWM)
    #[arg(long, value_name = "N", default_value_t = 1000)]
    pub rcvhwm: i32,

    /// Print per-topic message counts to stdout on exit
    #[arg(long)]
    pub stats: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Validated subscriber settings.
///
/// # Examples
///
/// ```
/// use subtester::config::SubscriberConfig;
/// use std::time::Duration;
///
/// let config = SubscriberConfig::default()
///     .with_topic("STATUS")
///     .with_connect_timeout(Duration::from_secs(5));
/// assert_eq!(config.topics.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Publisher to connect to
    pub endpoint: Endpoint,

    /// Subscription prefixes. Empty means a single empty prefix (everything).
    pub topics: Vec<Bytes>,

    pub disconnect_policy: DisconnectPolicy,

    pub malformed_policy: MalformedPolicy,

    /// Fail if the first connection is not up within this time.
    /// - `None`: wait forever (default)
    pub connect_timeout: Option<Duration>,

    /// ZMQ_RECONNECT_IVL, default 100ms
    pub reconnect_ivl: Duration,

    /// ZMQ_RECONNECT_IVL_MAX, default 0 (no backoff)
    pub reconnect_ivl_max: Duration,

    /// ZMQ_RCVHWM, default 1000 messages
    pub recv_hwm: i32,

    /// Poll slice; bounds how long a stop request can go unnoticed
    pub poll_interval: Duration,

    /// Print the per-topic table to stdout on exit
    pub print_stats: bool,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            topics: Vec::new(),
            disconnect_policy: DisconnectPolicy::Reconnect,
            malformed_policy: MalformedPolicy::Warn,
            connect_timeout: None,
            reconnect_ivl: Duration::from_millis(100),
            reconnect_ivl_max: Duration::ZERO,
            recv_hwm: 1000,
            poll_interval: Duration::from_millis(100),
            print_stats: false,
        }
    }
}

impl SubscriberConfig {
    #[must_use]
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_topic(mut self, topic: impl Into<Bytes>) -> Self {
        self.topics.push(topic.into());
        self
    }

    #[must_use]
    pub const fn with_disconnect_policy(mut self, policy: DisconnectPolicy) -> Self {
        self.disconnect_policy = policy;
        self
    }

    #[must_use]
    pub const fn with_malformed_policy(mut self, policy: MalformedPolicy) -> Self {
        self.malformed_policy = policy;
        self
    }

    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub const fn with_reconnect_ivl(mut self, ivl: Duration) -> Self {
        self.reconnect_ivl = ivl;
        self
    }

    #[must_use]
    pub const fn with_reconnect_ivl_max(mut self, ivl: Duration) -> Self {
        self.reconnect_ivl_max = ivl;
        self
    }

    #[must_use]
    pub const fn with_recv_hwm(mut self, hwm: i32) -> Self {
        self.recv_hwm = hwm;
        self
    }

    #[must_use]
    pub const fn with_print_stats(mut self, print_stats: bool) -> Self {
        self.print_stats = print_stats;
        self
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Prefixes to hand to `ZMQ_SUBSCRIBE`.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<Bytes> {
        if self.topics.is_empty() {
            vec![Bytes::new()]
        } else {
            self.topics.clone()
        }
    }
}

impl From<&Cli> for SubscriberConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            endpoint: cli.endpoint.clone(),
            topics: cli
                .topics
                .iter()
                .map(|t| Bytes::copy_from_slice(t.as_bytes()))
                .collect(),
            disconnect_policy: cli.on_disconnect.into(),
            malformed_policy: cli.on_malformed,
            connect_timeout: cli.connect_timeout.map(Duration::from_millis),
            reconnect_ivl: Duration::from_millis(cli.reconnect_ivl),
            reconnect_ivl_max: Duration::from_millis(cli.reconnect_ivl_max),
            recv_hwm: cli.rcvhwm,
            print_stats: cli.stats,
            ..Self::default()
        }
    }
}
