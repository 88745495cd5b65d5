//! libzmq SUB socket with a lifecycle monitor.
//!
//! The subscriber owns one context, the SUB socket, and the PAIR socket on
//! which libzmq publishes the SUB socket's monitor events. Everything is
//! used from a single thread.

use bytes::Bytes;
use std::time::Duration;
use subtester_core::endpoint::Endpoint;
use subtester_core::event::{MonitorEvent, EVENT_ALL};
use subtester_core::frame::Frame;
use tracing::{debug, trace, warn};

use crate::config::SubscriberConfig;
use crate::error::Result;

/// Where the SUB socket's monitor events are published. Scoped to the
/// subscriber's own context.
const MONITOR_ENDPOINT: &str = "inproc://subtester.monitor";

/// Which sockets have something to read after a poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    pub frames: bool,
    pub events: bool,
}

/// A connected SUB socket.
///
/// # Example
///
/// ```rust,no_run
/// use subtester::config::SubscriberConfig;
/// use subtester::socket::Subscriber;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let subscriber = Subscriber::connect(&SubscriberConfig::default())?;
/// loop {
///     if subscriber.poll(Duration::from_millis(100))?.frames {
///         while let Some(frame) = subscriber.try_recv_frame()? {
///             println!("{:?}", frame);
///         }
///     }
/// }
/// # }
/// ```
pub struct Subscriber {
    socket: zmq::Socket,
    monitor: zmq::Socket,
    endpoint: Endpoint,
    _context: zmq::Context,
}

impl Subscriber {
    /// Create the SUB socket, apply options and subscriptions, and start
    /// connecting to the configured endpoint.
    ///
    /// libzmq connects in the background, so an unreachable publisher is not
    /// an error here; it shows up as monitor events.
    pub fn connect(config: &SubscriberConfig) -> Result<Self> {
        let context = zmq::Context::new();

        let socket = context.socket(zmq::SUB)?;
        socket.set_linger(0)?;
        socket.set_rcvhwm(config.recv_hwm)?;
        socket.set_reconnect_ivl(millis(config.reconnect_ivl))?;
        socket.set_reconnect_ivl_max(millis(config.reconnect_ivl_max))?;

        // The monitor has to be attached before connect() to see the first attempt.
        socket.monitor(MONITOR_ENDPOINT, EVENT_ALL)?;
        let monitor = context.socket(zmq::PAIR)?;
        monitor.set_linger(0)?;
        monitor.connect(MONITOR_ENDPOINT)?;

        for topic in config.subscriptions() {
            trace!("[SUB] Adding subscription: {:?}", topic);
            socket.set_subscribe(&topic)?;
        }

        let address = config.endpoint.to_string();
        socket.connect(&address)?;
        debug!(
            endpoint = %address,
            rcvhwm = config.recv_hwm,
            reconnect_ivl_ms = millis(config.reconnect_ivl),
            "[SUB] Connect issued"
        );

        Ok(Self {
            socket,
            monitor,
            endpoint: config.endpoint.clone(),
            _context: context,
        })
    }

    /// Endpoint this subscriber connects to.
    #[inline]
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Wait up to `timeout` for frames or monitor events.
    ///
    /// A signal interrupting the wait is reported as nothing ready.
    pub fn poll(&self, timeout: Duration) -> Result<Readiness> {
        let mut items = [
            self.socket.as_poll_item(zmq::POLLIN),
            self.monitor.as_poll_item(zmq::POLLIN),
        ];

        match zmq::poll(&mut items, i64::from(millis(timeout))) {
            Ok(_) => Ok(Readiness {
                frames: items[0].is_readable(),
                events: items[1].is_readable(),
            }),
            Err(zmq::Error::EINTR) => Ok(Readiness::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Receive one frame if one is queued.
    ///
    /// The payload is copied out of the libzmq message into an owned,
    /// exactly sized buffer.
    pub fn try_recv_frame(&self) -> Result<Option<Frame>> {
        match self.socket.recv_msg(zmq::DONTWAIT) {
            Ok(msg) => {
                let frame = Frame::new(Bytes::copy_from_slice(&msg), msg.get_more());
                trace!(len = frame.len(), more = frame.more, "[SUB] Frame received");
                Ok(Some(frame))
            }
            Err(zmq::Error::EAGAIN | zmq::Error::EINTR) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read every queued monitor event.
    ///
    /// Undecodable monitor messages are logged and skipped.
    pub fn drain_events(&self) -> Result<Vec<MonitorEvent>> {
        let mut events = Vec::new();
        loop {
            match self.monitor.recv_multipart(zmq::DONTWAIT) {
                Ok(parts) => match MonitorEvent::decode_multipart(&parts) {
                    Ok(ev) => {
                        trace!("[MONITOR] {}", ev);
                        events.push(ev);
                    }
                    Err(e) => warn!("[MONITOR] Ignoring bad monitor message: {}", e),
                },
                Err(zmq::Error::EAGAIN | zmq::Error::EINTR) => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(events)
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

/// Milliseconds as libzmq's `int`, saturating.
fn millis(d: Duration) -> i32 {
    i32::try_from(d.as_millis()).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(100)), 100);
        assert_eq!(millis(Duration::ZERO), 0);
        assert_eq!(millis(Duration::from_secs(u64::MAX / 2)), i32::MAX);
    }

    #[test]
    fn test_connect_to_unreachable_endpoint_is_not_an_error() {
        let port = portpicker::pick_unused_port().expect("no free port");
        let config = SubscriberConfig::new(Endpoint::parse(&format!("127.0.0.1:{port}")).unwrap());

        let subscriber = Subscriber::connect(&config).unwrap();
        let ready = subscriber.poll(Duration::from_millis(10)).unwrap();
        assert!(!ready.frames);
        assert!(subscriber.try_recv_frame().unwrap().is_none());
    }
}
