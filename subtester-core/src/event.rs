//! Socket monitor events.
//!
//! libzmq reports socket lifecycle changes on a monitor PAIR socket as
//! two-frame messages:
//!
//! 1. 6 bytes: event id (`u16`, native byte order) then value (`u32`)
//! 2. the affected endpoint as a string
//!
//! The constants below are the `ZMQ_EVENT_*` values from `zmq.h`.

use std::fmt;

pub const EVENT_CONNECTED: u16 = 0x0001;
pub const EVENT_CONNECT_DELAYED: u16 = 0x0002;
pub const EVENT_CONNECT_RETRIED: u16 = 0x0004;
pub const EVENT_LISTENING: u16 = 0x0008;
pub const EVENT_BIND_FAILED: u16 = 0x0010;
pub const EVENT_ACCEPTED: u16 = 0x0020;
pub const EVENT_ACCEPT_FAILED: u16 = 0x0040;
pub const EVENT_CLOSED: u16 = 0x0080;
pub const EVENT_CLOSE_FAILED: u16 = 0x0100;
pub const EVENT_DISCONNECTED: u16 = 0x0200;
pub const EVENT_MONITOR_STOPPED: u16 = 0x0400;
pub const EVENT_HANDSHAKE_FAILED_NO_DETAIL: u16 = 0x0800;
pub const EVENT_HANDSHAKE_SUCCEEDED: u16 = 0x1000;
pub const EVENT_HANDSHAKE_FAILED_PROTOCOL: u16 = 0x2000;
pub const EVENT_HANDSHAKE_FAILED_AUTH: u16 = 0x4000;

/// Event mask passed to `zmq_socket_monitor` to receive everything.
pub const EVENT_ALL: i32 = 0xFFFF;

const HEADER_LEN: usize = 6;

/// Decoded lifecycle event of the SUB socket's connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    /// TCP connection established (handshake may still be pending).
    Connected,
    /// Connect did not complete immediately; libzmq keeps trying.
    ConnectDelayed,
    /// A connect attempt failed; the next one is in `retry_in_ms`.
    ConnectRetried { retry_in_ms: u32 },
    /// The connection's underlying descriptor was closed.
    Closed,
    /// The peer went away.
    Disconnected,
    /// ZMTP handshake completed; messages can flow.
    HandshakeSucceeded,
    /// ZMTP handshake failed.
    HandshakeFailed(HandshakeFailure),
    /// The monitor itself was shut down.
    MonitorStopped,
    /// Listener-side or unknown event, kept for logging.
    Other { id: u16, value: u32 },
}

/// Why a handshake failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeFailure {
    NoDetail,
    Protocol(u32),
    Auth(u32),
}

impl TransportEvent {
    /// Build an event from its raw id and value.
    #[must_use]
    pub const fn from_raw(id: u16, value: u32) -> Self {
        match id {
            EVENT_CONNECTED => Self::Connected,
            EVENT_CONNECT_DELAYED => Self::ConnectDelayed,
            EVENT_CONNECT_RETRIED => Self::ConnectRetried { retry_in_ms: value },
            EVENT_CLOSED => Self::Closed,
            EVENT_DISCONNECTED => Self::Disconnected,
            EVENT_HANDSHAKE_SUCCEEDED => Self::HandshakeSucceeded,
            EVENT_HANDSHAKE_FAILED_NO_DETAIL => Self::HandshakeFailed(HandshakeFailure::NoDetail),
            EVENT_HANDSHAKE_FAILED_PROTOCOL => {
                Self::HandshakeFailed(HandshakeFailure::Protocol(value))
            }
            EVENT_HANDSHAKE_FAILED_AUTH => Self::HandshakeFailed(HandshakeFailure::Auth(value)),
            EVENT_MONITOR_STOPPED => Self::MonitorStopped,
            _ => Self::Other { id, value },
        }
    }

    /// Whether this event means the link to the publisher is gone.
    #[must_use]
    pub const fn is_link_loss(&self) -> bool {
        matches!(self, Self::Disconnected | Self::Closed)
    }
}

impl fmt::Display for TransportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::ConnectDelayed => write!(f, "connect delayed"),
            Self::ConnectRetried { retry_in_ms } => {
                write!(f, "connect retried (next attempt in {retry_in_ms} ms)")
            }
            Self::Closed => write!(f, "closed"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::HandshakeSucceeded => write!(f, "handshake succeeded"),
            Self::HandshakeFailed(HandshakeFailure::NoDetail) => write!(f, "handshake failed"),
            Self::HandshakeFailed(HandshakeFailure::Protocol(code)) => {
                write!(f, "handshake failed (protocol error {code:#x})")
            }
            Self::HandshakeFailed(HandshakeFailure::Auth(code)) => {
                write!(f, "handshake failed (auth status {code})")
            }
            Self::MonitorStopped => write!(f, "monitor stopped"),
            Self::Other { id, value } => write!(f, "event {id:#06x} (value {value})"),
        }
    }
}

/// An event together with the endpoint it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorEvent {
    pub event: TransportEvent,
    pub endpoint: String,
}

impl MonitorEvent {
    /// Decode the two frames of one monitor message.
    pub fn decode(header: &[u8], endpoint: &[u8]) -> Result<Self, EventDecodeError> {
        if header.len() != HEADER_LEN {
            return Err(EventDecodeError::BadHeader(header.len()));
        }
        let id = u16::from_ne_bytes([header[0], header[1]]);
        let value = u32::from_ne_bytes([header[2], header[3], header[4], header[5]]);

        Ok(Self {
            event: TransportEvent::from_raw(id, value),
            endpoint: String::from_utf8_lossy(endpoint).into_owned(),
        })
    }

    /// Decode a whole monitor message.
    pub fn decode_multipart<T: AsRef<[u8]>>(parts: &[T]) -> Result<Self, EventDecodeError> {
        match parts {
            [header, endpoint] => Self::decode(header.as_ref(), endpoint.as_ref()),
            _ => Err(EventDecodeError::FrameCount(parts.len())),
        }
    }

    /// Encode an event the way libzmq does. Used to fake monitor traffic.
    #[must_use]
    pub fn encode_header(id: u16, value: u32) -> [u8; HEADER_LEN] {
        let mut header = [0u8; HEADER_LEN];
        header[..2].copy_from_slice(&id.to_ne_bytes());
        header[2..].copy_from_slice(&value.to_ne_bytes());
        header
    }
}

impl fmt::Display for MonitorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.event, self.endpoint)
    }
}

/// Errors decoding monitor messages.
#[derive(Debug, thiserror::Error)]
pub enum EventDecodeError {
    #[error("Monitor message has {0} frames (expected 2)")]
    FrameCount(usize),

    #[error("Monitor event header is {0} bytes (expected 6)")]
    BadHeader(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_connect_retried() {
        let header = MonitorEvent::encode_header(EVENT_CONNECT_RETRIED, 200);
        let ev = MonitorEvent::decode(&header, b"tcp://localhost:5501").unwrap();
        assert_eq!(ev.event, TransportEvent::ConnectRetried { retry_in_ms: 200 });
        assert_eq!(ev.endpoint, "tcp://localhost:5501");
    }

    #[test]
    fn test_decode_multipart() {
        let header = MonitorEvent::encode_header(EVENT_DISCONNECTED, 12);
        let parts = vec![header.to_vec(), b"tcp://127.0.0.1:5501".to_vec()];
        let ev = MonitorEvent::decode_multipart(&parts).unwrap();
        assert_eq!(ev.event, TransportEvent::Disconnected);
        assert!(ev.event.is_link_loss());
    }

    #[test]
    fn test_decode_rejects_short_header() {
        let result = MonitorEvent::decode(&[1, 0], b"");
        assert!(matches!(result, Err(EventDecodeError::BadHeader(2))));
    }

    #[test]
    fn test_decode_rejects_wrong_frame_count() {
        let parts = vec![MonitorEvent::encode_header(EVENT_CONNECTED, 0).to_vec()];
        let result = MonitorEvent::decode_multipart(&parts);
        assert!(matches!(result, Err(EventDecodeError::FrameCount(1))));
    }

    #[test]
    fn test_unknown_events_are_kept() {
        let ev = TransportEvent::from_raw(EVENT_LISTENING, 7);
        assert_eq!(
            ev,
            TransportEvent::Other {
                id: EVENT_LISTENING,
                value: 7
            }
        );
        assert!(!ev.is_link_loss());
    }

    #[test]
    fn test_handshake_failures() {
        assert_eq!(
            TransportEvent::from_raw(EVENT_HANDSHAKE_FAILED_PROTOCOL, 0x11),
            TransportEvent::HandshakeFailed(HandshakeFailure::Protocol(0x11))
        );
        assert_eq!(
            TransportEvent::from_raw(EVENT_HANDSHAKE_FAILED_AUTH, 400),
            TransportEvent::HandshakeFailed(HandshakeFailure::Auth(400))
        );
    }

    #[test]
    fn test_display() {
        let ev = MonitorEvent {
            event: TransportEvent::Disconnected,
            endpoint: "tcp://localhost:5501".to_string(),
        };
        assert_eq!(ev.to_string(), "disconnected [tcp://localhost:5501]");
    }
}
