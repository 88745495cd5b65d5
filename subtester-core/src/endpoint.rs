//! Endpoint parsing for the subscriber's connect address.
//!
//! libzmq wants a full `transport://address` string. Users of the original
//! tools typically pass `host:port`, so a bare address is read as TCP.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Address used when nothing is configured.
pub const DEFAULT_ENDPOINT: &str = "tcp://localhost:5501";

/// Transport endpoint address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// TCP transport: `tcp://host:port`. The host may be a name, an IPv4
    /// address, a bracketed IPv6 address, or `*`.
    Tcp { host: String, port: u16 },
    /// IPC transport (Unix domain socket): `ipc:///path/to/socket`
    #[cfg(unix)]
    Ipc(PathBuf),
    /// In-process transport: `inproc://name`
    Inproc(String),
}

impl Endpoint {
    /// Parse an endpoint from a string.
    ///
    /// Supported formats:
    /// - `tcp://localhost:5501`
    /// - `tcp://[::1]:5501` (IPv6)
    /// - `localhost:5501` (same as `tcp://localhost:5501`)
    /// - `ipc:///tmp/socket.sock` (Unix only)
    /// - `inproc://name`
    ///
    /// # Examples
    ///
    /// ```
    /// use subtester_core::endpoint::Endpoint;
    ///
    /// let endpoint = Endpoint::parse("localhost:5501").unwrap();
    /// assert_eq!(endpoint.to_string(), "tcp://localhost:5501");
    /// ```
    pub fn parse(s: &str) -> Result<Self, EndpointError> {
        s.parse()
    }

    /// Returns true if this is a TCP endpoint.
    pub fn is_tcp(&self) -> bool {
        matches!(self, Endpoint::Tcp { .. })
    }

    /// Returns true if this is an inproc endpoint.
    pub fn is_inproc(&self) -> bool {
        matches!(self, Endpoint::Inproc(_))
    }

    fn parse_tcp(addr: &str) -> Result<Self, EndpointError> {
        let invalid = || EndpointError::InvalidTcpAddress(addr.to_string());

        let (host, port) = addr.rsplit_once(':').ok_or_else(invalid)?;
        let port = port.parse::<u16>().map_err(|_| invalid())?;
        if host.is_empty() {
            return Err(invalid());
        }
        if host.starts_with('[') != host.ends_with(']') {
            return Err(invalid());
        }
        // An unbracketed colon means an IPv6 literal without brackets.
        if !host.starts_with('[') && host.contains(':') {
            return Err(invalid());
        }

        Ok(Endpoint::Tcp {
            host: host.to_string(),
            port,
        })
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint::Tcp {
            host: "localhost".to_string(),
            port: 5501,
        }
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EndpointError::Empty);
        }

        if let Some(addr) = s.strip_prefix("tcp://") {
            Self::parse_tcp(addr)
        } else if let Some(path) = s.strip_prefix("ipc://") {
            #[cfg(unix)]
            {
                if path.is_empty() {
                    return Err(EndpointError::Empty);
                }
                Ok(Endpoint::Ipc(PathBuf::from(path)))
            }
            #[cfg(not(unix))]
            {
                let _ = path;
                Err(EndpointError::IpcNotSupported)
            }
        } else if let Some(name) = s.strip_prefix("inproc://") {
            if name.is_empty() {
                Err(EndpointError::InvalidInprocName(
                    "inproc name cannot be empty".to_string(),
                ))
            } else {
                Ok(Endpoint::Inproc(name.to_string()))
            }
        } else if s.contains("://") {
            Err(EndpointError::InvalidScheme(s.to_string()))
        } else {
            Self::parse_tcp(s)
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Tcp { host, port } => write!(f, "tcp://{}:{}", host, port),
            #[cfg(unix)]
            Endpoint::Ipc(path) => write!(f, "ipc://{}", path.display()),
            Endpoint::Inproc(name) => write!(f, "inproc://{}", name),
        }
    }
}

/// Errors that can occur when parsing endpoints.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("Empty endpoint")]
    Empty,

    #[error("Invalid scheme in endpoint: {0} (expected tcp://, ipc://, or inproc://)")]
    InvalidScheme(String),

    #[error("Invalid TCP address: {0} (expected host:port)")]
    InvalidTcpAddress(String),

    #[error("Invalid inproc name: {0}")]
    InvalidInprocName(String),

    #[error("IPC transport not supported on this platform")]
    IpcNotSupported,
}
