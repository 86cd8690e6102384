//! Error types for tundialer

use std::io;
use std::net::SocketAddrV4;

use thiserror::Error;

/// Coarse classification of a failed dial.
///
/// Callers branch on this to tell bad input apart from permission, route and
/// network failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectErrorKind {
    InvalidArgument,
    InvalidAddress,
    SocketCreateFailed,
    InterfaceBindFailed,
    ConnectFailed,
}

impl ConnectErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectErrorKind::InvalidArgument => "invalid_argument",
            ConnectErrorKind::InvalidAddress => "invalid_address",
            ConnectErrorKind::SocketCreateFailed => "socket_create_failed",
            ConnectErrorKind::InterfaceBindFailed => "interface_bind_failed",
            ConnectErrorKind::ConnectFailed => "connect_failed",
        }
    }
}

impl std::fmt::Display for ConnectErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure of a single interface-bound dial
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error("Invalid interface name {name:?}: {reason}")]
    InvalidArgument { name: String, reason: &'static str },

    #[error("Invalid IPv4 address: {0:?}")]
    InvalidAddress(String),

    #[error("socket() failed: {0}")]
    SocketCreateFailed(#[source] io::Error),

    #[error("setsockopt(SO_BINDTODEVICE, {interface}) failed: {source}")]
    InterfaceBindFailed {
        interface: String,
        #[source]
        source: io::Error,
    },

    #[error("connect({addr}) failed: {source}")]
    ConnectFailed {
        addr: SocketAddrV4,
        #[source]
        source: io::Error,
    },
}

impl ConnectError {
    pub fn kind(&self) -> ConnectErrorKind {
        match self {
            ConnectError::InvalidArgument { .. } => ConnectErrorKind::InvalidArgument,
            ConnectError::InvalidAddress(_) => ConnectErrorKind::InvalidAddress,
            ConnectError::SocketCreateFailed(_) => ConnectErrorKind::SocketCreateFailed,
            ConnectError::InterfaceBindFailed { .. } => ConnectErrorKind::InterfaceBindFailed,
            ConnectError::ConnectFailed { .. } => ConnectErrorKind::ConnectFailed,
        }
    }

    /// The OS error behind this failure, if the OS was involved
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            ConnectError::SocketCreateFailed(e) => Some(e),
            ConnectError::InterfaceBindFailed { source, .. } => Some(source),
            ConnectError::ConnectFailed { source, .. } => Some(source),
            ConnectError::InvalidArgument { .. } | ConnectError::InvalidAddress(_) => None,
        }
    }

    /// Raw errno, e.g. `ENODEV` for an unknown interface
    pub fn raw_os_error(&self) -> Option<i32> {
        self.io_error().and_then(io::Error::raw_os_error)
    }
}

/// Main error type for tundialer
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Timeout")]
    Timeout,
}

impl Error {
    /// Dial failure kind, if this error came from the connector
    pub fn connect_kind(&self) -> Option<ConnectErrorKind> {
        match self {
            Error::Connect(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// Result type alias for tundialer
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_os_error() {
        let err = ConnectError::InterfaceBindFailed {
            interface: "eth9".into(),
            source: io::Error::from_raw_os_error(libc::ENODEV),
        };
        assert_eq!(err.kind(), ConnectErrorKind::InterfaceBindFailed);
        assert_eq!(err.raw_os_error(), Some(libc::ENODEV));
        assert!(err.to_string().contains("eth9"));

        let err = ConnectError::InvalidAddress("not-an-ip".into());
        assert_eq!(err.kind(), ConnectErrorKind::InvalidAddress);
        assert!(err.raw_os_error().is_none());
    }

    #[test]
    fn test_wrapped_error_keeps_kind() {
        let err: Error = ConnectError::InvalidAddress("x".into()).into();
        assert_eq!(err.connect_kind(), Some(ConnectErrorKind::InvalidAddress));
        assert_eq!(Error::Timeout.connect_kind(), None);
    }
}
