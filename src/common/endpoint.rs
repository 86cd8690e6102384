//! Endpoint address for outbound dials

use std::net::{Ipv4Addr, SocketAddrV4};

use crate::error::ConnectError;

/// Dial target: IPv4 literal in dotted-decimal text plus a port.
///
/// The host text is kept as given and only parsed when the connector reaches
/// that step, so a malformed host still surfaces as `InvalidAddress` from the
/// dial itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointAddress {
    host: String,
    port: u16,
}

impl EndpointAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Create from an already parsed IPv4 address and port
    pub fn ipv4(ip: Ipv4Addr, port: u16) -> Self {
        Self::new(ip.to_string(), port)
    }

    /// Create a loopback address (127.0.0.1)
    pub fn localhost(port: u16) -> Self {
        Self::ipv4(Ipv4Addr::LOCALHOST, port)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Parse the host as a strict dotted-quad IPv4 literal
    pub fn to_socket_addr(&self) -> Result<SocketAddrV4, ConnectError> {
        let ip: Ipv4Addr = self
            .host
            .parse()
            .map_err(|_| ConnectError::InvalidAddress(self.host.clone()))?;
        Ok(SocketAddrV4::new(ip, self.port))
    }
}

impl std::fmt::Display for EndpointAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl From<SocketAddrV4> for EndpointAddress {
    fn from(addr: SocketAddrV4) -> Self {
        Self::ipv4(*addr.ip(), addr.port())
    }
}

impl From<(&str, u16)> for EndpointAddress {
    fn from((host, port): (&str, u16)) -> Self {
        Self::new(host, port)
    }
}

impl From<(String, u16)> for EndpointAddress {
    fn from((host, port): (String, u16)) -> Self {
        Self::new(host, port)
    }
}
