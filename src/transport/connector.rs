//! Interface-bound TCP connector
//!
//! Creates an IPv4 stream socket, pins its egress to a named interface with
//! `SO_BINDTODEVICE`, and performs a blocking connect. Every socket created
//! here is either returned connected or closed before the call returns.

use std::io;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use tracing::{debug, warn};

use crate::common::{EndpointAddress, InterfaceName};
use crate::error::ConnectError;

use super::{ConnectedSocket, Dialer};

/// Blocking IPv4 dialer that bypasses route-table interface selection
#[derive(Debug, Clone)]
pub struct InterfaceBoundConnector {
    nodelay: bool,
}

impl InterfaceBoundConnector {
    pub fn new() -> Self {
        Self { nodelay: true }
    }

    /// Toggle the best-effort `TCP_NODELAY` step (on by default)
    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }

    pub fn connect(
        &self,
        interface: &InterfaceName,
        address: &EndpointAddress,
    ) -> Result<ConnectedSocket, ConnectError> {
        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))
            .map_err(ConnectError::SocketCreateFailed)?;

        // From here on `socket` is closed on drop, so `?` unwinds every path.
        bind_device(&socket, interface).map_err(|source| ConnectError::InterfaceBindFailed {
            interface: interface.to_string(),
            source,
        })?;
        debug!("socket bound to device {}", interface);

        if self.nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                warn!("TCP_NODELAY not applied on {}: {}", interface, e);
            }
        }

        let addr = address.to_socket_addr()?;

        socket
            .connect(&SockAddr::from(addr))
            .map_err(|source| ConnectError::ConnectFailed { addr, source })?;
        debug!("connected to {} via {}", addr, interface);

        Ok(ConnectedSocket::new(socket, interface.clone()))
    }
}

impl Default for InterfaceBoundConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialer for InterfaceBoundConnector {
    fn dial(
        &self,
        interface: &InterfaceName,
        address: &EndpointAddress,
    ) -> Result<ConnectedSocket, ConnectError> {
        self.connect(interface, address)
    }

    fn name(&self) -> &'static str {
        "bind-to-device-v4"
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn bind_device(socket: &Socket, interface: &InterfaceName) -> io::Result<()> {
    socket.bind_device(Some(interface.as_bytes()))
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn bind_device(_socket: &Socket, _interface: &InterfaceName) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "SO_BINDTODEVICE is not available on this platform",
    ))
}

/// Validate raw arguments and dial once with the default connector.
///
/// Mirrors the host-facing `connect(iface, ip, port)` call: the interface
/// name is checked before any socket exists.
pub fn dial(interface: &str, ip: &str, port: u16) -> Result<ConnectedSocket, ConnectError> {
    let interface = InterfaceName::new(interface)?;
    InterfaceBoundConnector::new().connect(&interface, &EndpointAddress::new(ip, port))
}
