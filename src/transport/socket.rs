//! Connected socket handle returned by the connector

use std::io;
use std::net::{SocketAddr, TcpStream};
use std::os::fd::{AsFd, AsRawFd, BorrowedFd, IntoRawFd, OwnedFd, RawFd};

use crate::common::InterfaceName;

/// An established TCP connection pinned to one interface.
///
/// The handle owns the descriptor. Dropping it closes the socket; the
/// `into_*` conversions consume it, so the descriptor can be released to a
/// caller exactly once.
#[derive(Debug)]
pub struct ConnectedSocket {
    stream: TcpStream,
    interface: InterfaceName,
}

impl ConnectedSocket {
    pub(crate) fn new(socket: socket2::Socket, interface: InterfaceName) -> Self {
        Self {
            stream: socket.into(),
            interface,
        }
    }

    /// Interface the connection was bound to
    pub fn interface(&self) -> &InterfaceName {
        &self.interface
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.stream.local_addr()
    }

    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.stream.peer_addr()
    }

    /// Read `SO_BINDTODEVICE` back from the kernel
    #[cfg(any(target_os = "linux", target_os = "android"))]
    pub fn bound_device(&self) -> io::Result<Option<String>> {
        let device = socket2::SockRef::from(&self.stream).device()?;
        Ok(device.map(|name| String::from_utf8_lossy(&name).into_owned()))
    }

    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    pub fn bound_device(&self) -> io::Result<Option<String>> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "SO_BINDTODEVICE is not available on this platform",
        ))
    }

    pub fn nodelay(&self) -> io::Result<bool> {
        self.stream.nodelay()
    }

    /// Release as a blocking std stream
    pub fn into_std(self) -> TcpStream {
        self.stream
    }

    /// Release as a tokio stream. Must be called inside a tokio runtime.
    pub fn into_tokio(self) -> io::Result<tokio::net::TcpStream> {
        self.stream.set_nonblocking(true)?;
        tokio::net::TcpStream::from_std(self.stream)
    }
}

impl AsRawFd for ConnectedSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.stream.as_raw_fd()
    }
}

impl AsFd for ConnectedSocket {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.stream.as_fd()
    }
}

impl IntoRawFd for ConnectedSocket {
    fn into_raw_fd(self) -> RawFd {
        self.stream.into_raw_fd()
    }
}

impl From<ConnectedSocket> for OwnedFd {
    fn from(socket: ConnectedSocket) -> Self {
        socket.stream.into()
    }
}

impl From<ConnectedSocket> for TcpStream {
    fn from(socket: ConnectedSocket) -> Self {
        socket.stream
    }
}
