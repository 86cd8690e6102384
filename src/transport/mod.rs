//! Transport Layer
//!
//! Responsibilities:
//! - Establish raw TCP connections pinned to a named egress interface
//! - NO encryption, NO protocol parsing, NO retries or pooling
//!
//! This layer ONLY deals with connection establishment.

mod connector;
mod socket;
mod tcp;

pub use connector::{dial, InterfaceBoundConnector};
pub use socket::ConnectedSocket;
pub use tcp::InterfaceTransport;

use async_trait::async_trait;

use crate::common::{ConnectError, EndpointAddress, InterfaceName, Result, Stream};

/// Blocking strategy for dialing through a specific interface.
///
/// The IPv4 `SO_BINDTODEVICE` connector is the only implementation; other
/// address families or platforms plug in here.
pub trait Dialer: Send + Sync {
    /// Dial once; no retries
    fn dial(
        &self,
        interface: &InterfaceName,
        address: &EndpointAddress,
    ) -> std::result::Result<ConnectedSocket, ConnectError>;

    /// Get the dialer name (for logging)
    fn name(&self) -> &'static str;
}

/// Transport trait for establishing raw connections
#[async_trait]
pub trait Transport: Send + Sync {
    /// Connect to a remote address
    async fn connect(&self, addr: &EndpointAddress) -> Result<Stream>;
}
