//! tundialer - interface-bound TCP dialing
//!
//! Opens outbound TCP connections that are forced to egress through a named
//! network interface (`SO_BINDTODEVICE`), regardless of what the routing table
//! would pick. Intended for multi-homed hosts such as tunnel endpoints.
//!
//! ```text
//! InterfaceName + EndpointAddress
//! → InterfaceBoundConnector   (blocking, single shot)
//! → ConnectedSocket           (owned fd, released to the caller)
//! → InterfaceTransport        (optional async adapter)
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── common/          # InterfaceName, EndpointAddress, Stream
//! ├── transport/       # Connector, handle, async transport
//! ├── config.rs        # JSON dial configuration
//! └── error.rs         # ConnectError taxonomy
//! ```

pub mod common;
pub mod config;
pub mod error;
pub mod transport;

pub use common::{EndpointAddress, InterfaceName, Stream};
pub use config::DialConfig;
pub use error::{ConnectError, ConnectErrorKind, Error, Result};
pub use transport::{
    dial, ConnectedSocket, Dialer, InterfaceBoundConnector, InterfaceTransport, Transport,
};
