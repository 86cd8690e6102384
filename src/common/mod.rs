//! Common types
//!
//! - InterfaceName: validated egress interface
//! - EndpointAddress: IPv4 dial target
//! - Stream: async I/O abstraction

mod endpoint;
mod interface;
mod stream;

pub use endpoint::EndpointAddress;
pub use interface::{InterfaceName, MAX_INTERFACE_NAME_LEN};
pub use stream::{AsyncReadWrite, IntoStream, Stream};

// Re-export error types from crate root
pub use crate::error::{ConnectError, ConnectErrorKind, Error, Result};
