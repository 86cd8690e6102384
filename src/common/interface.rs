//! Network interface name

use std::fmt;
use std::str::FromStr;

use crate::error::ConnectError;

/// Longest interface name the kernel accepts, excluding the trailing NUL.
pub const MAX_INTERFACE_NAME_LEN: usize = libc::IFNAMSIZ - 1;

/// A validated network interface name such as `eth0` or `wg0`.
///
/// Construction checks the name against the kernel's limits, so a value of
/// this type can always be handed to `SO_BINDTODEVICE` as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterfaceName(String);

impl InterfaceName {
    pub fn new(name: impl Into<String>) -> Result<Self, ConnectError> {
        let name = name.into();
        let reason = if name.is_empty() {
            Some("name is empty")
        } else if name.len() > MAX_INTERFACE_NAME_LEN {
            Some("name exceeds IFNAMSIZ")
        } else if name.bytes().any(|b| b == 0) {
            Some("name contains a NUL byte")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ConnectError::InvalidArgument { name, reason }),
            None => Ok(Self(name)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl FromStr for InterfaceName {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for InterfaceName {
    type Error = ConnectError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl AsRef<str> for InterfaceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InterfaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectErrorKind;

    #[test]
    fn test_accepts_common_names() {
        for name in ["lo", "eth0", "wg0", "enp0s31f6", "veth1234567890a"] {
            let iface = InterfaceName::new(name).unwrap();
            assert_eq!(iface.as_str(), name);
        }
    }

    #[test]
    fn test_rejects_empty() {
        let err = InterfaceName::new("").unwrap_err();
        assert_eq!(err.kind(), ConnectErrorKind::InvalidArgument);
    }

    #[test]
    fn test_length_boundary() {
        let max = "a".repeat(MAX_INTERFACE_NAME_LEN);
        assert!(InterfaceName::new(max).is_ok());

        let over = "a".repeat(MAX_INTERFACE_NAME_LEN + 1);
        let err = InterfaceName::new(over).unwrap_err();
        assert_eq!(err.kind(), ConnectErrorKind::InvalidArgument);
    }

    #[test]
    fn test_rejects_nul() {
        let err = "eth\0".parse::<InterfaceName>().unwrap_err();
        assert_eq!(err.kind(), ConnectErrorKind::InvalidArgument);
    }
}
