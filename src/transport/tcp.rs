//! Async TCP transport over an interface-bound dialer

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::common::{EndpointAddress, InterfaceName, IntoStream, Result, Stream};
use crate::error::Error;

use super::{ConnectedSocket, Dialer, InterfaceBoundConnector, Transport};

/// TCP transport pinned to one egress interface.
///
/// The blocking dial runs on tokio's blocking pool. With a timeout set the
/// caller stops waiting when it fires; a connection that completes afterwards
/// is dropped, and therefore closed, by the blocking task.
pub struct InterfaceTransport {
    interface: InterfaceName,
    dialer: Arc<dyn Dialer>,
    connect_timeout: Option<Duration>,
}

impl InterfaceTransport {
    pub fn new(interface: InterfaceName) -> Self {
        Self::with_dialer(interface, Arc::new(InterfaceBoundConnector::new()))
    }

    pub fn with_dialer(interface: InterfaceName, dialer: Arc<dyn Dialer>) -> Self {
        Self {
            interface,
            dialer,
            connect_timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn interface(&self) -> &InterfaceName {
        &self.interface
    }

    /// Dial and return the owned handle without converting it
    pub async fn dial(&self, addr: &EndpointAddress) -> Result<ConnectedSocket> {
        let dialer = self.dialer.clone();
        let interface = self.interface.clone();
        let target = addr.clone();

        let task = tokio::task::spawn_blocking(move || dialer.dial(&interface, &target));

        let joined = match self.connect_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    error!("dial {} via {} timed out after {:?}", addr, self.interface, timeout);
                    return Err(Error::Timeout);
                }
            },
            None => task.await,
        };

        let socket = joined
            .map_err(|e| Error::Io(std::io::Error::other(e)))?
            .map_err(|e| {
                error!("dial {} via {} failed: {}", addr, self.interface, e);
                Error::Connect(e)
            })?;

        debug!("[{}] connected {} via {}", self.dialer.name(), addr, self.interface);
        Ok(socket)
    }
}

#[async_trait]
impl Transport for InterfaceTransport {
    async fn connect(&self, addr: &EndpointAddress) -> Result<Stream> {
        let socket = self.dial(addr).await?;
        Ok(socket.into_tokio()?.into_stream())
    }
}

#[cfg(all(test, target_os = "linux"))]
mod tests {
    use super::*;
    use crate::error::{ConnectError, ConnectErrorKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn lo() -> InterfaceName {
        InterfaceName::new("lo").unwrap()
    }

    #[tokio::test]
    async fn test_transport_round_trip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = tokio::spawn(async move {
            let (mut conn, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 5];
            conn.read_exact(&mut buf).await.unwrap();
            conn.write_all(&buf).await.unwrap();
        });

        let transport = InterfaceTransport::new(lo()).with_timeout(Duration::from_secs(5));
        let mut stream = transport
            .connect(&EndpointAddress::localhost(port))
            .await
            .unwrap();

        stream.write_all(b"hello").await.unwrap();
        let mut buf = [0u8; 5];
        stream.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hello");

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_transport_surfaces_connect_kind() {
        let transport = InterfaceTransport::new(lo());
        let err = transport
            .connect(&EndpointAddress::new("not-an-ip", 80))
            .await
            .err()
            .unwrap();
        assert_eq!(err.connect_kind(), Some(ConnectErrorKind::InvalidAddress));
    }

    struct SlowDialer;

    impl Dialer for SlowDialer {
        fn dial(
            &self,
            _interface: &InterfaceName,
            address: &EndpointAddress,
        ) -> std::result::Result<ConnectedSocket, ConnectError> {
            std::thread::sleep(Duration::from_millis(200));
            Err(ConnectError::InvalidAddress(address.host().to_string()))
        }

        fn name(&self) -> &'static str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_transport_timeout() {
        let transport = InterfaceTransport::with_dialer(lo(), Arc::new(SlowDialer))
            .with_timeout(Duration::from_millis(10));
        let result = transport.dial(&EndpointAddress::localhost(1)).await;
        assert!(matches!(result, Err(Error::Timeout)));
    }

    struct CountingDialer(AtomicUsize);

    impl Dialer for CountingDialer {
        fn dial(
            &self,
            interface: &InterfaceName,
            address: &EndpointAddress,
        ) -> std::result::Result<ConnectedSocket, ConnectError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            InterfaceBoundConnector::new().dial(interface, address)
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn test_custom_dialer_is_used_without_retry() {
        let dialer = Arc::new(CountingDialer(AtomicUsize::new(0)));
        let transport = InterfaceTransport::with_dialer(lo(), dialer.clone());
        let _ = transport.dial(&EndpointAddress::new("bogus", 80)).await;
        assert_eq!(dialer.0.load(Ordering::SeqCst), 1);
    }

    struct PanickingDialer;

    impl Dialer for PanickingDialer {
        fn dial(
            &self,
            _interface: &InterfaceName,
            _address: &EndpointAddress,
        ) -> std::result::Result<ConnectedSocket, ConnectError> {
            panic!("dialer blew up");
        }

        fn name(&self) -> &'static str {
            "panicking"
        }
    }

    #[tokio::test]
    async fn test_dialer_panic_becomes_io_error() {
        let transport = InterfaceTransport::with_dialer(lo(), Arc::new(PanickingDialer));
        let result = transport.dial(&EndpointAddress::localhost(1)).await;
        match result {
            Err(Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::Other),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }
}
