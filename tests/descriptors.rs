//! Descriptor accounting for the connector.
//!
//! Kept as a single test so nothing else in this binary opens descriptors
//! while the counts are being compared.

#![cfg(target_os = "linux")]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::os::fd::IntoRawFd;

use tundialer::{dial, ConnectErrorKind};

fn open_fds() -> usize {
    std::fs::read_dir("/proc/self/fd").unwrap().count()
}

fn assert_fails_without_leak(iface: &str, ip: &str, port: u16, kind: ConnectErrorKind) {
    let before = open_fds();
    let err = dial(iface, ip, port).unwrap_err();
    assert_eq!(err.kind(), kind, "{iface} {ip}:{port}: {err}");
    assert_eq!(open_fds(), before, "descriptor leaked for {iface} {ip}:{port}");
}

#[test]
fn test_descriptor_accounting() {
    let refused_port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    // Rejected before any socket exists
    assert_fails_without_leak("", "127.0.0.1", 80, ConnectErrorKind::InvalidArgument);
    assert_fails_without_leak(
        "an-interface-name-far-too-long",
        "127.0.0.1",
        80,
        ConnectErrorKind::InvalidArgument,
    );

    // Socket created, then closed on the failing step
    assert_fails_without_leak(
        "doesnotexist0",
        "127.0.0.1",
        80,
        ConnectErrorKind::InterfaceBindFailed,
    );
    assert_fails_without_leak("lo", "not-an-ip", 80, ConnectErrorKind::InvalidAddress);
    assert_fails_without_leak("lo", "999.999.999.999", 80, ConnectErrorKind::InvalidAddress);
    assert_fails_without_leak(
        "lo",
        "127.0.0.1",
        refused_port,
        ConnectErrorKind::ConnectFailed,
    );

    // Success hands exactly one descriptor to the caller
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let before = open_fds();

    let socket = dial("lo", "127.0.0.1", port).unwrap();
    assert_eq!(open_fds(), before + 1);
    assert_eq!(socket.bound_device().unwrap().as_deref(), Some("lo"));

    let (mut server_side, _) = listener.accept().unwrap();
    server_side.write_all(b"payload").unwrap();

    let mut client = socket.into_std();
    let mut buf = [0u8; 7];
    client.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"payload");

    // Releasing the raw fd leaves it open until the new owner closes it
    let fd = client.into_raw_fd();
    assert_eq!(open_fds(), before + 2);
    assert_eq!(unsafe { libc::close(fd) }, 0);
    drop(server_side);
    assert_eq!(open_fds(), before);
}
