//! UDP transport layer.
//!
//! This module owns socket creation and a single send or receive step. It
//! knows nothing about frames; validation and retries live in
//! [`crate::exchange`].
//!
//! Sockets are built with `socket2` so that address reuse (and, for
//! discovery, broadcast and port reuse) can be enabled before binding, then
//! handed to Tokio. A socket lives as long as the value owning it; dropping
//! the [`UdpTransport`] closes it.
//!
//! # Constants
//!
//! - [`UDP_PORT`] - Protocol port, used both locally and remotely (1337)
//! - [`MAX_PACKET_SIZE`] - Receive buffer size (1024 bytes)

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use log::debug;
use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

use crate::error::{Result, TSmartError};
use crate::utils::format_frame;

/// Protocol UDP port, local and remote.
pub const UDP_PORT: u16 = 1337;

/// Receive buffer size. The largest frame is 326 bytes.
pub const MAX_PACKET_SIZE: usize = 1024;

/// Socket options applied before binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SocketOptions {
    /// Enable SO_BROADCAST.
    pub broadcast: bool,
    /// Enable SO_REUSEPORT (unix only).
    pub reuse_port: bool,
}

/// Creates a UDP socket bound to `0.0.0.0:local_port`.
///
/// Must be called within a Tokio runtime.
///
/// # Errors
///
/// Returns `Connection` or `NotFound` if the socket cannot be created,
/// configured or bound.
pub(crate) fn bind_socket(local_port: u16, options: SocketOptions) -> Result<UdpSocket> {
    let bind = || -> std::io::Result<UdpSocket> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;

        #[cfg(unix)]
        if options.reuse_port {
            socket.set_reuse_port(true)?;
        }

        if options.broadcast {
            socket.set_broadcast(true)?;
        }

        let addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, local_port));
        socket.bind(&addr.into())?;
        socket.set_nonblocking(true)?;

        UdpSocket::from_std(socket.into())
    };

    bind().map_err(TSmartError::from_socket_error)
}

/// Connected UDP socket for request/response exchanges with one device.
pub struct UdpTransport {
    socket: UdpSocket,
    remote_addr: SocketAddr,
}

impl UdpTransport {
    /// Binds the local port and connects to the device.
    ///
    /// Must be called within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `Connection` if the socket cannot be bound or connected,
    /// or `NotFound` if the system reports no route to the device.
    pub async fn connect(remote_addr: SocketAddr, local_port: u16) -> Result<Self> {
        let socket = bind_socket(local_port, SocketOptions::default())?;
        socket
            .connect(remote_addr)
            .await
            .map_err(TSmartError::from_socket_error)?;

        Ok(Self {
            socket,
            remote_addr,
        })
    }

    /// Sends one datagram to the device.
    ///
    /// # Errors
    ///
    /// Returns `Connection` if the send fails.
    pub async fn send(&self, data: &[u8]) -> Result<()> {
        debug!("Sending {} to {}", format_frame(data), self.remote_addr);
        self.socket
            .send(data)
            .await
            .map_err(|source| TSmartError::Connection { source })?;
        Ok(())
    }

    /// Waits up to `timeout` for one datagram from the device.
    ///
    /// # Errors
    ///
    /// Returns `Timeout` if nothing arrives in time, or `Connection` if the
    /// receive fails (for example an ICMP port-unreachable report).
    pub async fn recv(&self, timeout: Duration) -> Result<Vec<u8>> {
        let mut buffer = vec![0u8; MAX_PACKET_SIZE];
        match tokio::time::timeout(timeout, self.socket.recv(&mut buffer)).await {
            Ok(Ok(size)) => {
                buffer.truncate(size);
                debug!("Got {} from {}", format_frame(&buffer), self.remote_addr);
                Ok(buffer)
            }
            Ok(Err(source)) => Err(TSmartError::Connection { source }),
            Err(_) => Err(TSmartError::Timeout),
        }
    }

    /// Returns the device address.
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// Returns the locally bound address.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr().ok()
    }
}

impl std::fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransport")
            .field("remote_addr", &self.remote_addr)
            .field("local_addr", &self.local_addr())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        assert_eq!(UDP_PORT, 1337);
        assert_eq!(MAX_PACKET_SIZE, 1024);
    }

    #[tokio::test]
    async fn test_transport_creation() {
        let addr: SocketAddr = "127.0.0.1:1337".parse().unwrap();
        let transport = UdpTransport::connect(addr, 0).await.unwrap();
        assert_eq!(transport.remote_addr(), addr);
        assert!(transport.local_addr().is_some());
    }

    #[tokio::test]
    async fn test_transport_debug() {
        let addr: SocketAddr = "127.0.0.1:1337".parse().unwrap();
        let transport = UdpTransport::connect(addr, 0).await.unwrap();
        let debug_str = format!("{:?}", transport);
        assert!(debug_str.contains("UdpTransport"));
        assert!(debug_str.contains("127.0.0.1:1337"));
    }

    #[tokio::test]
    async fn test_send_and_recv() {
        let device = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let transport = UdpTransport::connect(device.local_addr().unwrap(), 0)
            .await
            .unwrap();

        transport.send(&[0xF1, 0x00, 0x00, 0xA4]).await.unwrap();
        let mut buf = [0u8; 16];
        let (n, peer) = device.recv_from(&mut buf).await.unwrap();
        assert_eq!(&buf[..n], &[0xF1, 0x00, 0x00, 0xA4]);

        device.send_to(&[0xF2, 0x00, 0x00, 0xA7], peer).await.unwrap();
        let reply = transport.recv(Duration::from_secs(1)).await.unwrap();
        assert_eq!(reply, vec![0xF2, 0x00, 0x00, 0xA7]);
    }

    #[tokio::test]
    async fn test_recv_timeout() {
        let device = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let transport = UdpTransport::connect(device.local_addr().unwrap(), 0)
            .await
            .unwrap();
        let err = transport.recv(Duration::from_millis(50)).await.unwrap_err();
        assert!(matches!(err, TSmartError::Timeout));
    }

    #[tokio::test]
    async fn test_bind_in_use_is_connection_error() {
        // SO_REUSEADDR does not let a second socket share a port held by a
        // socket that did not opt in.
        let holder = std::net::UdpSocket::bind("0.0.0.0:0").unwrap();
        let port = holder.local_addr().unwrap().port();
        let err = bind_socket(port, SocketOptions::default()).unwrap_err();
        assert!(matches!(err, TSmartError::Connection { .. }));
    }
}
