//! Datagram transport abstraction.
//!
//! [`Transport`] is the seam between the protocol loops and the network: raw
//! datagram send/receive plus a receive that gives up at a deadline.
//! [`Socket`] implements it as a thin wrapper around `tokio::net::UdpSocket`;
//! [`crate::simulator::Simulator`] wraps any other transport to inject faults.
//! All protocol logic lives elsewhere; this module owns only byte I/O.

use std::io;
use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};

/// Receive buffer size large enough for any UDP datagram.
pub const MAX_DATAGRAM: usize = 65_535;

/// Unreliable, unordered datagram channel.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Send `datagram` as a single unit to `dest`.
    async fn send_to(&self, datagram: &[u8], dest: SocketAddr) -> io::Result<()>;

    /// Wait for the next datagram; returns its length and sender.
    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;

    fn local_addr(&self) -> io::Result<SocketAddr>;

    /// Like [`Transport::recv_from`], but returns `Ok(None)` once `deadline`
    /// passes without a datagram.
    async fn recv_before(
        &self,
        buf: &mut [u8],
        deadline: Instant,
    ) -> io::Result<Option<(usize, SocketAddr)>> {
        match timeout_at(deadline, self.recv_from(buf)).await {
            Ok(received) => received.map(Some),
            Err(_elapsed) => Ok(None),
        }
    }
}

/// A UDP socket speaking raw datagrams.
#[derive(Debug)]
pub struct Socket {
    /// Address this socket is bound to (filled in after the OS assigns an
    /// ephemeral port).
    pub local_addr: SocketAddr,
    inner: UdpSocket,
}

impl Socket {
    /// Bind a new socket to `local_addr`.
    ///
    /// Passing `0.0.0.0:0` lets the OS choose an ephemeral port.
    pub async fn bind(local_addr: SocketAddr) -> io::Result<Self> {
        let inner = UdpSocket::bind(local_addr).await?;
        let local_addr = inner.local_addr()?;
        Ok(Self { local_addr, inner })
    }
}

impl Transport for Socket {
    async fn send_to(&self, datagram: &[u8], dest: SocketAddr) -> io::Result<()> {
        self.inner.send_to(datagram, dest).await?;
        Ok(())
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.inner.recv_from(buf).await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Ok(self.local_addr)
    }
}
