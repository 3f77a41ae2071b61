//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use udp_arq::{Frame, SinkFactory, Socket, Transport};

/// Bind a socket to an OS-assigned port on loopback.
pub async fn ephemeral() -> Socket {
    let addr: SocketAddr = "127.0.0.1:0".parse().unwrap();
    Socket::bind(addr).await.expect("bind failed")
}

/// In-memory sinks: every sender gets a fresh `Vec<u8>`.
#[derive(Debug, Default)]
pub struct MemorySinks {
    pub opened: Vec<SocketAddr>,
}

impl SinkFactory for MemorySinks {
    type Sink = Vec<u8>;

    async fn open(&mut self, peer: SocketAddr) -> io::Result<Vec<u8>> {
        self.opened.push(peer);
        Ok(Vec::new())
    }
}

/// Transport wrapper that records every datagram it receives.
#[derive(Debug)]
pub struct Recording<T> {
    pub inner: T,
    pub received: RefCell<Vec<Vec<u8>>>,
}

impl<T> Recording<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            received: RefCell::new(Vec::new()),
        }
    }

    /// Distinct frames seen, in first-arrival order, as `(seq, payload_len)`.
    pub fn frames(&self) -> Vec<(u32, usize)> {
        let mut seen: Vec<(u32, usize)> = Vec::new();
        for raw in self.received.borrow().iter() {
            if let Ok(frame) = Frame::decode(raw) {
                let entry = (frame.seq, frame.payload.len());
                if !seen.contains(&entry) {
                    seen.push(entry);
                }
            }
        }
        seen
    }
}

impl<T: Transport> Transport for Recording<T> {
    async fn send_to(&self, datagram: &[u8], dest: SocketAddr) -> io::Result<()> {
        self.inner.send_to(datagram, dest).await
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        let (n, from) = self.inner.recv_from(buf).await?;
        self.received.borrow_mut().push(buf[..n].to_vec());
        Ok((n, from))
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }
}

/// Receive the next datagram on `sock` or `None` after `wait`.
pub async fn recv_within(sock: &Socket, wait: Duration) -> Option<(Vec<u8>, SocketAddr)> {
    let mut buf = vec![0u8; 2048];
    let deadline = tokio::time::Instant::now() + wait;
    sock.recv_before(&mut buf, deadline)
        .await
        .expect("recv failed")
        .map(|(n, from)| (buf[..n].to_vec(), from))
}

/// Deterministic pseudo-random test data.
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}
