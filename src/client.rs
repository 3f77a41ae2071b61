//! Sending side: chunk a byte source and push it through stop-and-wait.
//!
//! ```ignore
//! let socket = Socket::bind("0.0.0.0:0".parse()?).await?;
//! let client = Client::new(socket, peer, ClientConfig::default())?;
//! let summary = client.send(tokio::fs::File::open(path).await?).await?;
//! ```
//!
//! Each chunk becomes one frame.  A frame is re-sent every
//! [`TimerConfig::retransmit_timeout`] until its own ack comes back; acks for
//! other sequence numbers are ignored.  After the source runs dry an empty
//! end-marker frame is delivered the same way, and only its ack makes the
//! transfer a success.

use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::TransferError;
use crate::frame::{Ack, HEADER_LEN, MAX_PAYLOAD};
use crate::sender::{AckOutcome, Sender};
use crate::socket::Transport;
use crate::timer::{Expiry, RetransmitTimer, TimerConfig};

/// Acks are 4 bytes; anything longer is truncated and still parsed.
const ACK_BUF: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Bytes read from the source per frame.
    pub chunk_size: usize,
    pub timer: TimerConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            chunk_size: MAX_PAYLOAD,
            timer: TimerConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), TransferError> {
        if self.chunk_size == 0 || self.chunk_size > MAX_PAYLOAD {
            return Err(TransferError::Config(format!(
                "chunk size must be between 1 and {MAX_PAYLOAD}, got {}",
                self.chunk_size
            )));
        }
        if self.timer.retransmit_timeout.is_zero() {
            return Err(TransferError::Config(
                "retransmit timeout must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Outcome of a successful send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendSummary {
    /// Frames delivered, end marker included.
    pub frames: u64,
    /// Payload bytes delivered.
    pub bytes: u64,
    pub retransmissions: u64,
}

/// Sends one byte stream to one peer.
#[derive(Debug)]
pub struct Client<T> {
    transport: T,
    peer: SocketAddr,
    config: ClientConfig,
}

impl<T: Transport> Client<T> {
    pub fn new(
        transport: T,
        peer: SocketAddr,
        config: ClientConfig,
    ) -> Result<Self, TransferError> {
        config.validate()?;
        Ok(Self {
            transport,
            peer,
            config,
        })
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Deliver everything `source` yields, then the end marker.
    ///
    /// Returns once the end marker is acknowledged.  Source and transport
    /// failures abort immediately.
    pub async fn send<R: AsyncRead + Unpin>(
        &self,
        mut source: R,
    ) -> Result<SendSummary, TransferError> {
        let mut sender = Sender::new();
        let mut summary = SendSummary::default();
        let mut chunk = vec![0u8; self.config.chunk_size];

        log::info!("[client] sending to {}", self.peer);
        loop {
            let n = read_chunk(&mut source, &mut chunk)
                .await
                .map_err(TransferError::Source)?;
            if n == 0 {
                break;
            }
            sender.next_frame(chunk[..n].to_vec())?;
            self.deliver(&mut sender, &mut summary).await?;
            summary.bytes += n as u64;
        }

        sender.next_frame(Vec::new())?;
        self.deliver(&mut sender, &mut summary).await?;

        log::info!(
            "[client] transfer to {} complete: {} bytes in {} frames, {} retransmissions",
            self.peer,
            summary.bytes,
            summary.frames,
            summary.retransmissions
        );
        Ok(summary)
    }

    /// Transmit the in-flight frame until its ack arrives.
    async fn deliver(
        &self,
        sender: &mut Sender,
        summary: &mut SendSummary,
    ) -> Result<(), TransferError> {
        let (seq, datagram) = match sender.in_flight() {
            Some(entry) => (entry.frame.seq, entry.frame.encode()),
            None => return Ok(()),
        };
        let mut timer = RetransmitTimer::new(self.config.timer.clone());
        let mut buf = [0u8; ACK_BUF];

        self.transmit(&datagram).await?;
        log::debug!("[client] → seq={seq} len={}", datagram.len() - HEADER_LEN);
        timer.reset();

        loop {
            let received = self
                .transport
                .recv_before(&mut buf, timer.deadline())
                .await
                .map_err(TransferError::Transport)?;

            match received {
                Some((n, addr)) => {
                    if addr != self.peer {
                        continue;
                    }
                    let Ok(ack) = Ack::decode(&buf[..n]) else {
                        continue;
                    };
                    match sender.on_ack(ack.seq) {
                        AckOutcome::Accepted => {
                            summary.frames += 1;
                            log::debug!("[client] ← ack seq={seq}");
                            return Ok(());
                        }
                        AckOutcome::Stale => {
                            log::trace!("[client] ← stale ack seq={} (awaiting {seq})", ack.seq);
                        }
                    }
                }
                None => {
                    if timer.on_expired() == Expiry::GiveUp {
                        let attempts = sender.in_flight().map_or(0, |e| e.tx_count);
                        return Err(TransferError::RetriesExhausted { seq, attempts });
                    }
                    self.transmit(&datagram).await?;
                    sender.on_retransmit();
                    summary.retransmissions += 1;
                    log::debug!(
                        "[client] timeout, retransmitting seq={seq} (attempt {})",
                        timer.expirations() + 1
                    );
                    timer.arm();
                }
            }
        }
    }

    async fn transmit(&self, datagram: &[u8]) -> Result<(), TransferError> {
        self.transport
            .send_to(datagram, self.peer)
            .await
            .map_err(TransferError::Transport)
    }
}

/// Fill `buf` from `source`, stopping early only at end of input.
///
/// Returns the number of bytes read; `0` means the source is exhausted.
async fn read_chunk<R: AsyncRead + Unpin>(
    source: &mut R,
    buf: &mut [u8],
) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]).await? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
