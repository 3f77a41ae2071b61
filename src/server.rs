//! Receiving side: acknowledge, sequence and store incoming transfers.
//!
//! [`Listener::accept`] serves exactly one transfer: the first frame from a
//! sender opens a [`Session`] (and its sink), and the call returns once that
//! session has applied its end marker.  [`Listener::serve`] repeats this
//! forever, one sender after another.
//!
//! Per datagram:
//! 1. Drop it unacknowledged if it is too short to carry a sequence number.
//! 2. Outside the active session, a frame with sequence > 0 is a late
//!    retransmission of a finished transfer: acknowledge it and drop it.
//! 3. Drop it unacknowledged if another sender's session is active.
//! 4. Acknowledge it, whatever its novelty.
//! 5. Hand the frame to the session, opening one on sequence 0.
//!
//! A sender only transmits sequence 1 after sequence 0 was acknowledged, and
//! that ack opened a session, so only sequence 0 can start a transfer.  The
//! one ambiguous case is the end marker of an empty transfer, which is also
//! sequence 0; [`Linger`] remembers the most recently finished session so a
//! retransmission of that marker is re-acknowledged instead of reopening it.

use std::net::SocketAddr;

use crate::error::TransferError;
use crate::frame::{Ack, Frame};
use crate::session::{Session, TransferSummary};
use crate::sink::SinkFactory;
use crate::socket::{Transport, MAX_DATAGRAM};
use crate::state::SessionStatus;

/// The most recently completed session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Linger {
    pub peer: SocketAddr,
    pub end_seq: u32,
}

impl Linger {
    /// `true` for a late end marker of a finished empty transfer.
    ///
    /// Frames with a non-zero sequence never reach this check.
    fn absorbs(&self, addr: SocketAddr, frame: &Frame) -> bool {
        addr == self.peer && self.end_seq == 0 && frame.seq == 0 && frame.is_end()
    }
}

#[derive(Debug)]
pub struct Listener<T> {
    transport: T,
    linger: Option<Linger>,
}

impl<T: Transport> Listener<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            linger: None,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn linger(&self) -> Option<Linger> {
        self.linger
    }

    /// Receive one complete transfer.
    pub async fn accept<F: SinkFactory>(
        &mut self,
        sinks: &mut F,
    ) -> Result<TransferSummary<F::Sink>, TransferError> {
        let mut buf = vec![0u8; MAX_DATAGRAM];
        let mut session: Option<Session<F::Sink>> = None;

        loop {
            let (n, addr) = self
                .transport
                .recv_from(&mut buf)
                .await
                .map_err(TransferError::Transport)?;

            let frame = match Frame::decode(&buf[..n]) {
                Ok(frame) => frame,
                Err(e) => {
                    log::debug!("[server] dropping datagram from {addr}: {e}");
                    continue;
                }
            };

            let owned = session.as_ref().is_some_and(|active| active.peer() == addr);
            if !owned {
                if frame.seq != 0 || self.linger.is_some_and(|l| l.absorbs(addr, &frame)) {
                    self.send_ack(frame.seq, addr).await?;
                    log::debug!("[server] re-acked late seq={} from {addr}", frame.seq);
                    continue;
                }
                if let Some(active) = &session {
                    log::warn!(
                        "[server] ignoring seq={} from {addr} while receiving from {}",
                        frame.seq,
                        active.peer()
                    );
                    continue;
                }
            }

            self.send_ack(frame.seq, addr).await?;

            if session.is_none() {
                log::info!("[server] start of reception from {addr}");
                let sink = sinks.open(addr).await.map_err(TransferError::Sink)?;
                if self.linger.is_some_and(|l| l.peer == addr) {
                    self.linger = None;
                }
                session = Some(Session::new(addr, sink));
            }
            let Some(active) = session.as_mut() else {
                continue;
            };

            if active.accept(frame).await? == SessionStatus::Complete {
                if let Some(done) = session.take() {
                    let summary = done.finish().await?;
                    self.linger = Some(Linger {
                        peer: summary.peer,
                        end_seq: summary.end_seq,
                    });
                    log::info!(
                        "[server] end of reception from {}: {} bytes, {} frames ({} duplicate)",
                        summary.peer,
                        summary.bytes_written,
                        summary.frames_received,
                        summary.duplicates
                    );
                    return Ok(summary);
                }
            }
        }
    }

    /// Receive transfers one after another until a fatal error.
    pub async fn serve<F: SinkFactory>(&mut self, sinks: &mut F) -> Result<(), TransferError> {
        loop {
            self.accept(sinks).await?;
        }
    }

    async fn send_ack(&self, seq: u32, addr: SocketAddr) -> Result<(), TransferError> {
        self.transport
            .send_to(&Ack::new(seq).encode(), addr)
            .await
            .map_err(TransferError::Transport)
    }
}
