//! One receiver session: a [`Receiver`] bound to a sender address and a sink.
//!
//! A [`Session`] is created when the first frame from a new sender arrives
//! and is consumed by [`Session::finish`] once the end marker has been
//! applied.  It owns its sink exclusively; dropping an unfinished session
//! drops (and so closes) the sink without the final flush.

use std::net::SocketAddr;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::TransferError;
use crate::frame::Frame;
use crate::receiver::{Disposition, Receiver};
use crate::state::SessionStatus;

/// Result of a completed receive.
#[derive(Debug)]
pub struct TransferSummary<W> {
    pub peer: SocketAddr,
    pub bytes_written: u64,
    /// Frames handed to the session, duplicates included.
    pub frames_received: u64,
    pub duplicates: u64,
    /// Sequence number of the end marker.
    pub end_seq: u32,
    /// The sink, already flushed and shut down.
    pub sink: W,
}

#[derive(Debug)]
pub struct Session<W> {
    peer: SocketAddr,
    receiver: Receiver,
    sink: W,
    bytes_written: u64,
    frames_received: u64,
    duplicates: u64,
}

impl<W: AsyncWrite + Unpin> Session<W> {
    pub fn new(peer: SocketAddr, sink: W) -> Self {
        Self {
            peer,
            receiver: Receiver::new(),
            sink,
            bytes_written: 0,
            frames_received: 0,
            duplicates: 0,
        }
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Apply one frame and write whatever became contiguous to the sink.
    ///
    /// Acknowledging the frame is the caller's job and must happen first.
    pub async fn accept(&mut self, frame: Frame) -> Result<SessionStatus, TransferError> {
        self.frames_received += 1;
        let seq = frame.seq;

        match self.receiver.on_frame(frame) {
            Disposition::Applied { ready } => {
                for payload in ready {
                    self.sink
                        .write_all(&payload)
                        .await
                        .map_err(TransferError::Sink)?;
                    self.bytes_written += payload.len() as u64;
                }
                log::debug!(
                    "[session] {} applied seq={seq}; expecting {}",
                    self.peer,
                    self.receiver.expected_seq()
                );
            }
            Disposition::Buffered => {
                log::debug!(
                    "[session] {} buffered seq={seq} ({} held)",
                    self.peer,
                    self.receiver.buffered()
                );
            }
            Disposition::Duplicate => {
                self.duplicates += 1;
                log::debug!("[session] {} duplicate seq={seq} discarded", self.peer);
            }
        }

        Ok(if self.receiver.is_complete() {
            SessionStatus::Complete
        } else {
            SessionStatus::Open
        })
    }

    /// Flush and close the sink of a complete session.
    pub async fn finish(mut self) -> Result<TransferSummary<W>, TransferError> {
        debug_assert!(self.receiver.is_complete(), "finish called on an open session");
        if self.receiver.buffered() > 0 {
            log::warn!(
                "[session] {} discarding {} frame(s) beyond the end marker",
                self.peer,
                self.receiver.buffered()
            );
        }
        self.sink.flush().await.map_err(TransferError::Sink)?;
        self.sink.shutdown().await.map_err(TransferError::Sink)?;

        Ok(TransferSummary {
            peer: self.peer,
            bytes_written: self.bytes_written,
            frames_received: self.frames_received,
            duplicates: self.duplicates,
            end_seq: self.receiver.end_seq().unwrap_or_default(),
            sink: self.sink,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peer() -> SocketAddr {
        "127.0.0.1:5000".parse().unwrap()
    }

    fn data(seq: u32, payload: &[u8]) -> Frame {
        Frame::new(seq, payload.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn duplicate_frame_written_once() {
        let mut s = Session::new(peer(), Vec::new());
        assert_eq!(s.accept(data(0, b"abc")).await.unwrap(), SessionStatus::Open);
        assert_eq!(s.accept(data(0, b"abc")).await.unwrap(), SessionStatus::Open);
        assert_eq!(
            s.accept(Frame::end(1)).await.unwrap(),
            SessionStatus::Complete
        );

        let summary = s.finish().await.unwrap();
        assert_eq!(summary.sink, b"abc");
        assert_eq!(summary.bytes_written, 3);
        assert_eq!(summary.frames_received, 3);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.end_seq, 1);
    }

    #[tokio::test]
    async fn reordered_arrival_matches_in_order_output() {
        let frames = || {
            vec![
                data(0, b"alpha-"),
                data(1, b"beta-"),
                data(2, b"gamma"),
                Frame::end(3),
            ]
        };

        let mut in_order = Session::new(peer(), Vec::new());
        for f in frames() {
            in_order.accept(f).await.unwrap();
        }

        let mut shuffled = Session::new(peer(), Vec::new());
        let f = frames();
        for idx in [0, 2, 1, 3] {
            shuffled.accept(f[idx].clone()).await.unwrap();
        }

        let a = in_order.finish().await.unwrap();
        let b = shuffled.finish().await.unwrap();
        assert_eq!(a.sink, b"alpha-beta-gamma");
        assert_eq!(a.sink, b.sink);
    }

    #[tokio::test]
    async fn empty_stream_yields_empty_sink() {
        let mut s = Session::new(peer(), Vec::new());
        assert_eq!(
            s.accept(Frame::end(0)).await.unwrap(),
            SessionStatus::Complete
        );
        let summary = s.finish().await.unwrap();
        assert!(summary.sink.is_empty());
        assert_eq!(summary.bytes_written, 0);
    }
}
