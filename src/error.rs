//! Errors that abort a transfer.
//!
//! Transient protocol events (timeouts, stale acks, duplicate or malformed
//! frames) never show up here; the send and receive loops absorb them.  What
//! remains is fatal to the current session and is surfaced to the caller.

use thiserror::Error;

use crate::frame::FrameError;

#[derive(Error, Debug)]
pub enum TransferError {
    /// Reading the byte source failed.
    #[error("source read failed: {0}")]
    Source(#[source] std::io::Error),
    /// Opening, writing or closing the byte sink failed.
    #[error("sink write failed: {0}")]
    Sink(#[source] std::io::Error),
    /// Socket-level failure.
    #[error("transport error: {0}")]
    Transport(#[source] std::io::Error),
    #[error("invalid frame: {0}")]
    Frame(#[from] FrameError),
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The transfer needs more frames than a 32-bit sequence number can count.
    #[error("sequence space exhausted after {frames} frames")]
    SequenceExhausted { frames: u64 },
    /// Only returned when a retry cap is configured.
    #[error("frame {seq} unacknowledged after {attempts} transmissions")]
    RetriesExhausted { seq: u32, attempts: u32 },
}
