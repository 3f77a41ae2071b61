//! Wire-format definitions for frames and acknowledgements.
//!
//! Every datagram a sender emits is a [`Frame`]; every datagram a receiver
//! answers with is an [`Ack`].  This module is responsible for:
//! - Defining the on-wire binary layout.
//! - Serialising frames and acks into byte buffers ready for transmission.
//! - Deserialising raw byte slices back, rejecting input too short to carry
//!   a sequence number.
//!
//! Pure encoding and decoding; sockets live in [`crate::socket`].
//!
//! # Wire format
//!
//! All multi-byte integers are **big-endian**.
//!
//! ```text
//!  0               1               2               3
//!  0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7 0 1 2 3 4 5 6 7
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                        Sequence Number                        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                 Payload (0..=1024 bytes, frames only)         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! A frame with an empty payload is the end-of-stream marker.  An ack is the
//! bare header echoing the sequence number of the frame it acknowledges.

use thiserror::Error;

/// Byte length of the sequence header on the wire.
pub const HEADER_LEN: usize = 4;

/// Largest payload a single frame may carry.
pub const MAX_PAYLOAD: usize = 1024;

/// Errors that can arise when building or parsing a datagram.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Datagram too short to contain the sequence header.
    #[error("datagram of {len} bytes is shorter than the {HEADER_LEN}-byte header")]
    TooShort { len: usize },
    /// Payload exceeds [`MAX_PAYLOAD`].
    #[error("payload of {len} bytes exceeds the {MAX_PAYLOAD}-byte limit")]
    PayloadTooLarge { len: usize },
}

/// One sequenced unit of the byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub seq: u32,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Build a frame, enforcing the payload limit.
    pub fn new(seq: u32, payload: Vec<u8>) -> Result<Self, FrameError> {
        if payload.len() > MAX_PAYLOAD {
            return Err(FrameError::PayloadTooLarge { len: payload.len() });
        }
        Ok(Self { seq, payload })
    }

    /// The end-of-stream marker at `seq`.
    pub fn end(seq: u32) -> Self {
        Self {
            seq,
            payload: Vec::new(),
        }
    }

    /// `true` for the zero-length end-of-stream marker.
    pub fn is_end(&self) -> bool {
        self.payload.is_empty()
    }

    /// Serialise this frame into a newly allocated byte vector.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_LEN + self.payload.len());
        buf.extend_from_slice(&self.seq.to_be_bytes());
        buf.extend_from_slice(&self.payload);
        buf
    }

    /// Parse a [`Frame`] from a raw datagram.
    ///
    /// Everything after the header is payload.  The payload limit is only
    /// enforced when building frames, so a receiver accepts whatever fits in
    /// one datagram.
    pub fn decode(buf: &[u8]) -> Result<Self, FrameError> {
        let seq = read_seq(buf)?;
        Ok(Self {
            seq,
            payload: buf[HEADER_LEN..].to_vec(),
        })
    }
}

/// Acknowledgement of a single frame.  Not cumulative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub seq: u32,
}

impl Ack {
    pub fn new(seq: u32) -> Self {
        Self { seq }
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        self.seq.to_be_bytes()
    }

    /// Parse an [`Ack`].  Trailing bytes after the header are ignored.
    pub fn decode(buf: &[u8]) -> Result<Self, FrameError> {
        read_seq(buf).map(Self::new)
    }
}

fn read_seq(buf: &[u8]) -> Result<u32, FrameError> {
    match buf.get(..HEADER_LEN) {
        Some(&[a, b, c, d]) => Ok(u32::from_be_bytes([a, b, c, d])),
        _ => Err(FrameError::TooShort { len: buf.len() }),
    }
}
