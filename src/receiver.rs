//! Inbound frame sequencing.
//!
//! The [`Receiver`] is responsible for everything that happens *after* a raw
//! datagram is decoded into a [`Frame`] and *before* payload bytes reach the
//! sink:
//! - Applying the next expected frame.
//! - Holding early frames in a [`ReorderBuffer`] until the gap closes.
//! - Draining contiguous runs out of the buffer.
//! - Discarding duplicates and already-applied frames.
//! - Recording where the stream ends.
//!
//! The [`Receiver`] neither sends acks nor writes to the sink; it tells
//! [`crate::session::Session`] which payloads are ready, in order.

use std::collections::BTreeMap;

use crate::frame::Frame;

/// Frames that arrived ahead of the next expected sequence number.
#[derive(Debug, Default)]
pub struct ReorderBuffer {
    frames: BTreeMap<u32, Vec<u8>>,
}

impl ReorderBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `payload` under `seq` unless that sequence is already held.
    ///
    /// Returns `false` for a duplicate; the first arrival wins.
    pub fn insert(&mut self, seq: u32, payload: Vec<u8>) -> bool {
        match self.frames.entry(seq) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(payload);
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    pub fn pop(&mut self, seq: u32) -> Option<Vec<u8>> {
        self.frames.remove(&seq)
    }

    pub fn contains(&self, seq: u32) -> bool {
        self.frames.contains_key(&seq)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// What the [`Receiver`] did with one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// The frame was the next expected one.  `ready` holds every payload
    /// that became deliverable as a result, in sequence order; end markers
    /// contribute nothing to it.
    Applied { ready: Vec<Vec<u8>> },
    /// Held until the frames before it arrive.
    Buffered,
    /// Already applied, or already waiting in the buffer.
    Duplicate,
}

/// Receive-side sequencing state for one session.
#[derive(Debug, Default)]
pub struct Receiver {
    /// Next sequence number required to extend the in-order prefix.
    expected_seq: u32,
    /// Early arrivals.  Never holds `expected_seq` itself.
    buffer: ReorderBuffer,
    /// Sequence number of the end marker, once applied.
    end_seq: Option<u32>,
}

impl Receiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an inbound frame.
    pub fn on_frame(&mut self, frame: Frame) -> Disposition {
        if self.is_complete() || frame.seq < self.expected_seq {
            return Disposition::Duplicate;
        }
        if frame.seq > self.expected_seq {
            return if self.buffer.insert(frame.seq, frame.payload) {
                Disposition::Buffered
            } else {
                Disposition::Duplicate
            };
        }

        let mut ready = Vec::new();
        self.apply(frame.payload, &mut ready);
        while !self.is_complete() {
            match self.buffer.pop(self.expected_seq) {
                Some(payload) => self.apply(payload, &mut ready),
                None => break,
            }
        }
        Disposition::Applied { ready }
    }

    /// Apply the payload for `expected_seq` and advance past it.
    fn apply(&mut self, payload: Vec<u8>, ready: &mut Vec<Vec<u8>>) {
        if payload.is_empty() {
            self.end_seq = Some(self.expected_seq);
        } else {
            ready.push(payload);
        }
        // After the end marker at u32::MAX there is nothing left to expect.
        self.expected_seq = self.expected_seq.wrapping_add(1);
    }

    /// `true` once the end marker and everything before it are applied.
    ///
    /// The end marker is only ever applied in order, so this is equivalent
    /// to `expected_seq > end_seq`.
    pub fn is_complete(&self) -> bool {
        self.end_seq.is_some()
    }

    pub fn expected_seq(&self) -> u32 {
        self.expected_seq
    }

    pub fn end_seq(&self) -> Option<u32> {
        self.end_seq
    }

    /// Number of frames held out of order.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_buffered(&self, seq: u32) -> bool {
        self.buffer.contains(seq)
    }
}
