//! Outbound frame state for stop-and-wait reliability.
//!
//! [`Sender`] assigns sequence numbers and tracks the single in-flight frame.
//! It does **not** touch the socket; [`crate::client::Client`] calls these
//! methods and owns the actual send/receive loop.
//!
//! # Stop-and-Wait contract
//! - At most **one** frame is in flight at any moment (`in_flight`).
//! - A new frame may only be built once the previous one is acknowledged.
//! - On matching ACK: the frame becomes [`FrameState::Acknowledged`] and
//!   `next_seq` advances by one.
//! - On any other ACK: nothing changes (stale ack from an earlier round).
//! - On timeout: increment `tx_count`; resend the same frame unchanged.

use crate::error::TransferError;
use crate::frame::Frame;
use crate::state::FrameState;

/// The frame currently guarded by the retransmit timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
    pub frame: Frame,
    pub state: FrameState,
    /// How many times this frame has been transmitted (1 = first send).
    pub tx_count: u32,
}

/// Outcome of feeding an ack number to the [`Sender`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// The in-flight frame is now acknowledged.
    Accepted,
    /// Ack for some other sequence number; keep waiting.
    Stale,
}

/// Stop-and-wait send-side state for one transfer.
#[derive(Debug, Default)]
pub struct Sender {
    /// Sequence number of the **next** frame to build.
    ///
    /// Kept wider than the wire field so exhaustion of the 32-bit space is
    /// detected instead of wrapping.
    next_seq: u64,

    /// The most recent frame, or `None` before the first one is built.
    in_flight: Option<InFlight>,
}

impl Sender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    /// Build the next data frame (or the end marker, for an empty `payload`)
    /// and place it in the in-flight slot.
    ///
    /// Panics in debug mode if the previous frame is still awaiting its ack.
    pub fn next_frame(&mut self, payload: Vec<u8>) -> Result<&Frame, TransferError> {
        debug_assert!(
            !self.has_unacked(),
            "next_frame called while a frame is still awaiting its ack"
        );
        let seq = u32::try_from(self.next_seq).map_err(|_| TransferError::SequenceExhausted {
            frames: self.next_seq,
        })?;
        let frame = Frame::new(seq, payload)?;
        let entry = self.in_flight.insert(InFlight {
            frame,
            state: FrameState::Awaiting,
            tx_count: 1,
        });
        Ok(&entry.frame)
    }

    /// Process an inbound ack number.
    pub fn on_ack(&mut self, ack_seq: u32) -> AckOutcome {
        match self.in_flight {
            Some(ref mut entry)
                if entry.state == FrameState::Awaiting && entry.frame.seq == ack_seq =>
            {
                entry.state = FrameState::Acknowledged;
                self.next_seq += 1;
                AckOutcome::Accepted
            }
            _ => AckOutcome::Stale,
        }
    }

    /// Increment the transmission count for the in-flight frame.
    ///
    /// Called by the send loop before each retransmission.
    pub fn on_retransmit(&mut self) {
        if let Some(ref mut entry) = self.in_flight {
            entry.tx_count += 1;
        }
    }

    /// The frame most recently built, in whatever state it is in.
    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    /// `true` when a frame is waiting for its ack.
    pub fn has_unacked(&self) -> bool {
        matches!(
            self.in_flight,
            Some(InFlight {
                state: FrameState::Awaiting,
                ..
            })
        )
    }
}
