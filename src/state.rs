//! State types shared by the sender and receiver machines.
//!
//! Transitions live with their owners ([`crate::sender`] and
//! [`crate::session`]); this module only names the states.

/// Life of one frame on the sending side.
///
/// ```text
///  Awaiting ──matching ack──▶ Acknowledged
///     │  ▲
///     └──┘ timeout: retransmit the identical frame
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// Transmitted at least once; no matching ack yet.
    Awaiting,
    /// Matching ack received; the sender may move on.
    Acknowledged,
}

/// Progress of a receiver session after it processes one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// End marker not applied yet.
    Open,
    /// Every frame up to and including the end marker has been applied.
    Complete,
}
