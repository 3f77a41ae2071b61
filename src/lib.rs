//! `udp-arq` — reliable, in-order byte-stream transfer over UDP using
//! stop-and-wait ARQ.
//!
//! # Architecture
//!
//! ```text
//!  ┌──────────┐    frames    ┌──────────┐
//!  │  Client  │─────────────▶│ Listener │
//!  │ (Sender) │              │(Session +│
//!  └────┬─────┘◀─────────────│ Receiver)│
//!       │         acks       └─────┬────┘
//!       │                          │
//!  ┌────▼──────────────────────────▼───┐
//!  │      Transport (Socket, or a      │
//!  │   Simulator wrapping a Socket)    │
//!  └───────────────────────────────────┘
//! ```
//!
//! Each module has a single responsibility:
//! - [`frame`]      — wire format (serialise / deserialise)
//! - [`socket`]     — datagram transport trait and UDP socket
//! - [`timer`]      — fixed-timeout retransmit timer
//! - [`state`]      — per-frame and per-session state types
//! - [`sender`]     — stop-and-wait outbound frame state
//! - [`client`]     — chunking and the send/retransmit loop
//! - [`receiver`]   — reorder buffer and inbound sequencing
//! - [`session`]    — one receiver session bound to a sink
//! - [`server`]     — listener loop: ack, demux, session lifecycle
//! - [`sink`]       — per-sender sink factory and output naming
//! - [`simulator`]  — lossy/duplicating/reordering transport for testing
//! - [`error`]      — fatal transfer errors

pub mod client;
pub mod error;
pub mod frame;
pub mod receiver;
pub mod sender;
pub mod server;
pub mod session;
pub mod simulator;
pub mod sink;
pub mod socket;
pub mod state;
pub mod timer;

pub use client::{Client, ClientConfig, SendSummary};
pub use error::TransferError;
pub use frame::{Ack, Frame, FrameError, HEADER_LEN, MAX_PAYLOAD};
pub use server::Listener;
pub use session::TransferSummary;
pub use sink::{FileSinks, SinkFactory};
pub use socket::{Socket, Transport};
pub use timer::TimerConfig;
