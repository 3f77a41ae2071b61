//! Retransmit timer for the single in-flight frame.
//!
//! Stop-and-wait re-sends the outstanding frame whenever no matching ack
//! arrives within a fixed timeout.  There is no RTT estimation and no
//! back-off: every expiry re-arms the timer with the same duration.  Retries
//! are unbounded unless [`TimerConfig::max_retries`] is set.

use std::time::Duration;

use tokio::time::Instant;

/// Adjustable timeout parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerConfig {
    /// How long to wait for an ack before re-sending.
    pub retransmit_timeout: Duration,
    /// Give up after this many retransmissions of one frame.  `None` retries
    /// forever.
    pub max_retries: Option<u32>,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            retransmit_timeout: Duration::from_millis(250),
            max_retries: None,
        }
    }
}

/// What to do after the timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Retransmit,
    GiveUp,
}

/// A fixed-timeout timer guarding one frame.
#[derive(Debug)]
pub struct RetransmitTimer {
    config: TimerConfig,
    deadline: Instant,
    /// Expiries since the timer was last [`reset`](Self::reset).
    expirations: u32,
}

impl RetransmitTimer {
    /// Create a timer already armed from now.
    pub fn new(config: TimerConfig) -> Self {
        let deadline = Instant::now() + config.retransmit_timeout;
        Self {
            config,
            deadline,
            expirations: 0,
        }
    }

    /// Arm for a fresh frame: clears the expiry count.
    pub fn reset(&mut self) {
        self.expirations = 0;
        self.arm();
    }

    /// Start a new timeout period from now.
    pub fn arm(&mut self) {
        self.deadline = Instant::now() + self.config.retransmit_timeout;
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn expirations(&self) -> u32 {
        self.expirations
    }

    /// Record that the deadline passed without an ack.
    pub fn on_expired(&mut self) -> Expiry {
        self.expirations = self.expirations.saturating_add(1);
        match self.config.max_retries {
            Some(max) if self.expirations > max => Expiry::GiveUp,
            _ => Expiry::Retransmit,
        }
    }
}
