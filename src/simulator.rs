//! Fault-injecting network layer for exercising the reliability machinery.
//!
//! Real networks drop, reorder, and duplicate datagrams.  To test the ARQ
//! loops without depending on actual network conditions, [`Simulator`]
//! wraps any [`Transport`] and applies a configurable fault model to every
//! outbound datagram:
//!
//! | Fault       | Description                                             |
//! |-------------|---------------------------------------------------------|
//! | Loss        | Drop the datagram with probability `loss_rate`.         |
//! | Reordering  | Hold it back with probability `reorder_rate`; it is     |
//! |             | released right after the next datagram goes out.        |
//! | Duplication | Send it twice with probability `duplicate_rate`.        |
//!
//! The RNG is seeded, so a failing run replays exactly.  Receives pass
//! straight through; wrap both ends to disturb both directions.

use std::cell::RefCell;
use std::io;
use std::net::SocketAddr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::socket::Transport;

/// Configuration for the fault model.
///
/// Probabilities are clamped to `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    pub loss_rate: f64,
    pub reorder_rate: f64,
    pub duplicate_rate: f64,
    pub seed: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        // No faults by default: a transparent pass-through.
        Self {
            loss_rate: 0.0,
            reorder_rate: 0.0,
            duplicate_rate: 0.0,
            seed: 0,
        }
    }
}

/// Counts of faults injected so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaultStats {
    pub sent: u64,
    pub dropped: u64,
    pub duplicated: u64,
    pub reordered: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Fate {
    Drop,
    Hold,
    Duplicate,
    Deliver,
}

/// A fault-injecting wrapper around another transport.
#[derive(Debug)]
pub struct Simulator<T> {
    inner: T,
    config: SimulatorConfig,
    rng: RefCell<StdRng>,
    held: RefCell<Vec<(Vec<u8>, SocketAddr)>>,
    stats: RefCell<FaultStats>,
}

impl<T: Transport> Simulator<T> {
    pub fn new(inner: T, config: SimulatorConfig) -> Self {
        let config = SimulatorConfig {
            loss_rate: probability(config.loss_rate),
            reorder_rate: probability(config.reorder_rate),
            duplicate_rate: probability(config.duplicate_rate),
            seed: config.seed,
        };
        Self {
            inner,
            rng: RefCell::new(StdRng::seed_from_u64(config.seed)),
            config,
            held: RefCell::new(Vec::new()),
            stats: RefCell::new(FaultStats::default()),
        }
    }

    pub fn stats(&self) -> FaultStats {
        *self.stats.borrow()
    }

    fn roll(&self) -> Fate {
        let mut rng = self.rng.borrow_mut();
        if rng.random_bool(self.config.loss_rate) {
            Fate::Drop
        } else if rng.random_bool(self.config.reorder_rate) {
            Fate::Hold
        } else if rng.random_bool(self.config.duplicate_rate) {
            Fate::Duplicate
        } else {
            Fate::Deliver
        }
    }
}

impl<T: Transport> Transport for Simulator<T> {
    async fn send_to(&self, datagram: &[u8], dest: SocketAddr) -> io::Result<()> {
        let fate = self.roll();
        {
            let mut stats = self.stats.borrow_mut();
            stats.sent += 1;
            match fate {
                Fate::Drop => stats.dropped += 1,
                Fate::Hold => stats.reordered += 1,
                Fate::Duplicate => stats.duplicated += 1,
                Fate::Deliver => {}
            }
        }

        match fate {
            Fate::Drop => {
                log::trace!("[sim] dropped {} bytes to {dest}", datagram.len());
                return Ok(());
            }
            Fate::Hold => {
                log::trace!("[sim] holding {} bytes to {dest}", datagram.len());
                self.held.borrow_mut().push((datagram.to_vec(), dest));
                return Ok(());
            }
            Fate::Duplicate => {
                self.inner.send_to(datagram, dest).await?;
                self.inner.send_to(datagram, dest).await?;
            }
            Fate::Deliver => self.inner.send_to(datagram, dest).await?,
        }

        let released = std::mem::take(&mut *self.held.borrow_mut());
        for (held, to) in released {
            self.inner.send_to(&held, to).await?;
        }
        Ok(())
    }

    async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.inner.recv_from(buf).await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }
}

fn probability(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}
