//! Pending half-turn handle
//!
//! The controller hands out at most one live ticket. Cancelling (new match,
//! replay load) bumps the generation so any ticket issued earlier is stale.

use std::time::Duration;

/// Permission to run one scheduled half-turn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TurnTicket {
    generation: u64,
    delay: Duration,
}

impl TurnTicket {
    /// How long the front-end should wait before redeeming the ticket
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[derive(Clone, Debug, Default)]
pub struct TurnTimer {
    generation: u64,
    pending: Option<TurnTicket>,
}

impl TurnTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket, invalidating any outstanding one
    pub fn schedule(&mut self, delay: Duration) -> TurnTicket {
        self.generation += 1;
        let ticket = TurnTicket {
            generation: self.generation,
            delay,
        };
        self.pending = Some(ticket);
        ticket
    }

    /// Drop the outstanding ticket, if any
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            tracing::debug!("Cancelled pending turn (generation {})", self.generation);
        }
        self.generation += 1;
    }

    /// Consume `ticket` if it is the live one
    pub fn redeem(&mut self, ticket: TurnTicket) -> bool {
        if self.pending == Some(ticket) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
