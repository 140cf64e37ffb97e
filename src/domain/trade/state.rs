//! Trade state container: holdings, last error, and the single-flight phase.

use super::{Settlement, TradePhase, TradeTicket};
use rust_decimal::Decimal;

/// Trade-side view of the session.
///
/// `begin` is the only way to obtain a ticket and it refuses while another
/// ticket is outstanding, so overlapping trades cannot race.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeState {
    holdings: Decimal,
    phase: TradePhase,
    last_error: Option<String>,
    next_seq: u64,
}

impl TradeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holdings(&self) -> Decimal {
        self.holdings
    }

    pub fn phase(&self) -> TradePhase {
        self.phase
    }

    pub fn in_flight(&self) -> bool {
        !self.phase.is_idle()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Claim the single in-flight slot. `None` while another trade is pending.
    pub fn begin(&mut self, generation: u64) -> Option<TradeTicket> {
        if !self.phase.is_idle() {
            return None;
        }
        self.next_seq += 1;
        let ticket = TradeTicket {
            generation,
            seq: self.next_seq,
        };
        self.phase = TradePhase::InFlight(ticket);
        Some(ticket)
    }

    /// The exchange answered for `ticket`; move to `Settling`.
    pub fn respond(&mut self, ticket: TradeTicket) -> bool {
        match self.phase {
            TradePhase::InFlight(t) if t == ticket => {
                self.phase = TradePhase::Settling(ticket);
                true
            }
            _ => false,
        }
    }

    /// Finish `ticket`. `None` means the trade failed without a verdict
    /// (transport error, unexpected status): holdings and error are kept.
    ///
    /// Returns `false`, changing nothing, if `ticket` is not the outstanding one.
    pub fn settle(&mut self, ticket: TradeTicket, settlement: Option<Settlement>) -> bool {
        if self.phase.ticket() != Some(ticket) {
            return false;
        }
        match settlement {
            Some(Settlement::Filled { holdings }) => {
                self.holdings = holdings;
                self.last_error = None;
            }
            Some(Settlement::Rejected { message }) => {
                self.last_error = Some(message);
            }
            None => {}
        }
        self.phase = TradePhase::Idle;
        true
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    /// Back to a fresh session: zero holdings, no error, no ticket.
    ///
    /// The sequence counter survives so tickets stay unique.
    pub fn reset(&mut self) {
        self.holdings = Decimal::ZERO;
        self.phase = TradePhase::Idle;
        self.last_error = None;
    }
}
