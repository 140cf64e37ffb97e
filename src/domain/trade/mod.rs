//! Trade domain: buy/sell requests, holdings, and the single-flight guard.

#[cfg(feature = "http")]
pub mod client;
mod convert;
pub mod state;
pub mod wire;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use state::TradeState;

/// Identifies one trade request within one session generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeTicket {
    pub generation: u64,
    pub seq: u64,
}

/// Where the trade requester is.
///
/// At most one ticket exists at a time; a new trade can only begin from `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TradePhase {
    #[default]
    Idle,
    /// Request sent, waiting for the exchange.
    InFlight(TradeTicket),
    /// Response received, being reconciled into state.
    Settling(TradeTicket),
}

impl TradePhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, TradePhase::Idle)
    }

    pub fn ticket(&self) -> Option<TradeTicket> {
        match self {
            TradePhase::Idle => None,
            TradePhase::InFlight(t) | TradePhase::Settling(t) => Some(*t),
        }
    }
}

/// Direction implied by the sign of `units`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn of(units: &Decimal) -> Self {
        if units.is_sign_negative() {
            Side::Sell
        } else {
            Side::Buy
        }
    }

    /// Signed units for a positive quantity.
    pub fn units(self, quantity: Decimal) -> Decimal {
        match self {
            Side::Buy => quantity.abs(),
            Side::Sell => -quantity.abs(),
        }
    }
}

/// What the exchange made of a trade.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// Accepted; holdings after the trade.
    Filled { holdings: Decimal },
    /// Refused with a human-readable reason (insufficient funds, ...).
    Rejected { message: String },
}

/// Result of a `trade()` call as seen by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum TradeOutcome {
    Filled { holdings: Decimal },
    Rejected { message: String },
    /// Another trade was in flight; nothing was sent.
    Skipped,
}

impl From<Settlement> for TradeOutcome {
    fn from(s: Settlement) -> Self {
        match s {
            Settlement::Filled { holdings } => TradeOutcome::Filled { holdings },
            Settlement::Rejected { message } => TradeOutcome::Rejected { message },
        }
    }
}
