//! Leaderboard domain: ranked net worth of the top players.

mod convert;
pub mod state;
pub mod wire;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use state::Leaderboard;

/// One ranked row. `rank` is 1-based, in the order the server sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub name: String,
    pub value: Decimal,
}
