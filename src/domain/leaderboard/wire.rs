//! Wire types for the leaderboard stream.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the pushed ranking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardRow {
    pub name: String,
    pub value: Decimal,
}
