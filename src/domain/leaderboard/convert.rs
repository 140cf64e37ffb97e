//! Conversions from wire rows to ranked entries.

use super::wire::LeaderboardRow;
use super::LeaderboardEntry;

/// Number the rows 1..=n in received order.
pub(crate) fn rank(rows: Vec<LeaderboardRow>) -> Vec<LeaderboardEntry> {
    rows.into_iter()
        .zip(1u32..)
        .map(|(row, rank)| LeaderboardEntry {
            rank,
            name: row.name,
            value: row.value,
        })
        .collect()
}
