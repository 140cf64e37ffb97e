//! Leaderboard state container: full snapshot replacement, no merging.

use super::wire::LeaderboardRow;
use super::LeaderboardEntry;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
    updated_at: Option<DateTime<Utc>>,
}

impl Leaderboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole ranking with a pushed snapshot.
    pub fn replace(&mut self, rows: Vec<LeaderboardRow>, received_at: DateTime<Utc>) {
        self.entries = super::convert::rank(rows);
        self.updated_at = Some(received_at);
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        &self.entries
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
