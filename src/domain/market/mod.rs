//! Market domain: the live asset price and the news ticker.

pub mod state;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use state::{MarketSnapshot, NewsFeed, NEWS_CAPACITY};

/// A single news headline as shown in the ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub headline: String,
    pub received_at: DateTime<Utc>,
}
