//! Market state containers: app-owned, SDK-provided update logic.

use super::wire::MarketUpdate;
use super::NewsItem;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::VecDeque;

/// Maximum number of headlines kept in the ticker.
pub const NEWS_CAPACITY: usize = 5;

/// Bounded news ticker, most recent first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsFeed {
    items: VecDeque<NewsItem>,
}

impl NewsFeed {
    pub fn new() -> Self {
        Self {
            items: VecDeque::with_capacity(NEWS_CAPACITY),
        }
    }

    /// Put a batch of headlines in front of the existing ones.
    ///
    /// The batch keeps its incoming order; whatever falls past
    /// [`NEWS_CAPACITY`] is evicted.
    pub fn prepend(&mut self, headlines: Vec<String>, received_at: DateTime<Utc>) {
        for headline in headlines.into_iter().rev() {
            self.items.push_front(NewsItem {
                headline,
                received_at,
            });
        }
        self.items.truncate(NEWS_CAPACITY);
    }

    pub fn items(&self) -> &VecDeque<NewsItem> {
        &self.items
    }

    pub fn headlines(&self) -> Vec<String> {
        self.items.iter().map(|n| n.headline.clone()).collect()
    }

    pub fn latest(&self) -> Option<&NewsItem> {
        self.items.front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Latest price and news, fed by the market stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketSnapshot {
    price: Option<Decimal>,
    news: NewsFeed,
    updated_at: Option<DateTime<Utc>>,
}

impl MarketSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one market push: replace price, prepend headlines.
    pub fn apply(&mut self, update: MarketUpdate, received_at: DateTime<Utc>) {
        self.price = Some(update.price);
        self.news.prepend(update.news, received_at);
        self.updated_at = Some(received_at);
    }

    /// Price, `None` until the first push arrives.
    pub fn price(&self) -> Option<Decimal> {
        self.price
    }

    pub fn news(&self) -> &NewsFeed {
        &self.news
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
