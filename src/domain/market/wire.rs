//! Wire types for the market data stream.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One market data push: the latest price and any headlines since the last push.
///
/// The price-only aggregator omits `news`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketUpdate {
    #[serde(rename = "bitcoin")]
    pub price: Decimal,
    #[serde(default)]
    pub news: Vec<String>,
}
