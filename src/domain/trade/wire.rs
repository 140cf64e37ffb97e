//! Wire types for the trade endpoint.

use crate::shared::AccountNo;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Trade request body. Positive `units` buy, negative sell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TradeRequest {
    pub name: String,
    pub bank_account_no: AccountNo,
    #[serde(with = "rust_decimal::serde::float")]
    pub units: Decimal,
}

/// Raw trade reply: the endpoint answers in plain text, not JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeReply {
    pub status: u16,
    pub body: String,
}

impl TradeReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_request_shape() {
        let req = TradeRequest {
            name: "Alice".into(),
            bank_account_no: AccountNo::new("A1"),
            units: Decimal::new(-25, 1),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "Alice", "bankAccountNo": "A1", "units": -2.5})
        );
    }
}
