//! Shared newtypes and utilities used across all domain modules.
//!
//! These types are serialization-transparent: they serialize/deserialize identically
//! to the raw format the backend sends, so they can be used directly in wire types
//! without conversion overhead.

pub mod fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

// ─── AccountNo ───────────────────────────────────────────────────────────────

/// Newtype for bank account numbers handed out by the open-account endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AccountNo(String);

impl AccountNo {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for AccountNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountNo {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AccountNo {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl FromStr for AccountNo {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(AccountNo(s.to_string()))
    }
}

impl Serialize for AccountNo {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AccountNo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Some bank builds send the account number as a bare JSON number.
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::String(s) => Ok(AccountNo(s)),
            serde_json::Value::Number(n) => Ok(AccountNo(n.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "Invalid account number: {}",
                other
            ))),
        }
    }
}

// ─── Decimal parsing ─────────────────────────────────────────────────────────

/// Parse a plain-text decimal as sent in text bodies and text SSE events.
///
/// Surrounding whitespace and quotes are ignored. Scientific notation
/// (`1E+2`) is accepted.
pub fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    let trimmed = raw.trim().trim_matches('"');
    if trimmed.is_empty() {
        return Err("empty decimal".to_string());
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|e| format!("invalid decimal {:?}: {}", trimmed, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_no_from_string_and_number() {
        let a: AccountNo = serde_json::from_str("\"A1\"").unwrap();
        assert_eq!(a.as_str(), "A1");
        let b: AccountNo = serde_json::from_str("42").unwrap();
        assert_eq!(b.as_str(), "42");
        assert!(serde_json::from_str::<AccountNo>("true").is_err());
    }

    #[test]
    fn test_account_no_serializes_as_string() {
        let json = serde_json::to_string(&AccountNo::new("A1")).unwrap();
        assert_eq!(json, "\"A1\"");
    }

    #[test]
    fn test_parse_decimal_plain_and_padded() {
        assert_eq!(parse_decimal("100").unwrap(), Decimal::from(100));
        assert_eq!(parse_decimal(" 12.50\n").unwrap(), Decimal::new(1250, 2));
        assert_eq!(parse_decimal("\"3\"").unwrap(), Decimal::from(3));
    }

    #[test]
    fn test_parse_decimal_scientific() {
        assert_eq!(parse_decimal("1E+2").unwrap(), Decimal::from(100));
    }

    #[test]
    fn test_parse_decimal_rejects_garbage() {
        assert!(parse_decimal("").is_err());
        assert!(parse_decimal("abc").is_err());
    }
}
