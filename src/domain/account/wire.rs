//! Wire types for the bank endpoints.

use crate::shared::AccountNo;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of the open-account request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpenAccountRequest {
    pub name: String,
}

/// Response of the open-account request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenAccountResponse {
    pub balance: Decimal,
    pub account_no: AccountNo,
}

/// Response of the balance query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BankAccount {
    pub account_no: AccountNo,
    #[serde(default)]
    pub name: Option<String>,
    pub balance: Decimal,
}
