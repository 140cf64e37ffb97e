//! Account domain: the player's bank account and session identity.

#[cfg(feature = "http")]
pub mod client;
pub mod state;
pub mod wire;

use crate::shared::AccountNo;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use state::{SessionState, SessionStatus};

/// An open game session: who is playing and what their bank holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    pub account_no: AccountNo,
    pub balance: Decimal,
}

impl From<(String, wire::OpenAccountResponse)> for Session {
    fn from((name, resp): (String, wire::OpenAccountResponse)) -> Self {
        Self {
            name,
            account_no: resp.account_no,
            balance: resp.balance,
        }
    }
}
