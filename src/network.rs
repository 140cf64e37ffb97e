//! Network URL constants and endpoint paths for the game backend.

use crate::shared::AccountNo;

/// Default base URL (the game server of a local deployment).
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Endpoint paths, relative to the base URL.
///
/// `{accountNo}` and `{name}` placeholders are substituted (URL-encoded) by
/// the path helpers below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub open_account: String,
    pub balance: String,
    pub balance_watch: String,
    pub market_watch: String,
    pub trade: String,
    pub leaderboard_watch: String,
    pub broadcast_watch: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            open_account: "/game/bank/open".to_string(),
            balance: "/game/bank/balance/{accountNo}/{name}".to_string(),
            balance_watch: "/game/bank/balance/watch/{accountNo}".to_string(),
            market_watch: "/game/bitcoin/data/watch".to_string(),
            trade: "/game/trade/bitcoin".to_string(),
            leaderboard_watch: "/game/leaderboard".to_string(),
            broadcast_watch: "/game/broadcast".to_string(),
        }
    }
}

impl Endpoints {
    pub fn balance_path(&self, account_no: &AccountNo, name: &str) -> String {
        self.balance
            .replace("{accountNo}", &urlencoding::encode(account_no.as_str()))
            .replace("{name}", &urlencoding::encode(name))
    }

    pub fn balance_watch_path(&self, account_no: &AccountNo) -> String {
        self.balance_watch
            .replace("{accountNo}", &urlencoding::encode(account_no.as_str()))
    }
}

/// Join a base URL and an endpoint path without doubling slashes.
pub fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
