//! View composer: the display-ready projection of a [`GameStore`].
//!
//! Pure and recomputed after every state change. Currency amounts go through
//! [`fmt::decimal::currency`](crate::shared::fmt::decimal::currency).

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::account::SessionStatus;
use crate::shared::fmt::decimal::{currency, display};
use crate::store::{GameStore, LinkState};
use crate::stream::FeedKind;

/// `balance + price × holdings`. A missing price counts as zero.
pub fn net_worth(balance: Decimal, price: Option<Decimal>, holdings: Decimal) -> Decimal {
    let position = price.unwrap_or(Decimal::ZERO).saturating_mul(holdings);
    balance.saturating_add(position)
}

/// One formatted leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardLine {
    pub rank: u32,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedLine {
    pub feed: &'static str,
    pub live: bool,
    pub reconnecting: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameView {
    pub running: bool,
    pub starting: bool,
    pub name: Option<String>,
    pub account_no: Option<String>,
    pub balance: String,
    /// `None` until the first market push.
    pub price: Option<String>,
    pub holdings: String,
    pub net_worth: String,
    /// Most recent first.
    pub news: Vec<String>,
    pub leaderboard: Vec<LeaderboardLine>,
    pub trade_pending: bool,
    /// Last trade rejection, shown inline until dismissed.
    pub error: Option<String>,
    pub alert: Option<String>,
    pub feeds: Vec<FeedLine>,
}

impl Default for GameView {
    fn default() -> Self {
        Self::compose(&GameStore::default())
    }
}

impl GameView {
    pub fn compose(store: &GameStore) -> Self {
        let session = store.session();
        let trade = store.trade();
        let market = store.market();

        let balance = session.balance();
        let holdings = trade.holdings();

        Self {
            running: session.is_running(),
            starting: session.status() == SessionStatus::Starting,
            name: session.session().map(|s| s.name.clone()),
            account_no: session.session().map(|s| s.account_no.to_string()),
            balance: currency(&balance),
            price: market.price().map(|p| currency(&p)),
            holdings: display(&holdings),
            net_worth: currency(&net_worth(balance, market.price(), holdings)),
            news: market.news().headlines(),
            leaderboard: store
                .leaderboard()
                .entries()
                .iter()
                .map(|e| LeaderboardLine {
                    rank: e.rank,
                    name: e.name.clone(),
                    value: currency(&e.value),
                })
                .collect(),
            trade_pending: trade.in_flight(),
            error: trade
                .last_error()
                .filter(|e| !e.trim().is_empty())
                .map(str::to_string),
            alert: store.alert().map(|a| a.message()),
            feeds: store
                .feeds()
                .iter()
                .map(|(kind, state)| feed_line(*kind, *state))
                .collect(),
        }
    }
}

fn feed_line(kind: FeedKind, state: LinkState) -> FeedLine {
    FeedLine {
        feed: kind.as_str(),
        live: state == LinkState::Live,
        reconnecting: state == LinkState::Reconnecting,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::wire::OpenAccountResponse;
    use crate::domain::market::wire::MarketUpdate;
    use crate::domain::trade::Settlement;
    use crate::shared::AccountNo;
    use crate::store::{Action, Effect};
    use chrono::Utc;

    fn running_store(balance: i64) -> GameStore {
        let mut store = GameStore::new();
        store.apply(Action::SessionStart {
            name: "Alice".into(),
        });
        store.apply(Action::SessionOpened {
            generation: store.generation(),
            name: "Alice".into(),
            response: OpenAccountResponse {
                balance: Decimal::from(balance),
                account_no: AccountNo::new("A1"),
            },
        });
        store
    }

    #[test]
    fn test_net_worth() {
        assert_eq!(
            net_worth(Decimal::from(100), Some(Decimal::from(50)), Decimal::from(2)),
            Decimal::from(200)
        );
        assert_eq!(
            net_worth(Decimal::from(100), None, Decimal::from(2)),
            Decimal::from(100)
        );
    }

    #[test]
    fn test_compose_formats_net_worth() {
        let mut store = running_store(100);
        let gen = store.generation();
        store.apply(Action::PushMarket {
            generation: gen,
            update: MarketUpdate {
                price: Decimal::from(50),
                news: vec!["BTC up".into()],
            },
            received_at: Utc::now(),
        });
        let ticket = match store.apply(Action::TradeStart {
            units: Decimal::from(2),
        }) {
            Effect::SendTrade { ticket, .. } => ticket,
            other => panic!("unexpected {other:?}"),
        };
        assert!(GameView::compose(&store).trade_pending);
        store.apply(Action::TradeSettled {
            ticket,
            settlement: Settlement::Filled {
                holdings: Decimal::from(2),
            },
        });

        let view = GameView::compose(&store);
        assert_eq!(view.net_worth, "$200.00");
        assert_eq!(view.balance, "$100.00");
        assert_eq!(view.price.as_deref(), Some("$50.00"));
        assert_eq!(view.holdings, "2");
        assert_eq!(view.news, vec!["BTC up".to_string()]);
        assert_eq!(view.name.as_deref(), Some("Alice"));
        assert_eq!(view.account_no.as_deref(), Some("A1"));
        assert!(!view.trade_pending);
    }

    #[test]
    fn test_idle_view() {
        let view = GameView::default();
        assert!(!view.running);
        assert!(!view.starting);
        assert_eq!(view.balance, "$0.00");
        assert_eq!(view.net_worth, "$0.00");
        assert_eq!(view.price, None);
        assert!(view.feeds.is_empty());
    }

    #[test]
    fn test_error_and_alert_surface() {
        let mut store = running_store(10);
        let Effect::SendTrade { ticket, .. } = store.apply(Action::TradeStart {
            units: Decimal::ONE,
        }) else {
            panic!("trade not sent");
        };
        store.apply(Action::TradeSettled {
            ticket,
            settlement: Settlement::Rejected {
                message: "insufficient funds".into(),
            },
        });
        assert_eq!(
            GameView::compose(&store).error.as_deref(),
            Some("insufficient funds")
        );

        let Effect::SendTrade { ticket, .. } = store.apply(Action::TradeStart {
            units: Decimal::ONE,
        }) else {
            panic!("trade not sent");
        };
        store.apply(Action::TradeFailed {
            ticket,
            reason: "Server error 500".into(),
        });
        let view = GameView::compose(&store);
        assert_eq!(view.alert.as_deref(), Some("Trade failed: Server error 500"));
        assert_eq!(view.error.as_deref(), Some("insufficient funds"));
    }

    #[test]
    fn test_feed_lines() {
        let mut store = running_store(10);
        let gen = store.generation();
        store.apply(Action::FeedStatus {
            generation: gen,
            feed: FeedKind::Market,
            state: LinkState::Live,
        });
        store.apply(Action::FeedStatus {
            generation: gen,
            feed: FeedKind::Balance,
            state: LinkState::Reconnecting,
        });
        let view = GameView::compose(&store);
        assert_eq!(view.feeds.len(), 2);
        assert_eq!(view.feeds[0].feed, "market");
        assert!(view.feeds[0].live);
        assert!(view.feeds[1].reconnecting);
    }
}
