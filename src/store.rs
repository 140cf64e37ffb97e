//! Session state store: one value, mutated only through [`GameStore::apply`].
//!
//! Each [`Action`] updates one slice of state and returns an [`Effect`] the
//! controller must carry out (open an account, subscribe, send a trade...).
//! The store does no I/O, so every transition is testable without a runtime.
//!
//! Every push and every trade ticket carries the session generation it was
//! issued under. Start and restart bump the generation, which turns anything
//! still in the air from the previous session into [`Ignored::Stale`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::account::wire::OpenAccountResponse;
use crate::domain::account::{Session, SessionState, SessionStatus};
use crate::domain::leaderboard::wire::LeaderboardRow;
use crate::domain::leaderboard::Leaderboard;
use crate::domain::market::wire::MarketUpdate;
use crate::domain::market::MarketSnapshot;
use crate::domain::trade::wire::TradeRequest;
use crate::domain::trade::{Settlement, TradeState, TradeTicket};
use crate::shared::AccountNo;
use crate::stream::FeedKind;

/// Link state of one push feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Not subscribed, or given up for good.
    Down,
    Live,
    /// Connection lost; the supervisor is backing off.
    Reconnecting,
}

/// A dismissable, app-wide notice for failures without a dedicated slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Alert {
    StartFailed { reason: String },
    TradeFailed { reason: String },
}

impl Alert {
    pub fn message(&self) -> String {
        match self {
            Alert::StartFailed { reason } => format!("Could not start the game: {}", reason),
            Alert::TradeFailed { reason } => format!("Trade failed: {}", reason),
        }
    }
}

/// Everything that can happen to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SessionStart {
        name: String,
    },
    SessionOpened {
        generation: u64,
        name: String,
        response: OpenAccountResponse,
    },
    SessionFailed {
        generation: u64,
        reason: String,
    },
    SessionRestart,
    PushBalance {
        generation: u64,
        balance: Decimal,
    },
    PushMarket {
        generation: u64,
        update: MarketUpdate,
        received_at: DateTime<Utc>,
    },
    PushLeaderboard {
        generation: u64,
        rows: Vec<LeaderboardRow>,
        received_at: DateTime<Utc>,
    },
    FeedStatus {
        generation: u64,
        feed: FeedKind,
        state: LinkState,
    },
    TradeStart {
        units: Decimal,
    },
    TradeResponded {
        ticket: TradeTicket,
    },
    TradeSettled {
        ticket: TradeTicket,
        settlement: Settlement,
    },
    TradeFailed {
        ticket: TradeTicket,
        reason: String,
    },
    DismissError,
    DismissAlert,
}

/// Why an action changed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// Issued under an older generation, or for a ticket that is not outstanding.
    Stale,
    TradeInFlight,
    NotRunning,
    AlreadyRunning,
    StartPending,
}

/// Work the controller must do after an action.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Ignored(Ignored),
    OpenAccount {
        generation: u64,
        name: String,
    },
    Subscribe {
        generation: u64,
        account_no: AccountNo,
        name: String,
    },
    /// Tear down every subscription opened before `generation`.
    Unsubscribe { generation: u64 },
    SendTrade {
        ticket: TradeTicket,
        request: TradeRequest,
    },
}

impl Effect {
    pub fn is_ignored(&self) -> bool {
        matches!(self, Effect::Ignored(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameStore {
    session: SessionState,
    trade: TradeState,
    market: MarketSnapshot,
    leaderboard: Leaderboard,
    feeds: BTreeMap<FeedKind, LinkState>,
    alert: Option<Alert>,
    generation: u64,
}

impl GameStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Read access ──────────────────────────────────────────────────────

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn trade(&self) -> &TradeState {
        &self.trade
    }

    pub fn market(&self) -> &MarketSnapshot {
        &self.market
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn feeds(&self) -> &BTreeMap<FeedKind, LinkState> {
        &self.feeds
    }

    pub fn feed(&self, kind: FeedKind) -> LinkState {
        self.feeds.get(&kind).copied().unwrap_or(LinkState::Down)
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    // ── Transitions ──────────────────────────────────────────────────────

    pub fn apply(&mut self, action: Action) -> Effect {
        match action {
            Action::SessionStart { name } => self.start(name),
            Action::SessionOpened {
                generation,
                name,
                response,
            } => self.opened(generation, name, response),
            Action::SessionFailed { generation, reason } => {
                if !self.is_current(generation) || self.session.status() != SessionStatus::Starting
                {
                    return Effect::Ignored(Ignored::Stale);
                }
                self.session.fail();
                self.alert = Some(Alert::StartFailed { reason });
                Effect::None
            }
            Action::SessionRestart => {
                self.reset();
                Effect::Unsubscribe {
                    generation: self.generation,
                }
            }
            Action::PushBalance {
                generation,
                balance,
            } => {
                if !self.is_current(generation) {
                    return Effect::Ignored(Ignored::Stale);
                }
                if !self.session.set_balance(balance) {
                    return Effect::Ignored(Ignored::NotRunning);
                }
                Effect::None
            }
            Action::PushMarket {
                generation,
                update,
                received_at,
            } => {
                if !self.is_current(generation) {
                    return Effect::Ignored(Ignored::Stale);
                }
                self.market.apply(update, received_at);
                Effect::None
            }
            Action::PushLeaderboard {
                generation,
                rows,
                received_at,
            } => {
                if !self.is_current(generation) {
                    return Effect::Ignored(Ignored::Stale);
                }
                self.leaderboard.replace(rows, received_at);
                Effect::None
            }
            Action::FeedStatus {
                generation,
                feed,
                state,
            } => {
                if !self.is_current(generation) {
                    return Effect::Ignored(Ignored::Stale);
                }
                self.feeds.insert(feed, state);
                Effect::None
            }
            Action::TradeStart { units } => self.trade_start(units),
            Action::TradeResponded { ticket } => {
                if !self.is_current(ticket.generation) || !self.trade.respond(ticket) {
                    return Effect::Ignored(Ignored::Stale);
                }
                Effect::None
            }
            Action::TradeSettled { ticket, settlement } => {
                if !self.is_current(ticket.generation)
                    || !self.trade.settle(ticket, Some(settlement))
                {
                    return Effect::Ignored(Ignored::Stale);
                }
                Effect::None
            }
            Action::TradeFailed { ticket, reason } => {
                if !self.is_current(ticket.generation) || !self.trade.settle(ticket, None) {
                    return Effect::Ignored(Ignored::Stale);
                }
                self.alert = Some(Alert::TradeFailed { reason });
                Effect::None
            }
            Action::DismissError => {
                self.trade.dismiss_error();
                Effect::None
            }
            Action::DismissAlert => {
                self.alert = None;
                Effect::None
            }
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    fn start(&mut self, name: String) -> Effect {
        match self.session.status() {
            SessionStatus::Starting => return Effect::Ignored(Ignored::StartPending),
            SessionStatus::Running => return Effect::Ignored(Ignored::AlreadyRunning),
            SessionStatus::Idle => {}
        }
        self.reset();
        self.session.begin();
        Effect::OpenAccount {
            generation: self.generation,
            name,
        }
    }

    fn opened(&mut self, generation: u64, name: String, response: OpenAccountResponse) -> Effect {
        if !self.is_current(generation) || self.session.status() != SessionStatus::Starting {
            return Effect::Ignored(Ignored::Stale);
        }
        let session = Session::from((name, response));
        let effect = Effect::Subscribe {
            generation,
            account_no: session.account_no.clone(),
            name: session.name.clone(),
        };
        self.session.open(session);
        self.trade.reset();
        effect
    }

    fn trade_start(&mut self, units: Decimal) -> Effect {
        let Some(session) = self.session.session().filter(|_| self.session.is_running()) else {
            return Effect::Ignored(Ignored::NotRunning);
        };
        let request = TradeRequest {
            name: session.name.clone(),
            bank_account_no: session.account_no.clone(),
            units,
        };
        match self.trade.begin(self.generation) {
            Some(ticket) => Effect::SendTrade { ticket, request },
            None => Effect::Ignored(Ignored::TradeInFlight),
        }
    }

    /// Drop everything session-scoped and open a new generation.
    fn reset(&mut self) {
        self.generation += 1;
        self.session.clear();
        self.trade.reset();
        self.market.clear();
        self.leaderboard.clear();
        self.feeds.clear();
        self.alert = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::TradePhase;

    fn opened_response(balance: i64) -> OpenAccountResponse {
        OpenAccountResponse {
            balance: Decimal::from(balance),
            account_no: AccountNo::new("A1"),
        }
    }

    fn running_store() -> GameStore {
        let mut store = GameStore::new();
        let generation = match store.apply(Action::SessionStart {
            name: "Alice".into(),
        }) {
            Effect::OpenAccount { generation, .. } => generation,
            other => panic!("unexpected {other:?}"),
        };
        store.apply(Action::SessionOpened {
            generation,
            name: "Alice".into(),
            response: opened_response(100),
        });
        store
    }

    fn start_trade(store: &mut GameStore, units: i64) -> TradeTicket {
        match store.apply(Action::TradeStart {
            units: Decimal::from(units),
        }) {
            Effect::SendTrade { ticket, .. } => ticket,
            other => panic!("unexpected {other:?}"),
        }
    }

    fn update(price: i64, news: &[&str]) -> MarketUpdate {
        MarketUpdate {
            price: Decimal::from(price),
            news: news.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_start_then_opened_runs_session() {
        let mut store = GameStore::new();
        let effect = store.apply(Action::SessionStart {
            name: "Alice".into(),
        });
        assert_eq!(
            effect,
            Effect::OpenAccount {
                generation: 1,
                name: "Alice".into()
            }
        );
        assert_eq!(store.session().status(), SessionStatus::Starting);

        let effect = store.apply(Action::SessionOpened {
            generation: 1,
            name: "Alice".into(),
            response: opened_response(100),
        });
        assert_eq!(
            effect,
            Effect::Subscribe {
                generation: 1,
                account_no: AccountNo::new("A1"),
                name: "Alice".into()
            }
        );

        let session = store.session().session().unwrap();
        assert!(store.session().is_running());
        assert_eq!(session.name, "Alice");
        assert_eq!(session.account_no.as_str(), "A1");
        assert_eq!(store.session().balance(), Decimal::from(100));
        assert_eq!(store.trade().holdings(), Decimal::ZERO);
    }

    #[test]
    fn test_start_rejected_while_pending_or_running() {
        let mut store = GameStore::new();
        store.apply(Action::SessionStart { name: "A".into() });
        assert_eq!(
            store.apply(Action::SessionStart { name: "B".into() }),
            Effect::Ignored(Ignored::StartPending)
        );
        assert_eq!(store.generation(), 1);

        let mut store = running_store();
        assert_eq!(
            store.apply(Action::SessionStart { name: "B".into() }),
            Effect::Ignored(Ignored::AlreadyRunning)
        );
        assert_eq!(store.session().session().unwrap().name, "Alice");
    }

    #[test]
    fn test_start_failure_raises_alert() {
        let mut store = GameStore::new();
        store.apply(Action::SessionStart { name: "A".into() });
        store.apply(Action::SessionFailed {
            generation: 1,
            reason: "connection refused".into(),
        });
        assert_eq!(store.session().status(), SessionStatus::Idle);
        assert!(matches!(store.alert(), Some(Alert::StartFailed { .. })));

        // A fresh start clears the alert.
        store.apply(Action::SessionStart { name: "A".into() });
        assert!(store.alert().is_none());
    }

    #[test]
    fn test_balance_push_replaces_balance() {
        let mut store = running_store();
        let gen = store.generation();
        store.apply(Action::PushBalance {
            generation: gen,
            balance: Decimal::new(9050, 2),
        });
        assert_eq!(store.session().balance(), Decimal::new(9050, 2));
    }

    #[test]
    fn test_news_bounded_newest_first() {
        let mut store = running_store();
        let gen = store.generation();
        let now = Utc::now();
        for (i, news) in [&["a", "b"][..], &["c"][..], &["d", "e", "f"][..]].iter().enumerate() {
            store.apply(Action::PushMarket {
                generation: gen,
                update: update(10 + i as i64, news),
                received_at: now,
            });
            assert!(store.market().news().len() <= 5);
        }
        assert_eq!(store.market().news().headlines(), vec!["d", "e", "f", "c", "a"]);
        assert_eq!(store.market().price(), Some(Decimal::from(12)));
    }

    #[test]
    fn test_second_trade_is_noop_while_in_flight() {
        let mut store = running_store();
        let ticket = start_trade(&mut store, 2);
        let before = store.trade().clone();

        assert_eq!(
            store.apply(Action::TradeStart {
                units: Decimal::from(5)
            }),
            Effect::Ignored(Ignored::TradeInFlight)
        );
        assert_eq!(store.trade(), &before);
        assert_eq!(store.trade().phase(), TradePhase::InFlight(ticket));
    }

    #[test]
    fn test_trade_request_carries_identity() {
        let mut store = running_store();
        match store.apply(Action::TradeStart {
            units: Decimal::from(-3),
        }) {
            Effect::SendTrade { request, .. } => {
                assert_eq!(request.name, "Alice");
                assert_eq!(request.bank_account_no.as_str(), "A1");
                assert_eq!(request.units, Decimal::from(-3));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_rejection_then_success_clears_error() {
        let mut store = running_store();
        let ticket = start_trade(&mut store, 1);
        store.apply(Action::TradeResponded { ticket });
        assert_eq!(store.trade().phase(), TradePhase::Settling(ticket));
        store.apply(Action::TradeSettled {
            ticket,
            settlement: Settlement::Rejected {
                message: "insufficient funds".into(),
            },
        });
        assert_eq!(store.trade().last_error(), Some("insufficient funds"));
        assert_eq!(store.trade().holdings(), Decimal::ZERO);
        assert!(!store.trade().in_flight());

        let ticket = start_trade(&mut store, 1);
        store.apply(Action::TradeSettled {
            ticket,
            settlement: Settlement::Filled {
                holdings: Decimal::from(1),
            },
        });
        assert_eq!(store.trade().last_error(), None);
        assert_eq!(store.trade().holdings(), Decimal::from(1));
    }

    #[test]
    fn test_trade_failure_alerts_and_keeps_state() {
        let mut store = running_store();
        let ticket = start_trade(&mut store, 1);
        store.apply(Action::TradeFailed {
            ticket,
            reason: "Server error 500".into(),
        });
        assert!(matches!(store.alert(), Some(Alert::TradeFailed { .. })));
        assert_eq!(store.trade().holdings(), Decimal::ZERO);
        assert!(!store.trade().in_flight());

        // Settled once; a duplicate completion changes nothing.
        assert_eq!(
            store.apply(Action::TradeFailed {
                ticket,
                reason: "again".into()
            }),
            Effect::Ignored(Ignored::Stale)
        );
    }

    #[test]
    fn test_trade_rejected_when_not_running() {
        let mut store = GameStore::new();
        assert_eq!(
            store.apply(Action::TradeStart {
                units: Decimal::ONE
            }),
            Effect::Ignored(Ignored::NotRunning)
        );
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut store = running_store();
        let gen = store.generation();
        store.apply(Action::PushMarket {
            generation: gen,
            update: update(50, &["x"]),
            received_at: Utc::now(),
        });
        let ticket = start_trade(&mut store, 2);
        store.apply(Action::TradeSettled {
            ticket,
            settlement: Settlement::Filled {
                holdings: Decimal::from(2),
            },
        });
        start_trade(&mut store, 1);

        assert_eq!(
            store.apply(Action::SessionRestart),
            Effect::Unsubscribe {
                generation: gen + 1
            }
        );
        assert!(!store.session().is_running());
        assert!(store.session().session().is_none());
        assert_eq!(store.session().balance(), Decimal::ZERO);
        assert_eq!(store.trade().holdings(), Decimal::ZERO);
        assert!(!store.trade().in_flight());
        assert!(store.market().news().is_empty());
        assert_eq!(store.market().price(), None);
        assert!(store.generation() > gen);
    }

    #[test]
    fn test_stale_generation_is_ignored() {
        let mut store = running_store();
        let old = store.generation();
        let ticket = start_trade(&mut store, 2);
        store.apply(Action::SessionRestart);

        let mut fresh = store.clone();
        fresh.apply(Action::SessionStart { name: "Bob".into() });
        let gen = fresh.generation();
        fresh.apply(Action::SessionOpened {
            generation: gen,
            name: "Bob".into(),
            response: opened_response(10),
        });

        for action in [
            Action::PushBalance {
                generation: old,
                balance: Decimal::from(999),
            },
            Action::PushMarket {
                generation: old,
                update: update(1, &["old"]),
                received_at: Utc::now(),
            },
            Action::TradeSettled {
                ticket,
                settlement: Settlement::Filled {
                    holdings: Decimal::from(2),
                },
            },
            Action::FeedStatus {
                generation: old,
                feed: FeedKind::Market,
                state: LinkState::Live,
            },
        ] {
            assert_eq!(fresh.apply(action), Effect::Ignored(Ignored::Stale));
        }
        assert_eq!(fresh.session().balance(), Decimal::from(10));
        assert_eq!(fresh.trade().holdings(), Decimal::ZERO);
        assert!(fresh.market().news().is_empty());
        assert_eq!(fresh.feed(FeedKind::Market), LinkState::Down);
    }

    #[test]
    fn test_late_open_response_after_restart_is_ignored() {
        let mut store = GameStore::new();
        store.apply(Action::SessionStart { name: "A".into() });
        store.apply(Action::SessionRestart);
        assert_eq!(
            store.apply(Action::SessionOpened {
                generation: 1,
                name: "A".into(),
                response: opened_response(100),
            }),
            Effect::Ignored(Ignored::Stale)
        );
        assert!(!store.session().is_running());
    }

    #[test]
    fn test_feed_status_and_dismissals() {
        let mut store = running_store();
        let gen = store.generation();
        store.apply(Action::FeedStatus {
            generation: gen,
            feed: FeedKind::Balance,
            state: LinkState::Reconnecting,
        });
        assert_eq!(store.feed(FeedKind::Balance), LinkState::Reconnecting);

        let ticket = start_trade(&mut store, 1);
        store.apply(Action::TradeSettled {
            ticket,
            settlement: Settlement::Rejected {
                message: "no".into(),
            },
        });
        store.apply(Action::DismissError);
        assert_eq!(store.trade().last_error(), None);

        let ticket = start_trade(&mut store, 1);
        store.apply(Action::TradeFailed {
            ticket,
            reason: "boom".into(),
        });
        store.apply(Action::DismissAlert);
        assert!(store.alert().is_none());
    }
}
