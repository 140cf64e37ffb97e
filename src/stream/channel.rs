//! Push channels and decoding of their frames into typed events.

use super::sse::SseFrame;
use crate::domain::leaderboard::wire::LeaderboardRow;
use crate::domain::market::wire::MarketUpdate;
use crate::error::StreamError;
use crate::network::Endpoints;
use crate::shared::{parse_decimal, AccountNo};
use rust_decimal::Decimal;

/// The push feeds a session can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeedKind {
    Market,
    Balance,
    Leaderboard,
    Broadcast,
}

impl FeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Market => "market",
            FeedKind::Balance => "balance",
            FeedKind::Leaderboard => "leaderboard",
            FeedKind::Broadcast => "broadcast",
        }
    }
}

/// A subscribable push channel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Price + news, default `message` events carrying JSON.
    Market,
    /// Balance of one account, `balance` events carrying plain text.
    Balance(AccountNo),
    /// Ranked list, default `message` events carrying a JSON array.
    Leaderboard,
    /// Multiplexed `bitcoin` and `leaderboard` events.
    Broadcast,
}

/// A decoded push.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    Market(MarketUpdate),
    Balance(Decimal),
    Leaderboard(Vec<LeaderboardRow>),
}

impl Channel {
    pub fn kind(&self) -> FeedKind {
        match self {
            Channel::Market => FeedKind::Market,
            Channel::Balance(_) => FeedKind::Balance,
            Channel::Leaderboard => FeedKind::Leaderboard,
            Channel::Broadcast => FeedKind::Broadcast,
        }
    }

    /// Endpoint path of this channel.
    pub fn path(&self, endpoints: &Endpoints) -> String {
        match self {
            Channel::Market => endpoints.market_watch.clone(),
            Channel::Balance(account_no) => endpoints.balance_watch_path(account_no),
            Channel::Leaderboard => endpoints.leaderboard_watch.clone(),
            Channel::Broadcast => endpoints.broadcast_watch.clone(),
        }
    }

    /// Whether the server pushes here even when nothing changes.
    ///
    /// Balance and leaderboard only push on change, so silence on them says
    /// nothing about the connection.
    pub fn has_steady_traffic(&self) -> bool {
        matches!(self, Channel::Market | Channel::Broadcast)
    }

    /// Decode a frame received on this channel.
    ///
    /// `Ok(None)` for event types the channel does not carry.
    pub fn decode(&self, frame: &SseFrame) -> Result<Option<PushEvent>, StreamError> {
        match (self, frame.event_name()) {
            (Channel::Market, "message") | (Channel::Broadcast, "bitcoin") => {
                decode_json(&frame.data).map(|u| Some(PushEvent::Market(u)))
            }
            (Channel::Balance(_), "balance") => parse_decimal(&frame.data)
                .map(|b| Some(PushEvent::Balance(b)))
                .map_err(StreamError::Decode),
            (Channel::Leaderboard, "message") | (Channel::Broadcast, "leaderboard") => {
                decode_json(&frame.data).map(|rows| Some(PushEvent::Leaderboard(rows)))
            }
            _ => Ok(None),
        }
    }
}

fn decode_json<T: serde::de::DeserializeOwned>(data: &str) -> Result<T, StreamError> {
    serde_json::from_str(data).map_err(|e| StreamError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_frame() {
        let ev = Channel::Market
            .decode(&SseFrame::message(r#"{"bitcoin": 50, "news": ["up"]}"#))
            .unwrap();
        match ev {
            Some(PushEvent::Market(u)) => {
                assert_eq!(u.price, Decimal::from(50));
                assert_eq!(u.news, vec!["up".to_string()]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_balance_only_from_named_event() {
        let channel = Channel::Balance(AccountNo::new("A1"));
        assert_eq!(
            channel.decode(&SseFrame::named("balance", "120.50")).unwrap(),
            Some(PushEvent::Balance(Decimal::new(12050, 2)))
        );
        assert_eq!(channel.decode(&SseFrame::message("1")).unwrap(), None);
        assert!(channel.decode(&SseFrame::named("balance", "n/a")).is_err());
    }

    #[test]
    fn test_broadcast_demux() {
        let market = Channel::Broadcast
            .decode(&SseFrame::named("bitcoin", r#"{"bitcoin": 1}"#))
            .unwrap();
        assert!(matches!(market, Some(PushEvent::Market(_))));

        let board = Channel::Broadcast
            .decode(&SseFrame::named("leaderboard", r#"[{"name":"a","value":1}]"#))
            .unwrap();
        assert!(matches!(board, Some(PushEvent::Leaderboard(rows)) if rows.len() == 1));

        assert_eq!(
            Channel::Broadcast.decode(&SseFrame::message("{}")).unwrap(),
            None
        );
    }

    #[test]
    fn test_malformed_json_is_decode_error() {
        let err = Channel::Leaderboard
            .decode(&SseFrame::message("not json"))
            .unwrap_err();
        assert!(matches!(err, StreamError::Decode(_)));
    }

    #[test]
    fn test_paths() {
        let endpoints = Endpoints::default();
        assert_eq!(Channel::Market.path(&endpoints), "/game/bitcoin/data/watch");
        assert_eq!(
            Channel::Balance(AccountNo::new("A1")).path(&endpoints),
            "/game/bank/balance/watch/A1"
        );
        assert_eq!(Channel::Broadcast.kind(), FeedKind::Broadcast);
    }

    #[test]
    fn test_steady_traffic_channels() {
        assert!(Channel::Market.has_steady_traffic());
        assert!(Channel::Broadcast.has_steady_traffic());
        assert!(!Channel::Balance(AccountNo::new("A1")).has_steady_traffic());
        assert!(!Channel::Leaderboard.has_steady_traffic());
    }
}
