//! # Crypto Trader SDK
//!
//! Client-side state synchronization for the Crypto Trader game: open a bank
//! account, follow the live price, news and balance over push streams, and
//! buy or sell against the exchange.
//!
//! ## Architecture
//!
//! The SDK is organized in layers:
//!
//! 1. **Core**: Domain types, state containers, the session store and the
//!    view composer (always available, no I/O)
//! 2. **HTTP API**: `GameHttp` with per-endpoint retry policies
//! 3. **Streams**: SSE decoding, plus a reconnecting `SseClient` on `tokio` (native)
//! 4. **High-Level Client**: `CryptoTraderClient` with nested sub-clients
//! 5. **Session**: `GameSession` driving store, backend and push feeds (native)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cryptotrader_sdk::prelude::*;
//!
//! let client = CryptoTraderClient::builder()
//!     .base_url("http://localhost:8080")
//!     .build()?;
//!
//! let session = GameSession::new(client);
//! session.start("Alice").await?;
//! session.trade(Decimal::from(2)).await?;
//!
//! let mut views = session.watch();
//! while views.changed().await.is_ok() {
//!     println!("net worth {}", views.borrow().net_worth);
//! }
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes and formatting helpers.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, state.
pub mod domain;

/// Unified SDK error types.
pub mod error;

/// Base URL and endpoint paths.
pub mod network;

/// The session state store: actions, effects, generations.
pub mod store;

/// Display-ready projection of the store.
pub mod view;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// HTTP client with retry policies.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 3: Streams ─────────────────────────────────────────────────────────

/// Push streams: SSE decoding, channels, the reconnecting client.
pub mod stream;

// ── Layer 4: High-Level Client ───────────────────────────────────────────────

/// `CryptoTraderClient`, the primary entry point.
#[cfg(feature = "http")]
pub mod client;

/// The `GameBackend` seam used by the session controller.
#[cfg(feature = "native")]
pub mod backend;

// ── Layer 5: Session ─────────────────────────────────────────────────────────

/// `GameSession` drives a game and publishes its view.
#[cfg(feature = "native")]
pub mod session;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::AccountNo;
    pub use rust_decimal::Decimal;

    // Domain types
    pub use crate::domain::account::{Session, SessionState, SessionStatus};
    pub use crate::domain::leaderboard::{Leaderboard, LeaderboardEntry};
    pub use crate::domain::market::{MarketSnapshot, NewsFeed, NewsItem};
    pub use crate::domain::trade::{
        Settlement, Side, TradeOutcome, TradePhase, TradeState, TradeTicket,
    };

    // Store + view
    pub use crate::store::{Action, Alert, Effect, GameStore, Ignored, LinkState};
    pub use crate::view::{net_worth, GameView};

    // Errors
    pub use crate::error::{SdkError, SessionError, StreamError};

    // Network
    pub use crate::network::{Endpoints, DEFAULT_API_URL};

    // Streams
    pub use crate::stream::{Channel, FeedKind, PushEvent, SseFrame, StreamConfig, StreamEvent};

    // HTTP client + sub-clients
    #[cfg(feature = "http")]
    pub use crate::client::{BankClient, CryptoTraderClient, CryptoTraderClientBuilder, ExchangeClient};
    #[cfg(feature = "http")]
    pub use crate::http::retry::{RetryConfig, RetryPolicy};

    // Session controller
    #[cfg(feature = "native")]
    pub use crate::backend::GameBackend;
    #[cfg(feature = "native")]
    pub use crate::session::{FeedMode, GameSession, SessionConfig};
    #[cfg(feature = "native")]
    pub use crate::stream::Subscription;
}
