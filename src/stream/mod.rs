//! Push-stream layer: SSE decoding, channels, and the reconnecting client.
//!
//! The decoder and channel types are transport-free. The `native` feature adds
//! [`native::SseClient`], a `reqwest` + `tokio` supervisor that keeps one
//! subscription alive with exponential backoff.

pub mod channel;
pub mod sse;

#[cfg(feature = "native")]
pub mod native;

pub use channel::{Channel, FeedKind, PushEvent};
pub use sse::{SseDecoder, SseFrame};

/// Events emitted by a stream to its consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Connection established (first connect or reconnect).
    Connected,
    /// A dispatched SSE event.
    Message(SseFrame),
    /// Connection lost; a reconnect may follow.
    Disconnected { reason: String },
    /// A connection attempt failed.
    Error(String),
    /// Reconnect attempts exhausted; the stream is down for good.
    MaxReconnectReached,
    /// The server ended the subscription (HTTP 204); no reconnect follows.
    Stopped { reason: String },
}

/// Configuration for push-stream connections.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    pub reconnect: bool,
    /// First reconnect delay; doubled per failed attempt.
    pub base_reconnect_delay_ms: u32,
    /// Ceiling for a single reconnect delay.
    pub max_reconnect_delay_ms: u32,
    pub max_reconnect_attempts: u32,
    /// Silence (not even keep-alive comments) longer than this breaks the
    /// connection. `0` disables the check.
    pub idle_timeout_ms: u64,
    pub connect_timeout_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            reconnect: true,
            base_reconnect_delay_ms: 2000,
            max_reconnect_delay_ms: 60_000,
            max_reconnect_attempts: 20,
            idle_timeout_ms: 90_000,
            connect_timeout_ms: 30_000,
        }
    }
}

/// Connection state of a stream client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReadyState {
    Connecting = 0,
    Open = 1,
    Closed = 2,
}

impl From<u8> for ReadyState {
    fn from(v: u8) -> Self {
        match v {
            0 => ReadyState::Connecting,
            1 => ReadyState::Open,
            _ => ReadyState::Closed,
        }
    }
}

/// A live push subscription owned by a session.
///
/// `Sse` is the real transport. `Channel` lets an embedding app (or a test)
/// feed events from anywhere else.
#[cfg(feature = "native")]
pub enum Subscription {
    Sse(native::SseClient),
    Channel(tokio::sync::mpsc::Receiver<StreamEvent>),
}

#[cfg(feature = "native")]
impl Subscription {
    /// Next event; `None` once the source is gone.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        match self {
            Subscription::Sse(client) => client.next_event().await,
            Subscription::Channel(rx) => rx.recv().await,
        }
    }

    /// Stop the subscription and release its connection.
    pub async fn close(self) {
        match self {
            Subscription::Sse(mut client) => {
                if let Err(e) = client.disconnect().await {
                    tracing::warn!("Failed to disconnect {}: {}", client.url(), e);
                }
            }
            Subscription::Channel(mut rx) => rx.close(),
        }
    }
}
