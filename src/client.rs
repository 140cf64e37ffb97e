//! High-level client: `CryptoTraderClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`.
//! This module keeps the builder, endpoint configuration, and accessor methods.

use crate::domain::account::client::Bank;
use crate::domain::trade::client::Exchange;
use crate::error::SdkError;
use crate::http::{GameHttp, RetryConfig};
use crate::network::{join_url, Endpoints};
use crate::stream::StreamConfig;

use std::time::Duration;

// Re-export sub-client types for convenience.
pub use crate::domain::account::client::Bank as BankClient;
pub use crate::domain::trade::client::Exchange as ExchangeClient;

/// The primary entry point for talking to the game backend.
///
/// Provides nested sub-client accessors: `client.bank()`, `client.exchange()`.
/// With the `native` feature it also opens push subscriptions.
#[derive(Clone)]
pub struct CryptoTraderClient {
    pub(crate) http: GameHttp,
    pub(crate) endpoints: Endpoints,
    pub(crate) stream_config: StreamConfig,
    /// Separate client for event streams: no total timeout, only connect.
    #[cfg(feature = "native")]
    pub(crate) stream_http: reqwest::Client,
}

impl CryptoTraderClient {
    pub fn builder() -> CryptoTraderClientBuilder {
        CryptoTraderClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn bank(&self) -> Bank<'_> {
        Bank { client: self }
    }

    pub fn exchange(&self) -> Exchange<'_> {
        Exchange { client: self }
    }

    // ── Configuration ────────────────────────────────────────────────────

    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn stream_config(&self) -> &StreamConfig {
        &self.stream_config
    }

    /// Absolute URL for an endpoint path.
    pub fn url(&self, path: &str) -> String {
        join_url(self.http.base_url(), path)
    }

    /// Create (but do not connect) an SSE client for `channel`.
    #[cfg(feature = "native")]
    pub fn sse(&self, channel: &crate::stream::Channel) -> crate::stream::native::SseClient {
        let mut config = self.stream_config.clone();
        if !channel.has_steady_traffic() {
            config.idle_timeout_ms = 0;
        }
        crate::stream::native::SseClient::new(
            self.stream_http.clone(),
            self.url(&channel.path(&self.endpoints)),
            config,
        )
    }

    /// Open a push subscription for `channel`.
    #[cfg(feature = "native")]
    pub async fn subscribe(
        &self,
        channel: &crate::stream::Channel,
    ) -> Result<crate::stream::Subscription, SdkError> {
        let mut client = self.sse(channel);
        client.connect().await?;
        tracing::debug!(
            "Subscribed to {} feed at {}",
            channel.kind().as_str(),
            client.url()
        );
        Ok(crate::stream::Subscription::Sse(client))
    }
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct CryptoTraderClientBuilder {
    base_url: String,
    endpoints: Endpoints,
    stream_config: StreamConfig,
    retry_config: RetryConfig,
    request_timeout: Duration,
}

impl Default for CryptoTraderClientBuilder {
    fn default() -> Self {
        Self {
            base_url: crate::network::DEFAULT_API_URL.to_string(),
            endpoints: Endpoints::default(),
            stream_config: StreamConfig::default(),
            retry_config: RetryConfig::idempotent(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl CryptoTraderClientBuilder {
    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn stream_config(mut self, config: StreamConfig) -> Self {
        self.stream_config = config;
        self
    }

    /// Retry behaviour for idempotent requests. POSTs are never retried.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<CryptoTraderClient, SdkError> {
        if self.base_url.trim().is_empty() {
            return Err(SdkError::Validation("base_url must not be empty".into()));
        }

        let http = GameHttp::new(&self.base_url, self.request_timeout, self.retry_config)?;

        #[cfg(feature = "native")]
        let stream_http = reqwest::Client::builder()
            .connect_timeout(Duration::from_millis(self.stream_config.connect_timeout_ms))
            .build()
            .map_err(|e| crate::error::HttpError::Build(e.to_string()))?;

        Ok(CryptoTraderClient {
            http,
            endpoints: self.endpoints,
            stream_config: self.stream_config,
            #[cfg(feature = "native")]
            stream_http,
        })
    }
}
