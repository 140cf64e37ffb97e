//! Low-level HTTP client: `GameHttp`.
//!
//! Generic JSON GET/POST with retry, plus a plain-text POST for the trade
//! endpoint (which answers in text, not JSON). Sub-clients in
//! `domain/<name>/client.rs` build URLs and pick the retry policy.

use crate::error::HttpError;
use crate::http::retry::{RetryConfig, RetryPolicy};

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Low-level HTTP client for the game REST endpoints.
#[derive(Clone)]
pub struct GameHttp {
    base_url: String,
    client: Client,
    idempotent_retry: RetryConfig,
}

impl GameHttp {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        idempotent_retry: RetryConfig,
    ) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            idempotent_retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Request helpers ──────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        self.request_with_retry(reqwest::Method::GET, url, None::<&()>, retry)
            .await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: &str,
        body: &B,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        self.request_with_retry(reqwest::Method::POST, url, Some(body), retry)
            .await
    }

    /// POST a JSON body and hand back `(status, text body)` whatever the status.
    ///
    /// Only transport failures are errors. Never retried.
    pub(crate) async fn post_for_text<B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<(u16, String), HttpError> {
        let resp = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "text/plain")
            .json(body)
            .send()
            .await
            .map_err(map_transport)?;
        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(map_transport)?;
        tracing::debug!(status, url, "Text reply received");
        Ok((status, text))
    }

    async fn request_with_retry<T: DeserializeOwned, B: Serialize>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&B>,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        let config = match &retry {
            RetryPolicy::None => {
                return self.do_request(&method, url, body).await;
            }
            RetryPolicy::Idempotent => self.idempotent_retry.clone(),
            RetryPolicy::Custom(c) => c.clone(),
        };

        let mut last_error = None;

        for attempt in 0..=config.max_retries {
            match self.do_request::<T, B>(&method, url, body).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let should_retry = match &e {
                        HttpError::ServerError { status, .. } => {
                            config.is_retryable_status(*status)
                        }
                        HttpError::RateLimited { retry_after_ms } => {
                            if let Some(ms) = retry_after_ms {
                                futures_timer::Delay::new(Duration::from_millis(*ms)).await;
                            }
                            true
                        }
                        HttpError::Timeout => true,
                        HttpError::Reqwest(re) => re.is_connect() || re.is_request(),
                        _ => false,
                    };

                    if should_retry && attempt < config.max_retries {
                        let delay = config.delay_for_attempt(attempt);
                        tracing::debug!(
                            attempt = attempt + 1,
                            max = config.max_retries,
                            delay_ms = delay.as_millis() as u64,
                            "Retrying request to {}",
                            url
                        );
                        futures_timer::Delay::new(delay).await;
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(HttpError::MaxRetriesExceeded {
            attempts: config.max_retries + 1,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        })
    }

    async fn do_request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: &reqwest::Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, HttpError> {
        let mut req = self
            .client
            .request(method.clone(), url)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(b) = body {
            req = req.json(b);
        }

        let resp = req.send().await.map_err(map_transport)?;
        let status = resp.status();

        if status.is_success() {
            return resp.json::<T>().await.map_err(map_transport);
        }

        let body_text = resp.text().await.unwrap_or_default();
        Err(status_error(status.as_u16(), body_text))
    }
}

fn map_transport(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else {
        HttpError::Reqwest(e)
    }
}

/// Map a non-success status to the error taxonomy.
pub(crate) fn status_error(status: u16, body: String) -> HttpError {
    match status {
        404 => HttpError::NotFound(body),
        429 => HttpError::RateLimited {
            retry_after_ms: None,
        },
        400..=499 => HttpError::BadRequest(body),
        _ => HttpError::ServerError { status, body },
    }
}
