//! HTTP client layer: `GameHttp` with per-endpoint retry policies.

pub mod client;
pub mod retry;

pub use client::GameHttp;
pub use retry::{RetryConfig, RetryPolicy};
