//! Native SSE client: `reqwest` streaming body on a `tokio` task.
//!
//! Full implementation with:
//! - Background tokio task for connection management
//! - Idle timeout as the health check (keep-alive comments count as traffic)
//! - Exponential backoff reconnection with jitter, honouring `retry:` hints
//! - Idempotent resubscription: same URL, `Last-Event-ID` replayed
//! - HTTP 204 treated as "stop, do not reconnect"
//! - Stream-based event delivery to consumer

use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::Stream;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::StreamError;
use crate::http::retry::{exponential_delay, with_jitter};
use crate::stream::sse::SseDecoder;
use crate::stream::{ReadyState, StreamConfig, StreamEvent};

/// Idle timeout used when the check is disabled.
const NO_IDLE_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 3600);

// ─── Commands from public API to background task ─────────────────────────────

enum Command {
    Reconnect,
    Disconnect,
}

// ─── Disconnect reasons for reconnection decision ────────────────────────────

enum DisconnectReason {
    UserRequested,
    Restart,
    IdleTimeout,
    Ended,
    Error(String),
}

// ─── Background task state ───────────────────────────────────────────────────

struct TaskState {
    url: String,
    config: StreamConfig,
    http: reqwest::Client,
    event_tx: mpsc::Sender<StreamEvent>,
    cmd_rx: mpsc::Receiver<Command>,
    last_event_id: Option<String>,
    retry_hint_ms: Option<u64>,
    reconnect_attempts: u32,
    ready_state: Arc<AtomicU8>,
}

impl TaskState {
    /// Deliver an event; `false` once nobody is listening.
    async fn emit(&self, event: StreamEvent) -> bool {
        self.event_tx.send(event).await.is_ok()
    }

    fn should_reconnect(&self) -> bool {
        self.config.reconnect && self.reconnect_attempts < self.config.max_reconnect_attempts
    }

    fn set_ready(&self, state: ReadyState) {
        self.ready_state.store(state as u8, Ordering::SeqCst);
    }

    /// Carry the resume point and reconnect hint over to the next connection.
    ///
    /// A connection that sends no `retry:` keeps the hint of an earlier one.
    fn note_progress(&mut self, decoder: &SseDecoder) {
        self.last_event_id = decoder.last_event_id().map(str::to_string);
        if let Some(ms) = decoder.retry_ms() {
            self.retry_hint_ms = Some(ms);
        }
    }
}

// ─── Public SseClient ────────────────────────────────────────────────────────

/// One supervised SSE subscription.
///
/// Uses a background tokio task for connection management.
/// The public API communicates with it via mpsc channels. The task owns the
/// only event sender, so the event stream ends when the task does.
pub struct SseClient {
    url: String,
    config: StreamConfig,
    http: reqwest::Client,
    cmd_tx: Option<mpsc::Sender<Command>>,
    event_rx: tokio::sync::Mutex<mpsc::Receiver<StreamEvent>>,
    task_handle: Option<JoinHandle<()>>,
    ready_state: Arc<AtomicU8>,
}

impl SseClient {
    /// Create a new client for `url`. Does not connect yet.
    ///
    /// `http` must not carry a total request timeout: the response body of
    /// an event stream never ends on its own.
    pub fn new(http: reqwest::Client, url: impl Into<String>, config: StreamConfig) -> Self {
        let (_, event_rx) = mpsc::channel(1);
        Self {
            url: url.into(),
            config,
            http,
            cmd_tx: None,
            event_rx: tokio::sync::Mutex::new(event_rx),
            task_handle: None,
            ready_state: Arc::new(AtomicU8::new(ReadyState::Closed as u8)),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Start the background task.
    ///
    /// Returns immediately; `StreamEvent::Connected` follows once the server
    /// accepted the subscription.
    pub async fn connect(&mut self) -> Result<(), StreamError> {
        if self.cmd_tx.is_some() {
            return Ok(());
        }

        let (cmd_tx, cmd_rx) = mpsc::channel(8);
        let (event_tx, event_rx) = mpsc::channel(256);
        self.cmd_tx = Some(cmd_tx);
        *self.event_rx.get_mut() = event_rx;
        self.ready_state
            .store(ReadyState::Connecting as u8, Ordering::SeqCst);

        let state = TaskState {
            url: self.url.clone(),
            config: self.config.clone(),
            http: self.http.clone(),
            event_tx,
            cmd_rx,
            last_event_id: None,
            retry_hint_ms: None,
            reconnect_attempts: 0,
            ready_state: Arc::clone(&self.ready_state),
        };

        self.task_handle = Some(tokio::spawn(run_task(state)));
        Ok(())
    }

    /// Stop the background task and wait (bounded) for it to finish.
    pub async fn disconnect(&mut self) -> Result<(), StreamError> {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(Command::Disconnect).await;
        }

        if let Some(mut handle) = self.task_handle.take() {
            if tokio::time::timeout(Duration::from_secs(5), &mut handle)
                .await
                .is_err()
            {
                tracing::warn!("SSE task for {} did not stop in time, aborting", self.url);
                handle.abort();
            }
        }

        self.ready_state
            .store(ReadyState::Closed as u8, Ordering::SeqCst);
        Ok(())
    }

    /// Drop the current connection and connect again right away.
    pub fn restart_connection(&self) -> Result<(), StreamError> {
        match &self.cmd_tx {
            Some(tx) => tx.try_send(Command::Reconnect).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    StreamError::ConnectionFailed("Command channel full".into())
                }
                mpsc::error::TrySendError::Closed(_) => StreamError::NotConnected,
            }),
            None => Err(StreamError::NotConnected),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.ready_state() == ReadyState::Open
    }

    pub fn ready_state(&self) -> ReadyState {
        ReadyState::from(self.ready_state.load(Ordering::SeqCst))
    }

    /// Wait for the next event.
    ///
    /// `None` before `connect()` and once the background task has stopped:
    /// after a disconnect, a 204 from the server, or exhausted reconnects.
    pub async fn next_event(&self) -> Option<StreamEvent> {
        self.event_rx.lock().await.recv().await
    }

    /// Stream of events from this subscription.
    ///
    /// The returned stream borrows `self`, so it must be dropped
    /// before calling `disconnect()`.
    pub fn events(&self) -> Pin<Box<dyn Stream<Item = StreamEvent> + Send + '_>> {
        Box::pin(async_stream::stream! {
            while let Some(event) = self.next_event().await {
                yield event;
            }
        })
    }
}

impl Drop for SseClient {
    fn drop(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

async fn run_task(mut state: TaskState) {
    loop {
        // ── 1. Attempt connection ────────────────────────────────────────
        state.set_ready(ReadyState::Connecting);
        let attempt = attempt_connect(
            &state.http,
            &state.url,
            state.last_event_id.as_deref(),
            Duration::from_millis(state.config.connect_timeout_ms),
        );

        let response = tokio::select! {
            result = attempt => result,
            cmd = state.cmd_rx.recv() => match cmd {
                Some(Command::Reconnect) => {
                    state.reconnect_attempts = 0;
                    continue;
                }
                Some(Command::Disconnect) | None => break,
            },
        };

        let response = match response {
            Ok(resp) => resp,
            Err(StreamError::UnexpectedStatus { status: 204, .. }) => {
                tracing::info!("Server closed {} with 204, not reconnecting", state.url);
                state
                    .emit(StreamEvent::Stopped {
                        reason: "Server requested stop (204)".into(),
                    })
                    .await;
                break;
            }
            Err(e) => {
                tracing::error!("SSE connection to {} failed: {}", state.url, e);
                if !state
                    .emit(StreamEvent::Error(format!("Connection failed: {}", e)))
                    .await
                {
                    break;
                }
                if state.should_reconnect() {
                    if backoff_sleep(&mut state).await {
                        continue;
                    }
                    break;
                }
                state.emit(StreamEvent::MaxReconnectReached).await;
                break;
            }
        };

        // ── 2. Connected ─────────────────────────────────────────────────
        state.reconnect_attempts = 0;
        state.set_ready(ReadyState::Open);
        tracing::info!("SSE connected to {}", state.url);
        if !state.emit(StreamEvent::Connected).await {
            break;
        }

        // ── 3. Read until the connection breaks ──────────────────────────
        let reason = run_connected(&mut state, response).await;

        // ── 4. Post-disconnect decision ──────────────────────────────────
        state.set_ready(ReadyState::Closed);

        let reason = match reason {
            DisconnectReason::UserRequested => break,
            DisconnectReason::Restart => {
                tracing::info!("Manual reconnection requested for {}", state.url);
                state.reconnect_attempts = 0;
                continue;
            }
            DisconnectReason::IdleTimeout => format!(
                "No traffic within {}ms",
                state.config.idle_timeout_ms
            ),
            DisconnectReason::Ended => "Stream ended".to_string(),
            DisconnectReason::Error(e) => e,
        };

        tracing::warn!("SSE stream {} disconnected: {}", state.url, reason);
        if !state.emit(StreamEvent::Disconnected { reason }).await {
            break;
        }

        if state.should_reconnect() {
            state.set_ready(ReadyState::Connecting);
            if backoff_sleep(&mut state).await {
                continue;
            }
        } else {
            state.emit(StreamEvent::MaxReconnectReached).await;
        }
        break;
    }

    state.set_ready(ReadyState::Closed);
}

/// Reads the body until the connection breaks.
async fn run_connected(state: &mut TaskState, response: reqwest::Response) -> DisconnectReason {
    let idle = match state.config.idle_timeout_ms {
        0 => NO_IDLE_TIMEOUT,
        ms => Duration::from_millis(ms),
    };
    let mut decoder = SseDecoder::resuming(state.last_event_id.clone());
    let mut body = response.bytes_stream();

    loop {
        tokio::select! {
            // ── a) Incoming bytes ────────────────────────────────────────
            chunk = tokio::time::timeout(idle, body.next()) => {
                match chunk {
                    Err(_) => return DisconnectReason::IdleTimeout,
                    Ok(Some(Ok(bytes))) => {
                        for frame in decoder.push(&bytes) {
                            if !state.emit(StreamEvent::Message(frame)).await {
                                return DisconnectReason::UserRequested;
                            }
                        }
                        state.note_progress(&decoder);
                    }
                    Ok(Some(Err(e))) => return DisconnectReason::Error(e.to_string()),
                    Ok(None) => return DisconnectReason::Ended,
                }
            }

            // ── b) Command from public API ───────────────────────────────
            cmd = state.cmd_rx.recv() => {
                match cmd {
                    Some(Command::Reconnect) => return DisconnectReason::Restart,
                    // None: the SseClient was dropped
                    Some(Command::Disconnect) | None => return DisconnectReason::UserRequested,
                }
            }
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Open the event stream, bounded by `connect_timeout`.
async fn attempt_connect(
    http: &reqwest::Client,
    url: &str,
    last_event_id: Option<&str>,
    connect_timeout: Duration,
) -> Result<reqwest::Response, StreamError> {
    let mut req = http
        .get(url)
        .header(ACCEPT, "text/event-stream")
        .header(CACHE_CONTROL, "no-cache");
    if let Some(id) = last_event_id {
        req = req.header("Last-Event-ID", id);
    }

    let resp = tokio::time::timeout(connect_timeout, req.send())
        .await
        .map_err(|_| StreamError::ConnectionFailed("Connection timeout".into()))?
        .map_err(|e| StreamError::ConnectionFailed(e.to_string()))?;

    let status = resp.status().as_u16();
    if status == 204 || !resp.status().is_success() {
        return Err(StreamError::UnexpectedStatus {
            status,
            url: url.to_string(),
        });
    }

    let is_event_stream = resp
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("text/event-stream"))
        .unwrap_or(false);
    if !is_event_stream {
        tracing::warn!("{} did not answer with text/event-stream", url);
    }

    Ok(resp)
}

/// Delay before reconnect attempt `attempt` (1-based).
fn reconnect_delay(config: &StreamConfig, retry_hint_ms: Option<u64>, attempt: u32) -> Duration {
    let base = retry_hint_ms.unwrap_or(config.base_reconnect_delay_ms as u64);
    let capped = exponential_delay(
        Duration::from_millis(base),
        2.0,
        attempt.saturating_sub(1),
        Duration::from_millis(config.max_reconnect_delay_ms as u64),
    );
    with_jitter(capped, 0.1)
}

// ─── Reconnection backoff ────────────────────────────────────────────────────

/// Sleep before the next attempt. `false` if a disconnect arrived meanwhile.
async fn backoff_sleep(state: &mut TaskState) -> bool {
    state.reconnect_attempts += 1;
    let delay = reconnect_delay(&state.config, state.retry_hint_ms, state.reconnect_attempts);

    tracing::info!(
        "Reconnect attempt {}/{} to {} in {}ms",
        state.reconnect_attempts,
        state.config.max_reconnect_attempts,
        state.url,
        delay.as_millis()
    );

    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        cmd = state.cmd_rx.recv() => match cmd {
            Some(Command::Reconnect) => {
                state.reconnect_attempts = 0;
                true
            }
            Some(Command::Disconnect) | None => false,
        },
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
