//! Session controller: wires the store, a [`GameBackend`] and the push feeds.
//!
//! All state lives in one [`GameStore`] behind an async lock; every mutation
//! goes through [`GameStore::apply`] and republishes the composed
//! [`GameView`] on a `watch` channel. Each push subscription runs in its own
//! pump task that decodes frames and dispatches actions tagged with the
//! generation it was opened under.

use std::sync::{Arc, Weak};
use std::time::Duration;

use async_lock::{Mutex, RwLock};
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use crate::backend::GameBackend;
use crate::domain::trade::wire::TradeRequest;
use crate::domain::trade::{Settlement, TradeOutcome, TradeTicket};
use crate::error::{SdkError, SessionError};
use crate::shared::AccountNo;
use crate::store::{Action, Effect, GameStore, Ignored, LinkState};
use crate::stream::{Channel, FeedKind, PushEvent, StreamEvent, Subscription};
use crate::view::GameView;

/// Which streams carry market and leaderboard data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedMode {
    /// One stream per feed.
    #[default]
    Separate,
    /// The multiplexed broadcast stream carries market and leaderboard.
    Broadcast,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub feed_mode: FeedMode,
    /// Subscribe to (or, in broadcast mode, apply) leaderboard pushes.
    pub leaderboard: bool,
    /// Re-fetch the balance over HTTP after the balance stream reconnects.
    pub resync_balance_on_reconnect: bool,
    /// How long a pump may take to stop before it is aborted.
    pub shutdown_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            feed_mode: FeedMode::Separate,
            leaderboard: true,
            resync_balance_on_reconnect: true,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

struct Pump {
    feed: FeedKind,
    generation: u64,
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

struct Shared<B> {
    backend: B,
    config: SessionConfig,
    store: RwLock<GameStore>,
    view_tx: watch::Sender<GameView>,
    pumps: Mutex<Vec<Pump>>,
}

/// A running game: start, trade, restart, and a live view.
///
/// Cheap to clone; clones drive the same session. Pump tasks are aborted
/// when the last clone is dropped.
pub struct GameSession<B: GameBackend> {
    shared: Arc<Shared<B>>,
}

impl<B: GameBackend> Clone for GameSession<B> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<B: GameBackend> GameSession<B> {
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, SessionConfig::default())
    }

    pub fn with_config(backend: B, config: SessionConfig) -> Self {
        let (view_tx, _) = watch::channel(GameView::default());
        Self {
            shared: Arc::new(Shared {
                backend,
                config,
                store: RwLock::new(GameStore::new()),
                view_tx,
                pumps: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.shared.backend
    }

    // ── Observation ──────────────────────────────────────────────────────

    /// Receiver that sees every recomputed view.
    pub fn watch(&self) -> watch::Receiver<GameView> {
        self.shared.view_tx.subscribe()
    }

    /// The current view.
    pub fn view(&self) -> GameView {
        self.shared.view_tx.borrow().clone()
    }

    /// A copy of the underlying store.
    pub async fn snapshot(&self) -> GameStore {
        self.shared.store.read().await.clone()
    }

    /// Feeds with a live pump task.
    pub async fn active_feeds(&self) -> Vec<FeedKind> {
        self.shared.pumps.lock().await.iter().map(|p| p.feed).collect()
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Open an account for `name` and subscribe to the push feeds.
    ///
    /// On failure the session stays idle and a `StartFailed` alert is raised.
    pub async fn start(&self, name: &str) -> Result<(), SdkError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SdkError::Validation("Player name must not be empty".into()));
        }

        let generation = match self
            .shared
            .dispatch(Action::SessionStart {
                name: name.to_string(),
            })
            .await
        {
            Effect::OpenAccount { generation, .. } => generation,
            Effect::Ignored(Ignored::StartPending) => return Err(SessionError::StartPending.into()),
            Effect::Ignored(Ignored::AlreadyRunning) => {
                return Err(SessionError::AlreadyRunning.into())
            }
            other => return Err(SdkError::Other(format!("Unexpected start effect: {:?}", other))),
        };

        tracing::info!("Opening account for {}", name);
        let response = match self.shared.backend.open_account(name).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Failed to open account for {}: {}", name, e);
                self.shared
                    .dispatch(Action::SessionFailed {
                        generation,
                        reason: e.to_string(),
                    })
                    .await;
                return Err(e);
            }
        };

        match self
            .shared
            .dispatch(Action::SessionOpened {
                generation,
                name: name.to_string(),
                response,
            })
            .await
        {
            Effect::Subscribe {
                generation,
                account_no,
                name,
            } => {
                tracing::info!("Session {} started for {} ({})", generation, name, account_no);
                self.subscribe_all(generation, account_no, name).await;
                Ok(())
            }
            _ => {
                tracing::warn!("Session restarted while opening account for {}", name);
                Err(SessionError::NotRunning.into())
            }
        }
    }

    /// Back to the start screen: clear all session state and stop every feed.
    pub async fn restart(&self) {
        if let Effect::Unsubscribe { generation } =
            self.shared.dispatch(Action::SessionRestart).await
        {
            self.shared.teardown(generation).await;
        }
        tracing::info!("Session restarted");
    }

    // ── Trading ──────────────────────────────────────────────────────────

    /// Buy (`units > 0`) or sell (`units < 0`).
    ///
    /// Returns `Skipped` without sending anything while another trade is in
    /// flight. The request runs on its own task, so dropping this future does
    /// not leave the trade pending.
    pub async fn trade(&self, units: Decimal) -> Result<TradeOutcome, SdkError> {
        let (ticket, request) = match self.shared.dispatch(Action::TradeStart { units }).await {
            Effect::SendTrade { ticket, request } => (ticket, request),
            Effect::Ignored(Ignored::TradeInFlight) => {
                tracing::debug!("Trade of {} skipped: another trade is in flight", units);
                return Ok(TradeOutcome::Skipped);
            }
            Effect::Ignored(Ignored::NotRunning) => return Err(SessionError::NotRunning.into()),
            other => return Err(SdkError::Other(format!("Unexpected trade effect: {:?}", other))),
        };

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move { shared.execute_trade(ticket, request).await })
            .await
            .map_err(|e| SdkError::Other(format!("Trade task failed: {}", e)))?
    }

    /// Clear the inline trade error.
    pub async fn dismiss_error(&self) {
        self.shared.dispatch(Action::DismissError).await;
    }

    pub async fn dismiss_alert(&self) {
        self.shared.dispatch(Action::DismissAlert).await;
    }

    // ── Subscriptions ────────────────────────────────────────────────────

    fn channels(&self, account_no: &AccountNo) -> Vec<Channel> {
        let config = &self.shared.config;
        let mut channels = vec![Channel::Balance(account_no.clone())];
        match config.feed_mode {
            FeedMode::Separate => {
                channels.push(Channel::Market);
                if config.leaderboard {
                    channels.push(Channel::Leaderboard);
                }
            }
            FeedMode::Broadcast => channels.push(Channel::Broadcast),
        }
        channels
    }

    async fn subscribe_all(&self, generation: u64, account_no: AccountNo, name: String) {
        // Held across the whole setup: a concurrent restart waits here and
        // then tears down whatever was started.
        let mut pumps = self.shared.pumps.lock().await;
        if self.shared.store.read().await.generation() != generation {
            tracing::debug!("Generation {} superseded before subscribing", generation);
            return;
        }

        for channel in self.channels(&account_no) {
            let feed = channel.kind();
            let subscription = match self.shared.backend.subscribe(&channel).await {
                Ok(s) => s,
                Err(e) => {
                    tracing::error!("Failed to subscribe to {} feed: {}", feed.as_str(), e);
                    self.shared
                        .dispatch(Action::FeedStatus {
                            generation,
                            feed,
                            state: LinkState::Down,
                        })
                        .await;
                    continue;
                }
            };

            let (stop, stop_rx) = oneshot::channel();
            let handle = tokio::spawn(pump(
                Arc::downgrade(&self.shared),
                generation,
                channel,
                name.clone(),
                subscription,
                stop_rx,
            ));
            tracing::debug!("Started {} pump for generation {}", feed.as_str(), generation);
            pumps.push(Pump {
                feed,
                generation,
                stop,
                handle,
            });
        }
    }
}

impl<B: GameBackend> Shared<B> {
    async fn dispatch(&self, action: Action) -> Effect {
        let mut store = self.store.write().await;
        let effect = store.apply(action);
        if !effect.is_ignored() {
            self.view_tx.send_replace(GameView::compose(&store));
        }
        effect
    }

    async fn execute_trade(
        &self,
        ticket: TradeTicket,
        request: TradeRequest,
    ) -> Result<TradeOutcome, SdkError> {
        tracing::info!(
            "Trade #{}: {} units for {}",
            ticket.seq,
            request.units,
            request.bank_account_no
        );

        let reply = match self.backend.trade(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("Trade #{} failed: {}", ticket.seq, e);
                self.fail_trade(ticket, &e).await;
                return Err(e);
            }
        };
        self.dispatch(Action::TradeResponded { ticket }).await;

        match Settlement::try_from(reply) {
            Ok(settlement) => {
                let effect = self
                    .dispatch(Action::TradeSettled {
                        ticket,
                        settlement: settlement.clone(),
                    })
                    .await;
                if effect.is_ignored() {
                    tracing::warn!("Trade #{} settled after its session ended", ticket.seq);
                }
                Ok(settlement.into())
            }
            Err(e) => {
                tracing::error!("Trade #{} got an unusable reply: {}", ticket.seq, e);
                self.fail_trade(ticket, &e).await;
                Err(e)
            }
        }
    }

    async fn fail_trade(&self, ticket: TradeTicket, error: &SdkError) {
        self.dispatch(Action::TradeFailed {
            ticket,
            reason: error.to_string(),
        })
        .await;
    }

    async fn set_feed(&self, generation: u64, feed: FeedKind, state: LinkState) {
        self.dispatch(Action::FeedStatus {
            generation,
            feed,
            state,
        })
        .await;
    }

    /// Stop every pump opened before `generation` and wait for it, aborting
    /// stragglers.
    async fn teardown(&self, generation: u64) {
        let pumps = take_older(&mut *self.pumps.lock().await, generation);
        for Pump {
            feed, stop, handle, ..
        } in pumps
        {
            let _ = stop.send(());
            let abort = handle.abort_handle();
            if tokio::time::timeout(self.config.shutdown_timeout, handle)
                .await
                .is_err()
            {
                tracing::warn!("{} pump did not stop in time, aborting", feed.as_str());
                abort.abort();
            }
        }
    }
}

/// Remove and return the pumps of generations before `generation`.
fn take_older(pumps: &mut Vec<Pump>, generation: u64) -> Vec<Pump> {
    let (older, current): (Vec<Pump>, Vec<Pump>) = std::mem::take(pumps)
        .into_iter()
        .partition(|p| p.generation < generation);
    *pumps = current;
    older
}

impl<B> Drop for Shared<B> {
    fn drop(&mut self) {
        for pump in self.pumps.get_mut().drain(..) {
            pump.handle.abort();
        }
    }
}

// ─── Pump task ───────────────────────────────────────────────────────────────

async fn pump<B: GameBackend>(
    shared: Weak<Shared<B>>,
    generation: u64,
    channel: Channel,
    name: String,
    mut subscription: Subscription,
    mut stop: oneshot::Receiver<()>,
) {
    let feed = channel.kind();
    let mut connected_before = false;

    loop {
        let event = tokio::select! {
            _ = &mut stop => break,
            event = subscription.next_event() => event,
        };
        let Some(shared) = shared.upgrade() else {
            break;
        };

        match event {
            None => {
                tracing::debug!("{} feed closed", feed.as_str());
                shared.set_feed(generation, feed, LinkState::Down).await;
                break;
            }
            Some(StreamEvent::Connected) => {
                shared.set_feed(generation, feed, LinkState::Live).await;
                if connected_before {
                    if let Channel::Balance(account_no) = &channel {
                        if shared.config.resync_balance_on_reconnect {
                            resync_balance(&shared, generation, account_no, &name).await;
                        }
                    }
                }
                connected_before = true;
            }
            Some(StreamEvent::Message(frame)) => match channel.decode(&frame) {
                Ok(Some(push)) => {
                    let Some(action) = push_action(&shared, generation, push) else {
                        continue;
                    };
                    if shared.dispatch(action).await == Effect::Ignored(Ignored::Stale) {
                        tracing::warn!("Dropped stale {} push", feed.as_str());
                    }
                }
                Ok(None) => {
                    tracing::debug!("Ignoring '{}' event on {} feed", frame.event_name(), feed.as_str());
                }
                Err(e) => tracing::warn!("Bad {} push: {}", feed.as_str(), e),
            },
            Some(StreamEvent::Disconnected { reason }) => {
                tracing::warn!("{} feed disconnected: {}", feed.as_str(), reason);
                shared
                    .set_feed(generation, feed, LinkState::Reconnecting)
                    .await;
            }
            Some(StreamEvent::Error(e)) => {
                tracing::error!("{} feed error: {}", feed.as_str(), e);
                shared
                    .set_feed(generation, feed, LinkState::Reconnecting)
                    .await;
            }
            Some(StreamEvent::MaxReconnectReached) => {
                tracing::error!("{} feed gave up reconnecting", feed.as_str());
                shared.set_feed(generation, feed, LinkState::Down).await;
            }
            Some(StreamEvent::Stopped { reason }) => {
                tracing::info!("{} feed stopped by the server: {}", feed.as_str(), reason);
                shared.set_feed(generation, feed, LinkState::Down).await;
                break;
            }
        }
    }

    subscription.close().await;
    tracing::debug!("{} pump for generation {} stopped", feed.as_str(), generation);
}

fn push_action<B>(shared: &Shared<B>, generation: u64, push: PushEvent) -> Option<Action> {
    let received_at = Utc::now();
    match push {
        PushEvent::Market(update) => Some(Action::PushMarket {
            generation,
            update,
            received_at,
        }),
        PushEvent::Balance(balance) => Some(Action::PushBalance {
            generation,
            balance,
        }),
        PushEvent::Leaderboard(rows) if shared.config.leaderboard => {
            Some(Action::PushLeaderboard {
                generation,
                rows,
                received_at,
            })
        }
        PushEvent::Leaderboard(_) => None,
    }
}

async fn resync_balance<B: GameBackend>(
    shared: &Shared<B>,
    generation: u64,
    account_no: &AccountNo,
    name: &str,
) {
    match shared.backend.fetch_balance(account_no, name).await {
        Ok(balance) => {
            tracing::info!("Balance resynced after reconnect: {}", balance);
            shared
                .dispatch(Action::PushBalance {
                    generation,
                    balance,
                })
                .await;
        }
        Err(e) => tracing::warn!("Balance resync failed: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_pump(feed: FeedKind, generation: u64) -> Pump {
        let (stop, _) = oneshot::channel();
        Pump {
            feed,
            generation,
            stop,
            handle: tokio::spawn(std::future::pending()),
        }
    }

    #[tokio::test]
    async fn test_teardown_keeps_pumps_of_newer_generation() {
        let mut pumps = vec![
            idle_pump(FeedKind::Market, 1),
            idle_pump(FeedKind::Balance, 1),
            idle_pump(FeedKind::Market, 3),
        ];

        let older = take_older(&mut pumps, 2);
        assert_eq!(older.len(), 2);
        assert!(older.iter().all(|p| p.generation == 1));
        assert_eq!(pumps.len(), 1);
        assert_eq!(pumps[0].generation, 3);

        for pump in older.into_iter().chain(pumps) {
            pump.handle.abort();
        }
    }
}
