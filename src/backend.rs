//! The seam between the session controller and the game server.
//!
//! [`CryptoTraderClient`] is the real implementation. Tests and embedding
//! apps can provide their own, e.g. with channel-backed subscriptions.

use std::future::Future;

use rust_decimal::Decimal;

use crate::client::CryptoTraderClient;
use crate::domain::account::wire::OpenAccountResponse;
use crate::domain::trade::wire::{TradeReply, TradeRequest};
use crate::error::SdkError;
use crate::shared::AccountNo;
use crate::stream::{Channel, Subscription};

/// Everything a [`GameSession`](crate::session::GameSession) needs from the server.
pub trait GameBackend: Send + Sync + 'static {
    /// Open a fresh bank account.
    fn open_account(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<OpenAccountResponse, SdkError>> + Send;

    /// Send a trade. Any HTTP status is a reply; only transport failures are errors.
    fn trade(
        &self,
        request: &TradeRequest,
    ) -> impl Future<Output = Result<TradeReply, SdkError>> + Send;

    /// Current balance of an account.
    fn fetch_balance(
        &self,
        account_no: &AccountNo,
        name: &str,
    ) -> impl Future<Output = Result<Decimal, SdkError>> + Send;

    /// Open a push subscription.
    fn subscribe(
        &self,
        channel: &Channel,
    ) -> impl Future<Output = Result<Subscription, SdkError>> + Send;
}

impl GameBackend for CryptoTraderClient {
    async fn open_account(&self, name: &str) -> Result<OpenAccountResponse, SdkError> {
        self.bank().open(name).await
    }

    async fn trade(&self, request: &TradeRequest) -> Result<TradeReply, SdkError> {
        self.exchange().send(request).await
    }

    async fn fetch_balance(&self, account_no: &AccountNo, name: &str) -> Result<Decimal, SdkError> {
        Ok(self.bank().balance(account_no, name).await?.balance)
    }

    async fn subscribe(&self, channel: &Channel) -> Result<Subscription, SdkError> {
        CryptoTraderClient::subscribe(self, channel).await
    }
}
