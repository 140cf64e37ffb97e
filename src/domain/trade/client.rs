//! Exchange sub-client: trade execution.

use crate::client::CryptoTraderClient;
use crate::domain::trade::wire::{TradeReply, TradeRequest};
use crate::domain::trade::Settlement;
use crate::error::SdkError;

pub struct Exchange<'a> {
    pub(crate) client: &'a CryptoTraderClient,
}

impl<'a> Exchange<'a> {
    /// Send a trade and return the raw reply (status + text body).
    ///
    /// Only transport failures are errors here; status interpretation is
    /// left to [`Settlement`]'s `TryFrom<TradeReply>`.
    pub async fn send(&self, request: &TradeRequest) -> Result<TradeReply, SdkError> {
        let url = self.client.url(&self.client.endpoints.trade);
        let (status, body) = self.client.http.post_for_text(&url, request).await?;
        Ok(TradeReply { status, body })
    }

    /// Send a trade and interpret the reply.
    pub async fn trade(&self, request: &TradeRequest) -> Result<Settlement, SdkError> {
        let reply = self.send(request).await?;
        Settlement::try_from(reply)
    }
}
