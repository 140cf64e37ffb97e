//! Bank sub-client: account opening and balance queries.

use crate::client::CryptoTraderClient;
use crate::domain::account::wire::{BankAccount, OpenAccountRequest, OpenAccountResponse};
use crate::error::SdkError;
use crate::http::RetryPolicy;
use crate::shared::AccountNo;

pub struct Bank<'a> {
    pub(crate) client: &'a CryptoTraderClient,
}

impl<'a> Bank<'a> {
    /// Open a fresh bank account for `name`.
    ///
    /// Never retried: a retry after a lost response would open a second account.
    pub async fn open(&self, name: &str) -> Result<OpenAccountResponse, SdkError> {
        let url = self.client.url(&self.client.endpoints.open_account);
        let body = OpenAccountRequest {
            name: name.to_string(),
        };
        Ok(self
            .client
            .http
            .post(&url, &body, RetryPolicy::None)
            .await?)
    }

    /// Fetch the current balance of an account.
    pub async fn balance(
        &self,
        account_no: &AccountNo,
        name: &str,
    ) -> Result<BankAccount, SdkError> {
        let url = self
            .client
            .url(&self.client.endpoints.balance_path(account_no, name));
        Ok(self
            .client
            .http
            .get(&url, RetryPolicy::Idempotent)
            .await?)
    }
}
