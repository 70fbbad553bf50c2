//! Account inventory API client.
//!
//! Two operations: list the accounts that still need cookies, and upload a
//! normalized cookie set for one account (replace semantics). Failures carry
//! the HTTP status, plus the response body for uploads. No retries at this
//! layer; failures propagate to the caller.

use reqwest::Client;
use serde::Deserialize;

use crate::cookies::CookiePayload;
use crate::error::SyncError;

/// One CapCut account from the inventory API.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub password: String,
}

/// Client for the account inventory API.
pub struct AccountClient {
    client: Client,
    base_url: String,
}

impl AccountClient {
    /// Create a client against the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SyncError> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the accounts that have no valid cookie set. May be empty.
    pub async fn fetch_accounts_needing_cookies(&self) -> Result<Vec<Account>, SyncError> {
        let url = format!("{}/api/capcut-accounts/without-cookie", self.base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Fetch { status });
        }

        Ok(response.json().await?)
    }

    /// Replace the stored cookie set for one account.
    pub async fn upload_cookies(
        &self,
        account_id: i64,
        payload: &CookiePayload,
    ) -> Result<serde_json::Value, SyncError> {
        let url = format!("{}/api/capcut-accounts/{account_id}/cookie", self.base_url);
        let response = self.client.put(&url).json(payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Upload {
                status,
                body: body.chars().take(500).collect(),
            });
        }

        Ok(response.json().await?)
    }
}
