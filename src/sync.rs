//! Sequential batch processing of accounts that need fresh cookies.
//!
//! One account is fully processed (login + upload, success or failure)
//! before the next begins. Per-account failures are recorded and the batch
//! continues; only a failed account fetch aborts the run.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info};

use crate::api::{Account, AccountClient};
use crate::cookies::CookiePayload;
use crate::error::SyncError;

/// Courtesy pause between accounts, skipped after the last one.
const INTER_ACCOUNT_DELAY: Duration = Duration::from_secs(3);

/// Performs one scripted login and returns the captured cookie payload.
///
/// This is intentionally minimal. The browser-backed implementation lives in
/// [`crate::browser`]; tests substitute scripted drivers.
#[async_trait]
pub trait LoginDriver: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<CookiePayload, SyncError>;
}

/// Outcome of processing one account. Terminal; never mutated.
#[derive(Debug, Clone)]
pub struct AccountResult {
    pub account_id: i64,
    pub success: bool,
    pub error: Option<String>,
}

/// Per-account outcomes for a full run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub results: Vec<AccountResult>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn successful(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &AccountResult> {
        self.results.iter().filter(|r| !r.success)
    }

    /// Render the human-readable summary block.
    pub fn report(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Summary ===\n");
        out.push_str(&format!("Total: {}\n", self.total()));
        out.push_str(&format!("Successful: {}\n", self.successful()));
        out.push_str(&format!("Failed: {}\n", self.failed()));

        if self.failed() > 0 {
            out.push_str("\nFailed accounts:\n");
            for result in self.failures() {
                let error = result.error.as_deref().unwrap_or("unknown error");
                out.push_str(&format!("  - Account {}: {}\n", result.account_id, error));
            }
        }

        out
    }
}

/// Drives the fetch → login → upload pipeline, one account at a time.
pub struct BatchProcessor<D: LoginDriver> {
    client: AccountClient,
    driver: D,
    delay: Duration,
}

impl<D: LoginDriver> BatchProcessor<D> {
    pub fn new(client: AccountClient, driver: D) -> Self {
        Self {
            client,
            driver,
            delay: INTER_ACCOUNT_DELAY,
        }
    }

    /// Override the inter-account delay (tests use zero).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Process every account that needs cookies.
    ///
    /// A failed fetch aborts the run. Per-account failures are recorded in
    /// the summary instead of propagating.
    pub async fn run(&self) -> Result<BatchSummary, SyncError> {
        info!("fetching accounts without cookies");
        let accounts = self.client.fetch_accounts_needing_cookies().await?;
        info!(count = accounts.len(), "accounts to process");

        let mut summary = BatchSummary::default();
        if accounts.is_empty() {
            return Ok(summary);
        }

        let last = accounts.len() - 1;
        for (index, account) in accounts.iter().enumerate() {
            summary.results.push(self.process_account(account).await);

            if index < last {
                info!(delay_secs = self.delay.as_secs(), "waiting before next account");
                tokio::time::sleep(self.delay).await;
            }
        }

        Ok(summary)
    }

    async fn process_account(&self, account: &Account) -> AccountResult {
        info!(account_id = account.id, email = %account.email, "processing account");

        let outcome = async {
            let payload = self.driver.login(&account.email, &account.password).await?;
            info!(
                account_id = account.id,
                cookies = payload.cookies.len(),
                "uploading cookies"
            );
            self.client.upload_cookies(account.id, &payload).await?;
            Ok::<_, SyncError>(())
        }
        .await;

        match outcome {
            Ok(()) => {
                info!(account_id = account.id, "account processed");
                AccountResult {
                    account_id: account.id,
                    success: true,
                    error: None,
                }
            }
            Err(err) => {
                error!(account_id = account.id, error = %err, "failed to process account");
                AccountResult {
                    account_id: account.id,
                    success: false,
                    error: Some(err.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(account_id: i64, error: Option<&str>) -> AccountResult {
        AccountResult {
            account_id,
            success: error.is_none(),
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn test_summary_counts() {
        let summary = BatchSummary {
            results: vec![
                result(1, None),
                result(2, Some("element not found: input")),
                result(3, None),
            ],
        };

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.successful(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.failures().count(), 1);
    }

    #[test]
    fn test_report_lists_failures() {
        let summary = BatchSummary {
            results: vec![result(1, None), result(2, Some("login failed"))],
        };

        let report = summary.report();
        assert!(report.contains("Total: 2"));
        assert!(report.contains("Successful: 1"));
        assert!(report.contains("Failed: 1"));
        assert!(report.contains("Account 2: login failed"));
    }

    #[test]
    fn test_report_omits_failure_listing_when_clean() {
        let summary = BatchSummary {
            results: vec![result(1, None)],
        };

        assert!(!summary.report().contains("Failed accounts"));
    }
}
