//! Error taxonomy for the cookie refresh pipeline.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The account list endpoint was unreachable or returned non-2xx.
    #[error("failed to fetch accounts: {status}")]
    Fetch { status: StatusCode },

    /// The cookie upload endpoint returned non-2xx.
    #[error("failed to upload cookies: {status} - {body}")]
    Upload { status: StatusCode, body: String },

    /// A page navigation did not settle within its timeout.
    #[error("navigation to {url} timed out after {timeout_secs}s")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    /// An element never appeared within its wait timeout.
    #[error("element not found: {selector} (waited {timeout_secs}s)")]
    ElementNotFound { selector: String, timeout_secs: u64 },

    /// Login finished but produced no cookies; treated as a failed login.
    #[error("no cookies captured after login")]
    EmptyCookieSet,

    /// Any failure while logging in as a specific account.
    #[error("login failed for {email}: {source}")]
    Login {
        email: String,
        #[source]
        source: Box<SyncError>,
    },

    #[error("Chrome/Chromium not found. Install Chrome or Chromium to run logins")]
    ChromeNotFound,

    #[error("failed to configure browser: {0}")]
    BrowserConfig(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("browser error: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),
}
