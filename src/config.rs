use anyhow::{Context, Result};

/// Runtime configuration for a cookie refresh run.
///
/// Loaded once at process start and passed into each component rather than
/// read ad hoc from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the account inventory API.
    pub api_base_url: String,

    /// URL of the CapCut login page.
    pub login_url: String,

    /// Run the browser without a visible window.
    ///
    /// Selected when `CI=true` or `HEADLESS=true` (unattended environments).
    pub headless: bool,

    /// When set, only cookies with this exact name are uploaded
    /// (e.g. `sid_guard`). Unset uploads every captured cookie.
    pub cookie_filter: Option<String>,
}

impl Config {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self> {
        let api_base_url = std::env::var("API_BASE_URL")
            .context("API_BASE_URL is not set")?
            .trim_end_matches('/')
            .to_string();
        let login_url = std::env::var("LOGIN_URL").context("LOGIN_URL is not set")?;

        Ok(Self {
            api_base_url,
            login_url,
            headless: env_flag("CI") || env_flag("HEADLESS"),
            cookie_filter: std::env::var("COOKIE_FILTER")
                .ok()
                .filter(|name| !name.is_empty()),
        })
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name).map(|value| value == "true").unwrap_or(false)
}
