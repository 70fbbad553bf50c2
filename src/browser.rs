//! Scripted CapCut login over the Chrome DevTools Protocol.
//!
//! Drives the two-step login form (email, then password), waits for the
//! authentication round trip to finish, and reads back the session cookies.
//! The browser is torn down on every exit path, including failures.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{Cookie as CdpCookie, CookieSameSite};
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::{Element, Page};
use futures::StreamExt;
use tracing::info;

use crate::config::Config;
use crate::cookies::{self, CookiePayload, RawCookie};
use crate::error::SyncError;
use crate::sync::LoginDriver;

const EMAIL_INPUT: &str = r#"input[name="signUsername"]"#;
const PASSWORD_INPUT: &str = r#"input[type="password"]"#;
const PRIMARY_BUTTON: &str = ".lv_sign_in_panel_wide-primary-button";

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
const ELEMENT_TIMEOUT: Duration = Duration::from_secs(10);
const ELEMENT_POLL: Duration = Duration::from_millis(250);

/// Fallback pause for the email → password form swap. The wait on the
/// password field afterwards is the actual readiness signal.
const FORM_SETTLE: Duration = Duration::from_millis(500);

/// Inter-keystroke delay; fast scripted typing trips anti-automation checks.
const KEYSTROKE_DELAY: Duration = Duration::from_millis(100);

/// Pages may drop or rearrange form elements below this width.
const VIEWPORT_WIDTH: u32 = 1920;
const VIEWPORT_HEIGHT: u32 = 1080;

/// Login driver backed by a real Chrome/Chromium instance.
pub struct ChromeLoginDriver {
    login_url: String,
    headless: bool,
    cookie_filter: Option<String>,
}

impl ChromeLoginDriver {
    pub fn new(config: &Config) -> Self {
        Self {
            login_url: config.login_url.clone(),
            headless: config.headless,
            cookie_filter: config.cookie_filter.clone(),
        }
    }

    async fn launch(&self) -> Result<(Browser, tokio::task::JoinHandle<()>), SyncError> {
        let chrome_path = find_chrome().ok_or(SyncError::ChromeNotFound)?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .viewport(Viewport {
                width: VIEWPORT_WIDTH,
                height: VIEWPORT_HEIGHT,
                ..Default::default()
            })
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");

        if !self.headless {
            builder = builder.with_head();
        }

        let config = builder.build().map_err(SyncError::BrowserConfig)?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handler_task = tokio::spawn(async move { while (handler.next().await).is_some() {} });

        Ok((browser, handler_task))
    }

    /// The login sequence proper. Linear; any failed step aborts.
    async fn drive(
        &self,
        page: &Page,
        email: &str,
        password: &str,
    ) -> Result<CookiePayload, SyncError> {
        info!(url = %self.login_url, "navigating to login page");
        navigate(page, &self.login_url).await?;

        info!("entering email");
        let field = wait_for_element(page, EMAIL_INPUT).await?;
        type_slowly(&field, email).await?;

        info!("clicking continue button");
        wait_for_element(page, PRIMARY_BUTTON).await?.click().await?;

        // The form swaps in place without a navigation.
        tokio::time::sleep(FORM_SETTLE).await;

        info!("entering password");
        let field = wait_for_element(page, PASSWORD_INPUT).await?;
        type_slowly(&field, password).await?;

        info!("clicking login button");
        wait_for_element(page, PRIMARY_BUTTON).await?.click().await?;

        info!("waiting for login to complete");
        await_navigation(page, &self.login_url).await?;

        info!("extracting cookies");
        let mut raw = read_cookies(page).await?;
        if let Some(name) = &self.cookie_filter {
            cookies::filter_by_name(&mut raw, name);
        }

        cookies::normalize(&raw)
    }
}

#[async_trait]
impl LoginDriver for ChromeLoginDriver {
    async fn login(&self, email: &str, password: &str) -> Result<CookiePayload, SyncError> {
        let (browser, handler_task) = self.launch().await?;

        let result = async {
            let page = browser.new_page("about:blank").await?;
            self.drive(&page, email, password).await
        }
        .await;

        drop(browser);
        handler_task.abort();

        result.map_err(|source| SyncError::Login {
            email: email.to_string(),
            source: Box::new(source),
        })
    }
}

/// Navigate and wait for the page to load, bounded by the navigation timeout.
async fn navigate(page: &Page, url: &str) -> Result<(), SyncError> {
    let nav = async {
        page.goto(url).await?;
        page.wait_for_navigation().await?;
        Ok::<_, chromiumoxide::error::CdpError>(())
    };

    tokio::time::timeout(NAVIGATION_TIMEOUT, nav)
        .await
        .map_err(|_| SyncError::NavigationTimeout {
            url: url.to_string(),
            timeout_secs: NAVIGATION_TIMEOUT.as_secs(),
        })??;

    Ok(())
}

/// Wait for an in-flight navigation (e.g. after submitting the login form).
async fn await_navigation(page: &Page, url: &str) -> Result<(), SyncError> {
    tokio::time::timeout(NAVIGATION_TIMEOUT, page.wait_for_navigation())
        .await
        .map_err(|_| SyncError::NavigationTimeout {
            url: url.to_string(),
            timeout_secs: NAVIGATION_TIMEOUT.as_secs(),
        })??;

    Ok(())
}

/// Poll for a selector until it appears or the element timeout elapses.
async fn wait_for_element(page: &Page, selector: &str) -> Result<Element, SyncError> {
    let deadline = Instant::now() + ELEMENT_TIMEOUT;

    loop {
        if let Ok(element) = page.find_element(selector).await {
            return Ok(element);
        }

        if Instant::now() >= deadline {
            return Err(SyncError::ElementNotFound {
                selector: selector.to_string(),
                timeout_secs: ELEMENT_TIMEOUT.as_secs(),
            });
        }

        tokio::time::sleep(ELEMENT_POLL).await;
    }
}

/// Focus an element and type into it character by character.
async fn type_slowly(element: &Element, text: &str) -> Result<(), SyncError> {
    element.click().await?;

    for ch in text.chars() {
        element.type_str(ch.to_string()).await?;
        tokio::time::sleep(KEYSTROKE_DELAY).await;
    }

    Ok(())
}

async fn read_cookies(page: &Page) -> Result<Vec<RawCookie>, SyncError> {
    let cookies = page.get_cookies().await?;
    Ok(cookies.into_iter().map(raw_from_cdp).collect())
}

fn raw_from_cdp(cookie: CdpCookie) -> RawCookie {
    RawCookie {
        name: cookie.name,
        value: cookie.value,
        domain: cookie.domain,
        path: Some(cookie.path),
        // CDP reports -1 for session cookies.
        expires: Some(cookie.expires),
        http_only: Some(cookie.http_only),
        secure: Some(cookie.secure),
        same_site: cookie.same_site.map(|policy| {
            match policy {
                CookieSameSite::Strict => "Strict",
                CookieSameSite::Lax => "Lax",
                CookieSameSite::None => "None",
            }
            .to_string()
        }),
    }
}

/// Find Chrome/Chromium executable.
fn find_chrome() -> Option<String> {
    for binary in ["google-chrome", "chromium"] {
        if let Ok(output) = std::process::Command::new("which").arg(binary).output() {
            if output.status.success() {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path.is_empty() {
                    return Some(path);
                }
            }
        }
    }

    let candidates = [
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // NixOS
        "/run/current-system/sw/bin/google-chrome",
        "/run/current-system/sw/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];

    for candidate in candidates {
        if std::path::Path::new(candidate).exists() {
            return Some(candidate.to_string());
        }
    }

    None
}
