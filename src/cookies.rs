//! Cookie normalization into the account inventory wire format.
//!
//! Converts cookies as reported by the browser into the shape the backend
//! stores, and computes the overall expiration of a captured set.

use chrono::{DateTime, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::error::SyncError;

/// URL recorded alongside every uploaded cookie set.
pub const COOKIE_URL: &str = "https://www.capcut.com";

/// A cookie as reported by the browser session.
#[derive(Debug, Clone, Default)]
pub struct RawCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: Option<String>,
    /// Expiration as unix seconds. Absent or `-1` marks a session cookie.
    pub expires: Option<f64>,
    pub http_only: Option<bool>,
    pub secure: Option<bool>,
    /// Browser-reported sameSite value ("Strict", "Lax", "None"), if any.
    pub same_site: Option<String>,
}

/// Cross-site policy values accepted by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameSite {
    NoRestriction,
    Lax,
    Strict,
    Unspecified,
}

impl SameSite {
    /// Total mapping from the browser-reported value, case-insensitive.
    /// Anything unrecognized (including absent) maps to `Unspecified`.
    fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(|s| s.to_ascii_lowercase()).as_deref() {
            Some("none") => SameSite::NoRestriction,
            Some("lax") => SameSite::Lax,
            Some("strict") => SameSite::Strict,
            _ => SameSite::Unspecified,
        }
    }
}

/// A cookie in the shape the backend stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedCookie {
    pub domain: String,
    #[serde(rename = "hostOnly")]
    pub host_only: bool,
    #[serde(rename = "httpOnly")]
    pub http_only: bool,
    pub name: String,
    pub path: String,
    #[serde(rename = "sameSite")]
    pub same_site: SameSite,
    pub secure: bool,
    pub session: bool,
    #[serde(rename = "storeId")]
    pub store_id: String,
    pub value: String,
    /// Present iff `session` is false.
    #[serde(rename = "expirationDate", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<f64>,
}

/// Body of the cookie upload request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookiePayload {
    pub url: String,
    pub cookies: Vec<NormalizedCookie>,
    /// Latest expiration among the captured cookies, ISO-8601, or null when
    /// no cookie has a positive expiration.
    pub expire_date: Option<String>,
}

/// Convert a captured cookie set into the upload payload.
///
/// Fails with [`SyncError::EmptyCookieSet`] when no cookies were captured;
/// an empty set after a login attempt means the login did not actually
/// succeed.
pub fn normalize(raw_cookies: &[RawCookie]) -> Result<CookiePayload, SyncError> {
    if raw_cookies.is_empty() {
        return Err(SyncError::EmptyCookieSet);
    }

    Ok(CookiePayload {
        url: COOKIE_URL.to_string(),
        cookies: raw_cookies.iter().map(normalize_one).collect(),
        expire_date: latest_expiration(raw_cookies),
    })
}

/// Keep only cookies with the given name.
///
/// Used when the run is configured to upload a single cookie (e.g.
/// `sid_guard`); an empty result is reported by [`normalize`] as
/// [`SyncError::EmptyCookieSet`].
pub fn filter_by_name(cookies: &mut Vec<RawCookie>, name: &str) {
    cookies.retain(|cookie| cookie.name == name);
}

fn normalize_one(raw: &RawCookie) -> NormalizedCookie {
    let session = match raw.expires {
        None => true,
        Some(expires) => expires == -1.0,
    };

    NormalizedCookie {
        host_only: !raw.domain.starts_with('.'),
        domain: raw.domain.clone(),
        http_only: raw.http_only.unwrap_or(false),
        name: raw.name.clone(),
        path: raw.path.clone().unwrap_or_else(|| "/".to_string()),
        same_site: SameSite::from_raw(raw.same_site.as_deref()),
        secure: raw.secure.unwrap_or(false),
        session,
        store_id: "0".to_string(),
        value: raw.value.clone(),
        expiration_date: if session { None } else { raw.expires },
    }
}

/// Latest positive expiration across the set, rendered as ISO-8601.
fn latest_expiration(raw_cookies: &[RawCookie]) -> Option<String> {
    let max = raw_cookies
        .iter()
        .filter_map(|cookie| cookie.expires)
        .filter(|expires| *expires > 0.0)
        .fold(None::<f64>, |acc, expires| {
            Some(acc.map_or(expires, |current| current.max(expires)))
        })?;

    DateTime::from_timestamp(max as i64, 0)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}
