//! # Attribution Parameter Filter
//!
//! Builds the redirect URL from the page URL, forwarding only allow-listed
//! query parameters.
//!
//! - Output order follows the allow-list, not the page URL.
//! - The first occurrence of a key wins; empty values are dropped.
//! - Values are decoded and re-encoded as `application/x-www-form-urlencoded`,
//!   so `a%20b` and `a+b` both forward as `a+b`.
//! - With nothing to forward, the destination is returned untouched (no `?`).
//!
//! Keys outside the allow-list are never forwarded.

use crate::FunnelError;
use url::{Url, form_urlencoded};

/// Pick the allow-listed parameters out of a raw query string.
///
/// A leading `?` is ignored, so both `location.search` and `Url::query`
/// shapes are accepted.
#[must_use]
pub fn filter_params<S: AsRef<str>>(query: &str, allowed: &[S]) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let pairs: Vec<(String, String)> = form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect();

    allowed
        .iter()
        .filter_map(|key| {
            let key = key.as_ref();
            pairs
                .iter()
                .find(|(name, _)| name == key)
                .filter(|(_, value)| !value.is_empty())
                .map(|(name, value)| (name.clone(), value.clone()))
        })
        .collect()
}

/// Serialize filtered pairs as a query string (without the leading `?`).
#[must_use]
pub fn encode_params(params: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params)
        .finish()
}

/// Build the redirect URL from a raw query string. Never fails.
#[must_use]
pub fn redirect_url_from_query<S: AsRef<str>>(
    destination: &str,
    query: &str,
    allowed: &[S],
) -> String {
    let filtered = filter_params(query, allowed);
    if filtered.is_empty() {
        return destination.to_string();
    }
    format!("{}?{}", destination, encode_params(&filtered))
}

/// Build the redirect URL from the full page URL.
///
/// Returns `FunnelError::InvalidUrl` when the page URL cannot be parsed.
pub fn redirect_url<S: AsRef<str>>(
    destination: &str,
    page_url: &str,
    allowed: &[S],
) -> Result<String, FunnelError> {
    let page = Url::parse(page_url)
        .map_err(|e| FunnelError::InvalidUrl(format!("'{}': {}", page_url, e)))?;
    Ok(redirect_url_from_query(
        destination,
        page.query().unwrap_or(""),
        allowed,
    ))
}

/// Like [`redirect_url`], but falls back to the bare destination on error.
///
/// The error, if any, is handed back alongside so the caller can report it.
#[must_use]
pub fn resolve_redirect<S: AsRef<str>>(
    destination: &str,
    page_url: &str,
    allowed: &[S],
) -> (String, Option<FunnelError>) {
    match redirect_url(destination, page_url, allowed) {
        Ok(url) => (url, None),
        Err(e) => (destination.to_string(), Some(e)),
    }
}

// =============================================================================
// TESTS
// =============================================================================
