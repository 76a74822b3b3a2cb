//! # Funnel Configuration
//!
//! `FunnelConfig` is built once and handed to the engine by value. Nothing in
//! the crate reads configuration from ambient state.

use crate::FunnelError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use url::Url;

// =============================================================================
// DEFAULTS
// =============================================================================

/// Landing page the quiz sends visitors to.
pub const DEFAULT_DESTINATION_URL: &str = "https://browsebitz.com/selecao-de-cartoes/";

/// Dwell time on the loading indicator before navigating.
pub const DEFAULT_PRELOADER_DELAY_MS: u64 = 3000;

/// Time given to CSS transitions before the page is mutated.
pub const DEFAULT_ANIMATION_DELAY_MS: u64 = 300;

/// Delay before the fallback redirect when the preloader stage fails.
pub const DEFAULT_FALLBACK_REDIRECT_DELAY_MS: u64 = 1000;

/// Attribution parameters forwarded to the destination, in forwarding order.
pub const DEFAULT_ALLOWED_PARAMS: [&str; 8] = [
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "gclid",   // Google Ads
    "fbclid",  // Facebook
    "msclkid", // Microsoft Ads
];

// =============================================================================
// CONFIG
// =============================================================================

/// Immutable funnel configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FunnelConfig {
    /// Where the visitor is sent after the quiz.
    pub destination_url: String,
    /// How long the preloader stays up, in milliseconds.
    pub preloader_delay_ms: u64,
    /// How long each exit animation runs, in milliseconds.
    pub animation_delay_ms: u64,
    /// Delay before redirecting when the preloader cannot be shown normally.
    pub fallback_redirect_delay_ms: u64,
    /// Query parameters forwarded to the destination, in this order.
    pub allowed_params: Vec<String>,
}

impl Default for FunnelConfig {
    fn default() -> Self {
        Self {
            destination_url: DEFAULT_DESTINATION_URL.to_string(),
            preloader_delay_ms: DEFAULT_PRELOADER_DELAY_MS,
            animation_delay_ms: DEFAULT_ANIMATION_DELAY_MS,
            fallback_redirect_delay_ms: DEFAULT_FALLBACK_REDIRECT_DELAY_MS,
            allowed_params: DEFAULT_ALLOWED_PARAMS
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
        }
    }
}

impl FunnelConfig {
    /// Default configuration pointing at another destination.
    #[must_use]
    pub fn with_destination(destination_url: impl Into<String>) -> Self {
        Self {
            destination_url: destination_url.into(),
            ..Self::default()
        }
    }

    /// Animation delay as a `Duration`.
    #[must_use]
    pub fn animation_delay(&self) -> Duration {
        Duration::from_millis(self.animation_delay_ms)
    }

    /// Preloader dwell as a `Duration`.
    #[must_use]
    pub fn preloader_delay(&self) -> Duration {
        Duration::from_millis(self.preloader_delay_ms)
    }

    /// Check the configuration before handing it to an engine.
    ///
    /// The destination must be an absolute http(s) URL without a query or
    /// fragment, since the forwarded parameters are appended after `?`.
    /// Parameter names must be non-empty and unique.
    pub fn validate(&self) -> Result<(), FunnelError> {
        let destination = Url::parse(&self.destination_url).map_err(|e| {
            FunnelError::InvalidConfig(format!(
                "destination_url '{}': {}",
                self.destination_url, e
            ))
        })?;

        if !matches!(destination.scheme(), "http" | "https") {
            return Err(FunnelError::InvalidConfig(format!(
                "destination_url must be http or https, got '{}'",
                destination.scheme()
            )));
        }

        if destination.query().is_some() || destination.fragment().is_some() {
            return Err(FunnelError::InvalidConfig(
                "destination_url must not carry a query or fragment".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for param in &self.allowed_params {
            if param.trim().is_empty() {
                return Err(FunnelError::InvalidConfig(
                    "allowed_params contains an empty name".to_string(),
                ));
            }
            if !seen.insert(param.as_str()) {
                return Err(FunnelError::InvalidConfig(format!(
                    "allowed_params lists '{}' twice",
                    param
                )));
            }
        }

        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
