//! # Provider Configuration
//!
//! Provider-level settings: explicit values from the provider configuration
//! block take precedence, environment variables fill the gaps, and built-in
//! defaults cover the rest.
//!
//! Validation never stops at the first problem. Every finding is collected
//! into [`Diagnostics`] so the operator sees all of them in one run.

use crate::constants::{
    DEFAULT_API_ENDPOINT, DEFAULT_RATE_LIMIT_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_SECS,
    ENV_ENDPOINT, ENV_RATE_LIMIT_INTERVAL_MS, ENV_REQUEST_TIMEOUT_SECS, ENV_TOKEN,
    ENV_UPSERT_BY_NAME,
};
use crate::diagnostics::Diagnostics;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw provider configuration block as written by the operator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub upsert_by_name: Option<bool>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub rate_limit_interval_ms: Option<u64>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Resolved provider configuration
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Bearer token for the management API
    pub token: String,
    /// Adopt an existing source with the same name instead of creating a new one
    pub upsert_by_name: bool,
    /// API base URL, without trailing slash
    pub endpoint: String,
    /// Minimum spacing between two outbound requests
    pub rate_limit_interval: Duration,
    /// Timeout for a single HTTP round-trip
    pub request_timeout: Duration,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("token", &"<redacted>")
            .field("upsert_by_name", &self.upsert_by_name)
            .field("endpoint", &self.endpoint)
            .field("rate_limit_interval", &self.rate_limit_interval)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            upsert_by_name: false,
            endpoint: DEFAULT_API_ENDPOINT.to_string(),
            rate_limit_interval: Duration::from_millis(DEFAULT_RATE_LIMIT_INTERVAL_MS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl ProviderConfig {
    /// Resolve settings against the process environment
    #[must_use]
    pub fn resolve(settings: &ProviderSettings) -> (Self, Diagnostics) {
        Self::resolve_with(settings, |key| std::env::var(key).ok())
    }

    /// Resolve settings against an arbitrary variable lookup
    ///
    /// Returns the best-effort configuration together with every problem found.
    /// Callers must check [`Diagnostics::has_error`] before building a client.
    pub fn resolve_with<F>(settings: &ProviderSettings, lookup: F) -> (Self, Diagnostics)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut diags = Diagnostics::new();

        // Explicit configuration wins over the environment, but only when non-empty
        let token = settings
            .token
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| lookup(ENV_TOKEN))
            .unwrap_or_default();
        if token.is_empty() {
            diags.add_error(
                "Missing Token Configuration",
                format!(
                    "While configuring the provider, the token was not found in \
                     the {ENV_TOKEN} environment variable or provider \
                     configuration block token attribute."
                ),
            );
        }

        let upsert_by_name = settings
            .upsert_by_name
            .unwrap_or_else(|| lookup(ENV_UPSERT_BY_NAME).is_some_and(|v| parse_bool(&v)));

        let endpoint = settings
            .endpoint
            .clone()
            .filter(|e| !e.is_empty())
            .or_else(|| lookup(ENV_ENDPOINT))
            .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string());
        let endpoint = endpoint.trim_end_matches('/').to_string();
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            diags.add_error(
                "Invalid Endpoint Configuration",
                format!("The API endpoint must be an http(s) URL, got: {endpoint}"),
            );
        }

        let rate_limit_interval_ms = settings.rate_limit_interval_ms.unwrap_or_else(|| {
            parse_or_default(
                lookup(ENV_RATE_LIMIT_INTERVAL_MS),
                DEFAULT_RATE_LIMIT_INTERVAL_MS,
            )
        });
        if rate_limit_interval_ms == 0 {
            diags.add_error(
                "Invalid Rate Limit Configuration",
                "The rate limit interval must be greater than zero milliseconds.",
            );
        }

        let request_timeout_secs = settings.request_timeout_secs.unwrap_or_else(|| {
            parse_or_default(lookup(ENV_REQUEST_TIMEOUT_SECS), DEFAULT_REQUEST_TIMEOUT_SECS)
        });

        let config = Self {
            token,
            upsert_by_name,
            endpoint,
            rate_limit_interval: Duration::from_millis(rate_limit_interval_ms.max(1)),
            request_timeout: Duration::from_secs(request_timeout_secs.max(1)),
        };
        (config, diags)
    }
}

fn parse_or_default<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

fn parse_bool(value: &str) -> bool {
    let v_lower = value.trim().to_lowercase();
    v_lower == "true" || v_lower == "1" || v_lower == "yes" || v_lower == "on"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_explicit_token_takes_precedence() {
        let settings = ProviderSettings {
            token: Some("explicit".to_string()),
            ..Default::default()
        };
        let (config, diags) =
            ProviderConfig::resolve_with(&settings, env(&[(ENV_TOKEN, "from-env")]));
        assert!(diags.is_empty());
        assert_eq!(config.token, "explicit");
    }

    #[test]
    fn test_empty_explicit_token_falls_back_to_env() {
        let settings = ProviderSettings {
            token: Some(String::new()),
            ..Default::default()
        };
        let (config, diags) =
            ProviderConfig::resolve_with(&settings, env(&[(ENV_TOKEN, "from-env")]));
        assert!(!diags.has_error());
        assert_eq!(config.token, "from-env");
    }

    #[test]
    fn test_missing_token_is_collected_with_other_errors() {
        let settings = ProviderSettings {
            endpoint: Some("ftp://example.com".to_string()),
            rate_limit_interval_ms: Some(0),
            ..Default::default()
        };
        let (_, diags) = ProviderConfig::resolve_with(&settings, env(&[]));
        let summaries: Vec<&str> = diags.errors().map(|d| d.summary.as_str()).collect();
        assert_eq!(
            summaries,
            vec![
                "Missing Token Configuration",
                "Invalid Endpoint Configuration",
                "Invalid Rate Limit Configuration",
            ]
        );
    }

    #[test]
    fn test_defaults() {
        let (config, diags) =
            ProviderConfig::resolve_with(&ProviderSettings::default(), env(&[(ENV_TOKEN, "t")]));
        assert!(diags.is_empty());
        assert!(!config.upsert_by_name);
        assert_eq!(config.endpoint, DEFAULT_API_ENDPOINT);
        assert_eq!(config.rate_limit_interval, Duration::from_secs(2));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_env_overrides() {
        let (config, diags) = ProviderConfig::resolve_with(
            &ProviderSettings::default(),
            env(&[
                (ENV_TOKEN, "t"),
                (ENV_UPSERT_BY_NAME, "Yes"),
                (ENV_ENDPOINT, "http://127.0.0.1:8080/"),
                (ENV_RATE_LIMIT_INTERVAL_MS, "10"),
                (ENV_REQUEST_TIMEOUT_SECS, "5"),
            ]),
        );
        assert!(diags.is_empty());
        assert!(config.upsert_by_name);
        assert_eq!(config.endpoint, "http://127.0.0.1:8080");
        assert_eq!(config.rate_limit_interval, Duration::from_millis(10));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_explicit_upsert_false_beats_env() {
        let settings = ProviderSettings {
            token: Some("t".to_string()),
            upsert_by_name: Some(false),
            ..Default::default()
        };
        let (config, _) =
            ProviderConfig::resolve_with(&settings, env(&[(ENV_UPSERT_BY_NAME, "true")]));
        assert!(!config.upsert_by_name);
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ProviderConfig {
            token: "super-secret".to_string(),
            ..Default::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
