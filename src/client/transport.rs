//! # Rate-Limited Authenticated Transport
//!
//! Every outbound request:
//! 1. waits on the shared [`RateLimiter`] (one permit per interval, burst 1)
//! 2. gets `Authorization: Bearer <token>` and the JSON:API `Accept` header
//! 3. is sent and its body read in full
//!
//! A [`Cancellation`] aborts both the permit wait and the in-flight request.
//! Cancelling before a permit is granted performs no network I/O. The signal
//! belongs to the transport; [`Transport::with_cancellation`] derives a
//! transport for a single operation that keeps the limiter and connection pool.

use super::error::ApiError;
use super::rate_limit::RateLimiter;
use crate::config::ProviderConfig;
use crate::constants::JSONAPI_MEDIA_TYPE;
use crate::observability::metrics;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::debug;

/// Cooperative cancellation signal shared between a caller and its requests
///
/// Clones observe the same signal. Once cancelled it stays cancelled.
#[derive(Debug, Clone)]
pub struct Cancellation {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Cancellation {
    fn default() -> Self {
        Self::new()
    }
}

impl Cancellation {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`Cancellation::cancel`] has been called
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as self, so this only returns once cancelled
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

/// Status and raw body of a completed round-trip
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

pub struct Transport {
    http_client: Client,
    base_url: String,
    token: String,
    limiter: Arc<RateLimiter>,
    cancellation: Cancellation,
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

impl Transport {
    /// Build a transport sharing the given limiter and cancellation signal
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built
    pub fn new(
        config: &ProviderConfig,
        limiter: Arc<RateLimiter>,
        cancellation: Cancellation,
    ) -> Result<Self, ApiError> {
        // Create HTTP client with rustls (already configured in Cargo.toml)
        let http_client = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            http_client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            limiter,
            cancellation,
        })
    }

    /// Same endpoint, credentials and limiter, observing another signal
    #[must_use]
    pub fn with_cancellation(&self, cancellation: Cancellation) -> Self {
        Self {
            http_client: self.http_client.clone(),
            base_url: self.base_url.clone(),
            token: self.token.clone(),
            limiter: Arc::clone(&self.limiter),
            cancellation,
        }
    }

    /// Absolute URL for a path relative to the API root
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.http_client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.http_client.post(self.url(path))
    }

    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.http_client.patch(self.url(path))
    }

    /// Attach a JSON:API body with the matching content type
    ///
    /// # Errors
    /// Returns [`ApiError::Encode`] if the document cannot be serialized
    pub fn with_document<T: Serialize>(
        request: RequestBuilder,
        document: &T,
    ) -> Result<RequestBuilder, ApiError> {
        let body = serde_json::to_vec(document).map_err(ApiError::Encode)?;
        Ok(request.header(CONTENT_TYPE, JSONAPI_MEDIA_TYPE).body(body))
    }

    /// Wait for a permit, authenticate, send and read the full response
    ///
    /// # Errors
    /// [`ApiError::Cancelled`] when the cancellation fires first, otherwise
    /// [`ApiError::Transport`] for any failure of the HTTP stack
    pub async fn round_trip(&self, request: RequestBuilder) -> Result<RawResponse, ApiError> {
        if self.cancellation.is_cancelled() {
            return Err(ApiError::Cancelled);
        }

        let wait_start = Instant::now();
        tokio::select! {
            biased;
            () = self.cancellation.cancelled() => return Err(ApiError::Cancelled),
            () = self.limiter.acquire() => {}
        }
        metrics::observe_rate_limit_wait(wait_start.elapsed().as_secs_f64());

        let request = request
            .bearer_auth(&self.token)
            .header(ACCEPT, JSONAPI_MEDIA_TYPE)
            .build()?;
        debug!(method = %request.method(), url = %request.url(), "sending request");

        let exchange = async {
            let response = self.http_client.execute(request).await?;
            let status = response.status();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>(RawResponse { status, body })
        };

        tokio::select! {
            biased;
            () = self.cancellation.cancelled() => Err(ApiError::Cancelled),
            result = exchange => result.map_err(ApiError::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config() -> ProviderConfig {
        ProviderConfig {
            token: "test-token".to_string(),
            // Nothing listens here, any attempted I/O fails with a transport error
            endpoint: "http://127.0.0.1:9/api/v1/".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_url_joins_paths() {
        let transport = Transport::new(
            &config(),
            Arc::new(RateLimiter::new(Duration::from_millis(1))),
            Cancellation::new(),
        )
        .unwrap();
        assert_eq!(transport.url("sources/42"), "http://127.0.0.1:9/api/v1/sources/42");
        assert_eq!(transport.url("/sources"), "http://127.0.0.1:9/api/v1/sources");
    }

    #[tokio::test]
    async fn test_cancellation_signal() {
        let cancellation = Cancellation::new();
        let observer = cancellation.clone();
        assert!(!observer.is_cancelled());
        cancellation.cancel();
        assert!(observer.is_cancelled());
        // Must resolve immediately once cancelled
        tokio::time::timeout(Duration::from_secs(1), observer.cancelled())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_before_send_fails_fast() {
        let cancellation = Cancellation::new();
        let transport = Transport::new(
            &config(),
            Arc::new(RateLimiter::new(Duration::from_millis(1))),
            cancellation.clone(),
        )
        .unwrap();
        cancellation.cancel();

        let result = transport.round_trip(transport.get("sources/1")).await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
    }

    #[tokio::test]
    async fn test_derived_transport_cancels_independently() {
        let limiter = Arc::new(RateLimiter::new(Duration::from_millis(1)));
        let transport =
            Transport::new(&config(), Arc::clone(&limiter), Cancellation::new()).unwrap();
        let per_call = Cancellation::new();
        let derived = transport.with_cancellation(per_call.clone());
        per_call.cancel();

        let result = derived.round_trip(derived.get("sources/1")).await;
        assert!(matches!(result, Err(ApiError::Cancelled)));
        assert!(Arc::ptr_eq(&derived.limiter, &limiter));

        // The parent still attempts I/O and fails on the closed port instead
        let result = transport.round_trip(transport.get("sources/1")).await;
        assert!(matches!(result, Err(ApiError::Transport(_))));
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_for_permit() {
        let cancellation = Cancellation::new();
        let limiter = Arc::new(RateLimiter::new(Duration::from_secs(3600)));
        // Consume the only permit so the next request has to wait an hour
        limiter.acquire().await;

        let transport = Transport::new(&config(), limiter, cancellation.clone()).unwrap();
        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            cancellation.cancel();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            transport.round_trip(transport.get("sources/1")),
        )
        .await
        .expect("cancellation must abort the permit wait promptly");
        assert!(matches!(result, Err(ApiError::Cancelled)));
        canceller.await.unwrap();
    }
}
