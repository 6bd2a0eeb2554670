//! # imgix Management API Client
//!
//! Native REST client for the imgix source endpoints of the management API.
//! Uses reqwest for HTTP and speaks the JSON:API resource-document protocol.
//!
//! All requests of a process share one [`RateLimiter`], injected at
//! construction, so concurrent resource operations never exceed the
//! API's throttle.
//!
//! References:
//! - [imgix Management API](https://docs.imgix.com/apis/management)

pub mod documents;
pub mod error;
mod operations;
pub mod rate_limit;
pub mod transport;
pub mod types;

pub use error::ApiError;
pub use rate_limit::RateLimiter;
pub use transport::{Cancellation, Transport};
pub use types::{Deployment, Source};

use crate::config::ProviderConfig;
use std::sync::Arc;
use tracing::info;

/// imgix management API client
///
/// Cheap to clone; clones share the transport and therefore the rate limiter
/// and the cancellation signal. Use [`ImgixClient::with_cancellation`] to
/// cancel one operation without affecting the others.
#[derive(Debug, Clone)]
pub struct ImgixClient {
    transport: Arc<Transport>,
}

impl ImgixClient {
    /// Create a client around an existing limiter and cancellation signal
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(
        config: &ProviderConfig,
        limiter: Arc<RateLimiter>,
        cancellation: Cancellation,
    ) -> Result<Self, ApiError> {
        info!(
            "Initializing imgix client for endpoint: {} (1 request every {:?})",
            config.endpoint,
            limiter.interval()
        );
        let transport = Transport::new(config, limiter, cancellation)?;
        Ok(Self {
            transport: Arc::new(transport),
        })
    }

    /// Create a client with its own limiter built from the configured interval
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn from_config(
        config: &ProviderConfig,
        cancellation: Cancellation,
    ) -> Result<Self, ApiError> {
        let limiter = Arc::new(RateLimiter::new(config.rate_limit_interval));
        Self::new(config, limiter, cancellation)
    }

    /// A client that shares this one's limiter but observes `cancellation`
    #[must_use]
    pub fn with_cancellation(&self, cancellation: Cancellation) -> Self {
        Self {
            transport: Arc::new(self.transport.with_cancellation(cancellation)),
        }
    }
}
