//! # Metrics
//!
//! Prometheus metrics for monitoring calls to the imgix management API.
//!
//! ## Metrics Exposed
//!
//! - `imgix_api_requests_total` - Total number of API requests by operation
//! - `imgix_api_request_errors_total` - Total number of failed API requests by operation
//! - `imgix_api_request_duration_seconds` - Duration of API requests by operation
//! - `imgix_rate_limit_wait_seconds` - Time spent waiting for a rate-limit permit

use anyhow::Result;
use prometheus::{Encoder, Histogram, HistogramVec, IntCounterVec, Registry, TextEncoder};
use std::sync::{LazyLock, OnceLock};

// Metrics
pub(crate) static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

static REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();

static API_REQUESTS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "imgix_api_requests_total",
            "Total number of imgix management API requests by operation",
        ),
        &["operation"],
    )
    .expect("Failed to create API_REQUESTS_TOTAL metric - this should never happen")
});

static API_REQUEST_ERRORS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        prometheus::Opts::new(
            "imgix_api_request_errors_total",
            "Total number of failed imgix management API requests by operation",
        ),
        &["operation"],
    )
    .expect("Failed to create API_REQUEST_ERRORS_TOTAL metric - this should never happen")
});

static API_REQUEST_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        prometheus::HistogramOpts::new(
            "imgix_api_request_duration_seconds",
            "Duration of imgix management API requests in seconds by operation",
        )
        .buckets(vec![0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        &["operation"],
    )
    .expect("Failed to create API_REQUEST_DURATION metric - this should never happen")
});

static RATE_LIMIT_WAIT: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        prometheus::HistogramOpts::new(
            "imgix_rate_limit_wait_seconds",
            "Time spent waiting for a rate-limit permit in seconds",
        )
        .buckets(vec![0.0, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
    )
    .expect("Failed to create RATE_LIMIT_WAIT metric - this should never happen")
});

/// Register all metrics with the shared registry
///
/// Safe to call more than once, only the first call registers.
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn register_metrics() -> Result<()> {
    // Concurrent callers block until the first registration has finished
    REGISTERED
        .get_or_init(|| register_all().map_err(|e| e.to_string()))
        .clone()
        .map_err(anyhow::Error::msg)
}

fn register_all() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(API_REQUESTS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(API_REQUEST_ERRORS_TOTAL.clone()))?;
    REGISTRY.register(Box::new(API_REQUEST_DURATION.clone()))?;
    REGISTRY.register(Box::new(RATE_LIMIT_WAIT.clone()))?;
    Ok(())
}

/// Record a completed API request and its duration
pub fn record_api_request(operation: &str, duration_secs: f64) {
    API_REQUESTS_TOTAL.with_label_values(&[operation]).inc();
    API_REQUEST_DURATION
        .with_label_values(&[operation])
        .observe(duration_secs);
}

pub fn increment_api_request_errors(operation: &str) {
    API_REQUEST_ERRORS_TOTAL.with_label_values(&[operation]).inc();
}

pub fn observe_rate_limit_wait(duration_secs: f64) {
    RATE_LIMIT_WAIT.observe(duration_secs);
}

/// Render every registered metric in the Prometheus text exposition format
#[allow(
    clippy::missing_errors_doc,
    reason = "Error documentation is provided in doc comments"
)]
pub fn gather_text() -> Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics_is_idempotent() {
        assert!(register_metrics().is_ok());
        assert!(register_metrics().is_ok());
    }

    #[test]
    fn test_concurrent_registration_succeeds_everywhere() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(register_metrics))
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
        let text = gather_text().unwrap();
        assert!(text.contains("imgix_rate_limit_wait_seconds"));
    }

    #[test]
    fn test_record_api_request() {
        let before = API_REQUESTS_TOTAL.with_label_values(&["test_get"]).get();
        record_api_request("test_get", 0.25);
        let after = API_REQUESTS_TOTAL.with_label_values(&["test_get"]).get();
        assert_eq!(after, before + 1u64);
    }

    #[test]
    fn test_increment_api_request_errors() {
        let before = API_REQUEST_ERRORS_TOTAL.with_label_values(&["test_err"]).get();
        increment_api_request_errors("test_err");
        let after = API_REQUEST_ERRORS_TOTAL.with_label_values(&["test_err"]).get();
        assert_eq!(after, before + 1u64);
    }

    #[test]
    fn test_gather_text_contains_registered_metrics() {
        register_metrics().unwrap();
        record_api_request("test_gather", 0.1);
        let text = gather_text().unwrap();
        assert!(text.contains("imgix_api_requests_total"));
    }
}
