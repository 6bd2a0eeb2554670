//! # Observability
//!
//! - `metrics`: Prometheus metrics for management API calls and rate limiting

pub mod metrics;
