//! # Constants
//!
//! Shared constants used throughout the provider.
//!
//! These values represent reasonable defaults and can be overridden via
//! provider configuration or environment variables where applicable.

/// Default base URL of the imgix management API
pub const DEFAULT_API_ENDPOINT: &str = "https://api.imgix.com/api/v1";

/// JSON:API media type used for both `Content-Type` and `Accept`
pub const JSONAPI_MEDIA_TYPE: &str = "application/vnd.api+json";

/// JSON:API resource type of an imgix source
pub const RESOURCE_TYPE_SOURCE: &str = "sources";

/// Stand-in for an S3 secret key that exists remotely but is never echoed back
pub const SECRET_KEY_PLACEHOLDER: &str = "IMGIX_HIDES_KEYS";

/// Default spacing between two outbound requests (milliseconds)
pub const DEFAULT_RATE_LIMIT_INTERVAL_MS: u64 = 2000;

/// Default timeout for a single HTTP round-trip (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Environment variable holding the API token
pub const ENV_TOKEN: &str = "IMGIXYZ_TOKEN";

/// Environment variable toggling upsert-by-name on create
pub const ENV_UPSERT_BY_NAME: &str = "IMGIXYZ_UPSERT_BY_NAME";

/// Environment variable overriding the API endpoint (mock servers, staging)
pub const ENV_ENDPOINT: &str = "IMGIXYZ_ENDPOINT";

/// Environment variable overriding the rate-limit interval
pub const ENV_RATE_LIMIT_INTERVAL_MS: &str = "IMGIXYZ_RATE_LIMIT_INTERVAL_MS";

/// Environment variable overriding the request timeout
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "IMGIXYZ_REQUEST_TIMEOUT_SECS";
