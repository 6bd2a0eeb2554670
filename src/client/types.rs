//! # Source Types
//!
//! Wire representation of an imgix source and its deployment.
//!
//! Every deployment attribute is omitted from outgoing documents when it holds
//! its zero value, so the same structs serve full creates and partial updates.
//! Incoming `null`s are read as zero values.
//!
//! API Reference: <https://docs.imgix.com/apis/management/sources>

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// An imgix source as known by the API
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Source {
    /// Server-assigned identifier, empty before the first create
    pub id: String,
    pub name: String,
    /// Unset means "leave as is" in outgoing documents
    pub enabled: Option<bool>,
    pub deployment: Deployment,
    /// Computed by the server
    pub deployment_status: String,
    /// Computed by the server
    pub secure_url_token: String,
    /// Computed by the server, unix timestamp
    pub date_deployed: i64,
}

impl Source {
    /// A document that only flips `enabled`
    #[must_use]
    pub fn enabled_only(id: impl Into<String>, enabled: bool) -> Self {
        Self {
            id: id.into(),
            enabled: Some(enabled),
            ..Default::default()
        }
    }
}

/// How a source fetches origin images
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_false")]
    pub allows_upload: bool,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub annotation: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub cache_ttl_behavior: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero")]
    pub cache_ttl_error: i64,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_zero")]
    pub cache_ttl_value: i64,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_false")]
    pub crossdomain_xml_enabled: bool,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub custom_domains: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Map::is_empty")]
    pub default_params: Map<String, Value>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub image_error: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_false")]
    pub image_error_append_qs: bool,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub image_missing: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_false")]
    pub image_missing_append_qs: bool,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub imgix_subdomains: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_false")]
    pub secure_url_enabled: bool,
    /// Origin kind, e.g. `s3`, `gcs`, `webfolder`
    #[serde(
        rename = "type",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub deployment_type: String,

    // AWS S3 specific fields
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub s3_access_key: String,
    /// Write-only: the API never echoes it back
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub s3_secret_key: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub s3_bucket: String,
    /// `None` is "not configured", `Some("")` is an explicit empty prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_prefix: Option<String>,
}

impl Deployment {
    /// True when every attribute holds its zero value
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl std::fmt::Debug for Deployment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secret = if self.s3_secret_key.is_empty() {
            ""
        } else {
            "<redacted>"
        };
        f.debug_struct("Deployment")
            .field("type", &self.deployment_type)
            .field("annotation", &self.annotation)
            .field("imgix_subdomains", &self.imgix_subdomains)
            .field("custom_domains", &self.custom_domains)
            .field("s3_bucket", &self.s3_bucket)
            .field("s3_prefix", &self.s3_prefix)
            .field("s3_access_key", &self.s3_access_key)
            .field("s3_secret_key", &secret)
            .finish_non_exhaustive()
    }
}

#[allow(clippy::trivially_copy_pass_by_ref, reason = "serde skip_serializing_if signature")]
fn is_false(value: &bool) -> bool {
    !*value
}

#[allow(clippy::trivially_copy_pass_by_ref, reason = "serde skip_serializing_if signature")]
fn is_zero(value: &i64) -> bool {
    *value == 0
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
