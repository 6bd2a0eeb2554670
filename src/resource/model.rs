//! # Source Model
//!
//! Typed local state of an `imgixyz_source` resource and its translation to
//! and from the API's [`Source`].
//!
//! ## Secret handling
//!
//! imgix never returns `s3_secret_key` once it is set. When translating a
//! remote source into local state the secret is resolved in this order:
//! 1. the value returned by the server, if any
//! 2. the locally known value (set during this same operation), unless it is
//!    the placeholder
//! 3. [`SECRET_KEY_PLACEHOLDER`]: "a secret exists remotely, value unknown"

use crate::client::{Deployment, Source};
use crate::constants::SECRET_KEY_PLACEHOLDER;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Local record of a source as stored by the host runtime
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceModel {
    /// Unset until the first successful create
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    /// Unset, false or true
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub deployment_status: Option<String>,
    #[serde(default)]
    pub secure_url_token: Option<String>,
    #[serde(default)]
    pub deployment: Option<DeploymentModel>,
}

/// Local record of the deployment block
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentModel {
    #[serde(rename = "type", default)]
    pub deployment_type: String,
    #[serde(default)]
    pub annotation: String,
    #[serde(default)]
    pub s3_bucket: String,
    /// Unset is distinct from an explicit empty prefix
    #[serde(default)]
    pub s3_prefix: Option<String>,
    #[serde(default)]
    pub s3_access_key: String,
    /// Real secret, placeholder, or empty when not configured
    #[serde(default)]
    pub s3_secret_key: String,
    #[serde(default)]
    pub imgix_subdomains: Vec<String>,
}

impl std::fmt::Debug for DeploymentModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let secret = match self.s3_secret_key.as_str() {
            "" => "",
            SECRET_KEY_PLACEHOLDER => SECRET_KEY_PLACEHOLDER,
            _ => "<redacted>",
        };
        f.debug_struct("DeploymentModel")
            .field("type", &self.deployment_type)
            .field("annotation", &self.annotation)
            .field("s3_bucket", &self.s3_bucket)
            .field("s3_prefix", &self.s3_prefix)
            .field("s3_access_key", &self.s3_access_key)
            .field("s3_secret_key", &secret)
            .field("imgix_subdomains", &self.imgix_subdomains)
            .finish()
    }
}

impl SourceModel {
    /// Identifier, empty when the source was never created
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_deref().unwrap_or_default()
    }

    /// Locally known secret key
    #[must_use]
    pub fn secret_key(&self) -> &str {
        self.deployment
            .as_ref()
            .map_or("", |d| d.s3_secret_key.as_str())
    }

    /// Convert into the API representation
    #[must_use]
    pub fn to_source(&self) -> Source {
        let deployment = self
            .deployment
            .as_ref()
            .map(|d| Deployment {
                deployment_type: d.deployment_type.clone(),
                annotation: d.annotation.clone(),
                s3_bucket: d.s3_bucket.clone(),
                s3_prefix: d.s3_prefix.clone(),
                s3_access_key: d.s3_access_key.clone(),
                s3_secret_key: d.s3_secret_key.clone(),
                imgix_subdomains: d.imgix_subdomains.clone(),
                ..Default::default()
            })
            .unwrap_or_default();

        Source {
            id: self.id().to_string(),
            name: self.name.clone(),
            enabled: self.enabled,
            deployment,
            ..Default::default()
        }
    }

    /// Translate a remote source into local state
    ///
    /// `local` is the desired or prior record of the current operation; it is
    /// only consulted for the secret key.
    #[must_use]
    pub fn from_source(source: &Source, local: &SourceModel) -> Self {
        let remote = &source.deployment;

        let deployment = DeploymentModel {
            deployment_type: remote.deployment_type.clone(),
            annotation: remote.annotation.clone(),
            s3_bucket: remote.s3_bucket.clone(),
            // Only keep a prefix the server actually reports
            s3_prefix: remote.s3_prefix.clone().filter(|p| !p.is_empty()),
            s3_access_key: remote.s3_access_key.clone(),
            s3_secret_key: resolve_secret_key(&remote.s3_secret_key, local.secret_key()),
            imgix_subdomains: remote.imgix_subdomains.clone(),
        };

        Self {
            id: Some(source.id.clone()),
            name: source.name.clone(),
            enabled: source.enabled,
            deployment_status: non_empty(&source.deployment_status),
            secure_url_token: non_empty(&source.secure_url_token),
            deployment: Some(deployment),
        }
    }
}

/// Outgoing copy of `source` that never carries the placeholder upstream
#[must_use]
pub fn without_placeholder(mut source: Source) -> Source {
    if source.deployment.s3_secret_key == SECRET_KEY_PLACEHOLDER {
        debug!("dropping s3_secret_key placeholder from outgoing payload");
        source.deployment.s3_secret_key.clear();
    }
    source
}

fn resolve_secret_key(remote: &str, local: &str) -> String {
    if !remote.is_empty() {
        debug!("setting s3_secret_key from remote source");
        remote.to_string()
    } else if !local.is_empty() && local != SECRET_KEY_PLACEHOLDER {
        debug!("s3_secret_key not returned, keeping the locally known value");
        local.to_string()
    } else {
        debug!("s3_secret_key isn't returned, setting value to placeholder");
        SECRET_KEY_PLACEHOLDER.to_string()
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
