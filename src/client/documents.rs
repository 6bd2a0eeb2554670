//! # JSON:API Documents
//!
//! Envelopes exchanged with the management API:
//!
//! ```json
//! { "data": { "type": "sources", "id": "…", "attributes": { … } } }
//! { "data": [ { "type": "sources", "id": "…", "attributes": { … } } ] }
//! ```
//!
//! Server-computed attributes are read but never written.

use super::types::{null_as_default, Deployment, Source};
use crate::constants::RESOURCE_TYPE_SOURCE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
struct SourceAttributes {
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enabled: Option<bool>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Deployment::is_empty")]
    deployment: Deployment,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing)]
    deployment_status: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing)]
    secure_url_token: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing)]
    date_deployed: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct SourceObject {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    id: String,
    #[serde(default)]
    attributes: SourceAttributes,
}

impl From<&Source> for SourceObject {
    fn from(source: &Source) -> Self {
        Self {
            kind: RESOURCE_TYPE_SOURCE.to_string(),
            id: source.id.clone(),
            attributes: SourceAttributes {
                name: source.name.clone(),
                enabled: source.enabled,
                deployment: source.deployment.clone(),
                ..Default::default()
            },
        }
    }
}

impl From<SourceObject> for Source {
    fn from(object: SourceObject) -> Self {
        let SourceObject { id, attributes, .. } = object;
        Self {
            id,
            name: attributes.name,
            enabled: attributes.enabled,
            deployment: attributes.deployment,
            deployment_status: attributes.deployment_status,
            secure_url_token: attributes.secure_url_token,
            date_deployed: attributes.date_deployed,
        }
    }
}

/// Document carrying exactly one source
#[derive(Debug, Serialize, Deserialize)]
pub struct SourceDocument {
    data: SourceObject,
}

impl SourceDocument {
    #[must_use]
    pub fn from_source(source: &Source) -> Self {
        Self {
            data: SourceObject::from(source),
        }
    }

    #[must_use]
    pub fn into_source(self) -> Source {
        self.data.into()
    }
}

/// Document carrying a list of sources
#[derive(Debug, Deserialize)]
pub struct SourceCollectionDocument {
    data: Vec<SourceObject>,
}

impl SourceCollectionDocument {
    #[must_use]
    pub fn into_sources(self) -> Vec<Source> {
        self.data.into_iter().map(Source::from).collect()
    }
}
