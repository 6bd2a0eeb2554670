//! # Source Operations
//!
//! get-by-id, get-by-name, create, update and delete-by-id against
//! `/sources`. Each operation is a single request/response exchange; nothing
//! is retried and nothing is cached.

use super::documents::{SourceCollectionDocument, SourceDocument};
use super::error::ApiError;
use super::transport::{RawResponse, Transport};
use super::types::Source;
use super::ImgixClient;
use crate::constants::RESOURCE_TYPE_SOURCE;
use crate::observability::metrics;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, debug_span, info, info_span, Instrument};

impl ImgixClient {
    /// Fetch a source by id
    ///
    /// # Errors
    /// [`ApiError::InvalidArgument`] for an empty id, otherwise any transport,
    /// remote or decode failure
    pub async fn get_source_by_id(&self, resource_id: &str) -> Result<Source, ApiError> {
        if resource_id.is_empty() {
            return Err(ApiError::InvalidArgument {
                argument: "resourceId",
                operation: "GetSourceByID",
            });
        }

        let span = debug_span!("imgix.source.get", source.id = resource_id);
        async move {
            let request = self
                .transport
                .get(&format!("{RESOURCE_TYPE_SOURCE}/{resource_id}"));
            let raw = self.execute("get", request).await?;
            let document: SourceDocument = decode(raw)?;
            Ok(document.into_source())
        }
        .instrument(span)
        .await
    }

    /// Look a source up by its exact name
    ///
    /// Returns `Ok(None)` when nothing matches. More than one match is an
    /// [`ApiError::AmbiguousResult`]; the caller must not guess.
    ///
    /// # Errors
    /// [`ApiError::InvalidArgument`] for an empty name, otherwise any transport,
    /// remote or decode failure
    pub async fn get_source_by_name(&self, source_name: &str) -> Result<Option<Source>, ApiError> {
        if source_name.is_empty() {
            return Err(ApiError::InvalidArgument {
                argument: "sourceName",
                operation: "GetSourceByName",
            });
        }

        let span = debug_span!("imgix.source.get_by_name", source.name = source_name);
        async move {
            let request = self
                .transport
                .get(RESOURCE_TYPE_SOURCE)
                .query(&[("filter[name]", source_name)]);
            let raw = self.execute("get_by_name", request).await?;
            let document: SourceCollectionDocument = decode(raw)?;
            let mut sources = document.into_sources();

            match sources.len() {
                0 => {
                    debug!("No source found with name: {}", source_name);
                    Ok(None)
                }
                1 => Ok(sources.pop()),
                count => Err(ApiError::AmbiguousResult {
                    name: source_name.to_string(),
                    count,
                }),
            }
        }
        .instrument(span)
        .await
    }

    /// Create a source and return the server's canonical representation
    ///
    /// # Errors
    /// Any transport, remote, encode or decode failure
    pub async fn create_source(&self, source: &Source) -> Result<Source, ApiError> {
        let span = info_span!("imgix.source.create", source.name = %source.name);
        async move {
            info!("Creating imgix source: {}", source.name);
            let request = Transport::with_document(
                self.transport.post(RESOURCE_TYPE_SOURCE),
                &SourceDocument::from_source(source),
            )?;
            let raw = self.execute("create", request).await?;
            let document: SourceDocument = decode(raw)?;
            Ok(document.into_source())
        }
        .instrument(span)
        .await
    }

    /// Partially update a source keyed by its id
    ///
    /// Only attributes holding a non-zero value are sent.
    ///
    /// # Errors
    /// [`ApiError::InvalidArgument`] for an empty id, otherwise any transport,
    /// remote, encode or decode failure
    pub async fn update_source(&self, source: &Source) -> Result<Source, ApiError> {
        if source.id.is_empty() {
            return Err(ApiError::InvalidArgument {
                argument: "ID",
                operation: "UpdateSource",
            });
        }

        let span = info_span!("imgix.source.update", source.id = %source.id);
        async move {
            info!(enabled = ?source.enabled, "Updating imgix source: {}", source.id);
            let raw = self.patch(source, "update").await?;
            let document: SourceDocument = decode(raw)?;
            Ok(document.into_source())
        }
        .instrument(span)
        .await
    }

    /// "Delete" a source
    ///
    /// imgix has no real deletion, the source is disabled instead.
    ///
    /// # Errors
    /// [`ApiError::InvalidArgument`] for an empty id, otherwise any transport
    /// or remote failure
    pub async fn delete_source_by_id(&self, resource_id: &str) -> Result<(), ApiError> {
        if resource_id.is_empty() {
            return Err(ApiError::InvalidArgument {
                argument: "resourceId",
                operation: "DeleteSourceByID",
            });
        }

        let span = info_span!("imgix.source.delete", source.id = resource_id);
        async move {
            info!("Disabling imgix source in place of deletion: {}", resource_id);
            let raw = self
                .patch(&Source::enabled_only(resource_id, false), "delete")
                .await?;
            ensure_success(raw).map(|_| ())
        }
        .instrument(span)
        .await
    }

    async fn patch(&self, source: &Source, operation: &'static str) -> Result<RawResponse, ApiError> {
        let request = Transport::with_document(
            self.transport
                .patch(&format!("{RESOURCE_TYPE_SOURCE}/{}", source.id)),
            &SourceDocument::from_source(source),
        )?;
        self.execute(operation, request).await
    }

    async fn execute(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<RawResponse, ApiError> {
        let start = Instant::now();
        let result = self.transport.round_trip(request).await;
        metrics::record_api_request(operation, start.elapsed().as_secs_f64());
        match &result {
            Ok(raw) if raw.status.is_success() => {}
            Ok(raw) => {
                debug!(status = raw.status.as_u16(), "imgix API returned an error status");
                metrics::increment_api_request_errors(operation);
            }
            Err(e) => {
                debug!(error = %e, "imgix API request failed");
                metrics::increment_api_request_errors(operation);
            }
        }
        result
    }
}

fn ensure_success(raw: RawResponse) -> Result<RawResponse, ApiError> {
    if raw.status.is_success() {
        Ok(raw)
    } else {
        Err(ApiError::Remote {
            status: raw.status.as_u16(),
            body: raw.body,
        })
    }
}

fn decode<T: DeserializeOwned>(raw: RawResponse) -> Result<T, ApiError> {
    let raw = ensure_success(raw)?;
    serde_json::from_str(&raw.body).map_err(|source| ApiError::Decode {
        source,
        body: raw.body,
    })
}
