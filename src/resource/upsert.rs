//! # Upsert by Name
//!
//! Create-time fallback enabled by `upsert_by_name`: a source that already
//! exists under the desired name is adopted and brought in line with the plan
//! instead of creating a duplicate.

use super::error::ResourceError;
use super::model::without_placeholder;
use crate::client::{ImgixClient, Source};
use crate::diagnostics::Diagnostic;
use tracing::{info, warn};

/// What Create has to do for a desired name
#[derive(Debug, Clone, PartialEq)]
pub enum CreatePath {
    /// Nothing exists under the name
    Create,
    /// A single source exists under the name
    Adopt(Source),
}

/// Decide between creating and adopting
///
/// # Errors
/// [`ResourceError::Upsert`] when the lookup fails or matches more than one source
pub async fn resolve(client: &ImgixClient, name: &str) -> Result<CreatePath, ResourceError> {
    match client
        .get_source_by_name(name)
        .await
        .map_err(ResourceError::Upsert)?
    {
        None => Ok(CreatePath::Create),
        Some(existing) => Ok(CreatePath::Adopt(existing)),
    }
}

/// Create `desired`, or adopt an existing source of the same name when
/// `upsert_by_name` is set
///
/// Returns the server's representation and, on adoption, a warning.
///
/// # Errors
/// The failing step as a [`ResourceError`]
pub async fn create_or_adopt(
    client: &ImgixClient,
    upsert_by_name: bool,
    desired: Source,
) -> Result<(Source, Option<Diagnostic>), ResourceError> {
    let path = if upsert_by_name {
        resolve(client, &desired.name).await?
    } else {
        CreatePath::Create
    };

    match path {
        CreatePath::Create => {
            let created = client
                .create_source(&desired)
                .await
                .map_err(ResourceError::Create)?;
            info!("Created imgix source {} with id {}", created.name, created.id);
            Ok((created, None))
        }
        CreatePath::Adopt(existing) => {
            warn!(
                "Found existing source {} with id {}, adopting it",
                existing.name, existing.id
            );
            let adopted = without_placeholder(Source {
                id: existing.id.clone(),
                ..desired
            });
            let updated = client
                .update_source(&adopted)
                .await
                .map_err(ResourceError::SyncExisting)?;
            let warning = Diagnostic::warning(
                "Found Existing Resource",
                format!(
                    "A source named {:?} already exists with id {}. It was adopted and \
                     updated with the configured attributes instead of creating a new one.",
                    existing.name, existing.id
                ),
            );
            Ok((updated, Some(warning)))
        }
    }
}
