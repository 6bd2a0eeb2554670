//! # Resource Errors
//!
//! One variant per failing step of a resource operation. Each variant maps to
//! a diagnostic: [`ResourceError::summary`] is the short title, `Display` is
//! the detail including the underlying cause.

use crate::client::ApiError;
use crate::diagnostics::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResourceError {
    /// The provider was never configured with a working client
    #[error("Expected configured HTTP client. Please report this issue to the provider developers.")]
    Unconfigured,

    /// Attribute change requested on a source that is and stays disabled
    #[error(
        "imgix does not allow updates to attributes while `enabled = false`. \
         Set `enabled = true` to update any attribute."
    )]
    IllegalStateTransition,

    #[error("Could not create source, unexpected error: {0}")]
    Create(#[source] ApiError),

    #[error("Could not look up an existing source by name: {0}")]
    Upsert(#[source] ApiError),

    #[error("Could not update the existing source with the desired attributes: {0}")]
    SyncExisting(#[source] ApiError),

    #[error("Could not enable source before updating its attributes: {0}")]
    Enable(#[source] ApiError),

    #[error("Could not update source, unexpected error: {0}")]
    Update(#[source] ApiError),

    #[error("Could not read source: {0}")]
    Fetch(#[source] ApiError),

    #[error("Could not delete source, unexpected error: {0}")]
    Delete(#[source] ApiError),
}

impl ResourceError {
    /// Short diagnostic title
    #[must_use]
    pub fn summary(&self) -> &'static str {
        match self {
            Self::Unconfigured => "Unconfigured HTTP Client",
            Self::IllegalStateTransition => "Unable to Update Resource When Disabled",
            Self::Create(_) => "Unable to Create Resource",
            Self::Upsert(_) => "Unable to Upsert Resource",
            Self::SyncExisting(_) => "Unable to Sync Existing Resource",
            Self::Enable(_) => "Unable to Enable Resource",
            Self::Update(_) => "Unable to Update Resource",
            Self::Fetch(_) => "Failed to fetch source by ID",
            Self::Delete(_) => "Unable to Delete Resource",
        }
    }

    /// Underlying client failure, if the step reached the API
    #[must_use]
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Unconfigured | Self::IllegalStateTransition => None,
            Self::Create(e)
            | Self::Upsert(e)
            | Self::SyncExisting(e)
            | Self::Enable(e)
            | Self::Update(e)
            | Self::Fetch(e)
            | Self::Delete(e) => Some(e),
        }
    }
}

impl From<&ResourceError> for Diagnostic {
    fn from(err: &ResourceError) -> Self {
        Diagnostic::error(err.summary(), err.to_string())
    }
}

impl From<ResourceError> for Diagnostic {
    fn from(err: ResourceError) -> Self {
        Diagnostic::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;

    #[test]
    fn test_detail_carries_remote_status_and_body() {
        let err = ResourceError::Update(ApiError::Remote {
            status: 409,
            body: "conflict".to_string(),
        });
        let diagnostic = Diagnostic::from(&err);
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.summary, "Unable to Update Resource");
        assert!(diagnostic.detail.contains("HTTP 409: conflict"));
        assert_eq!(err.api_error().and_then(ApiError::status), Some(409));
    }

    #[test]
    fn test_state_errors_have_no_api_cause() {
        assert!(ResourceError::IllegalStateTransition.api_error().is_none());
        assert_eq!(
            ResourceError::Unconfigured.summary(),
            "Unconfigured HTTP Client"
        );
    }
}
