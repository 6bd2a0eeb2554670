//! # Resources
//!
//! Host-facing side of the provider. The host runtime drives a resource
//! through five operations taking and returning typed records; failures come
//! back as [`ResourceError`]s and non-fatal findings as warnings.

pub mod data_source;
pub mod error;
pub mod model;
pub mod plan;
pub mod source;
pub mod transition;
pub mod upsert;

pub use data_source::SourceDataSource;
pub use error::ResourceError;
pub use model::{DeploymentModel, SourceModel};
pub use source::SourceResource;

use crate::diagnostics::{Diagnostic, Diagnostics};
use async_trait::async_trait;
use serde::Serialize;

/// Successful outcome: the state to persist plus any warnings
#[derive(Debug, Clone, PartialEq)]
pub struct Applied<T> {
    pub state: T,
    pub warnings: Diagnostics,
}

impl<T> Applied<T> {
    #[must_use]
    pub fn new(state: T) -> Self {
        Self {
            state,
            warnings: Diagnostics::new(),
        }
    }

    #[must_use]
    pub fn with_warning(mut self, warning: Option<Diagnostic>) -> Self {
        if let Some(warning) = warning {
            self.warnings.push(warning);
        }
        self
    }
}

/// Lifecycle operations the host runtime invokes on a managed resource
#[async_trait]
pub trait Resource: Send + Sync {
    type Model: Send + Sync;

    /// Create the resource described by `plan`
    async fn create(&self, plan: Self::Model) -> Result<Applied<Self::Model>, ResourceError>;

    /// Refresh `state` from the remote service
    async fn read(&self, state: Self::Model) -> Result<Applied<Self::Model>, ResourceError>;

    /// Move the resource from `prior` to `plan`
    async fn update(
        &self,
        prior: Self::Model,
        plan: Self::Model,
    ) -> Result<Applied<Self::Model>, ResourceError>;

    /// Remove the resource described by `state`
    async fn delete(&self, state: Self::Model) -> Result<(), ResourceError>;

    /// Bring an existing remote resource under management
    async fn import(&self, id: &str) -> Result<Applied<Self::Model>, ResourceError>;
}

/// What the host receives back from an operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response<T> {
    pub state: Option<T>,
    pub diagnostics: Diagnostics,
}

impl<T> Response<T> {
    /// A response carrying no state
    #[must_use]
    pub fn from_diagnostics(diagnostics: Diagnostics) -> Self {
        Self {
            state: None,
            diagnostics,
        }
    }

    #[must_use]
    pub fn has_error(&self) -> bool {
        self.diagnostics.has_error()
    }
}

impl<T> From<Result<Applied<T>, ResourceError>> for Response<T> {
    fn from(result: Result<Applied<T>, ResourceError>) -> Self {
        match result {
            Ok(applied) => Self {
                state: Some(applied.state),
                diagnostics: applied.warnings,
            },
            Err(err) => {
                let mut diagnostics = Diagnostics::new();
                diagnostics.push(err.into());
                Self::from_diagnostics(diagnostics)
            }
        }
    }
}

impl<T> From<Result<(), ResourceError>> for Response<T> {
    fn from(result: Result<(), ResourceError>) -> Self {
        let mut diagnostics = Diagnostics::new();
        if let Err(err) = result {
            diagnostics.push(err.into());
        }
        Self::from_diagnostics(diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warnings_reach_the_response() {
        let applied = Applied::new(1).with_warning(Some(Diagnostic::warning("w", "d")));
        let response: Response<i32> = Ok::<_, ResourceError>(applied).into();
        assert_eq!(response.state, Some(1));
        assert_eq!(response.diagnostics.len(), 1);
        assert!(!response.has_error());
    }

    #[test]
    fn test_errors_drop_the_state() {
        let response: Response<i32> = Err::<Applied<i32>, _>(ResourceError::Unconfigured).into();
        assert_eq!(response.state, None);
        assert!(response.has_error());
    }

    #[test]
    fn test_successful_delete_has_no_state() {
        let response: Response<i32> = Ok::<(), ResourceError>(()).into();
        assert_eq!(response.state, None);
        assert!(response.diagnostics.is_empty());
    }
}
