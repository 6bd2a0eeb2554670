//! # API Errors
//!
//! Failure taxonomy of the imgix management API client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required identifier or name was empty, nothing was sent
    #[error("missing {argument}, can't call {operation}")]
    InvalidArgument {
        argument: &'static str,
        operation: &'static str,
    },

    /// Network, timeout or TLS failure reported by the HTTP stack
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// The caller cancelled while waiting for a permit or a response
    #[error("request cancelled before completion")]
    Cancelled,

    /// The API answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// The API answered 2xx but the body is not the expected JSON:API document
    #[error("failed to unmarshal jsonapi data: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },

    /// A name lookup matched several sources
    #[error("more than one source ({count}) was found with name: {name}; can't import")]
    AmbiguousResult { name: String, count: usize },

    /// The outgoing document could not be serialized
    #[error("failed to marshal jsonapi payload: {0}")]
    Encode(#[source] serde_json::Error),
}

impl ApiError {
    /// True for failures that happened below HTTP semantics (network, timeout, cancellation)
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Cancelled)
    }

    /// HTTP status of a remote failure
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_embeds_status_and_body() {
        let err = ApiError::Remote {
            status: 422,
            body: r#"{"errors":[{"detail":"bad"}]}"#.to_string(),
        };
        assert_eq!(err.to_string(), r#"HTTP 422: {"errors":[{"detail":"bad"}]}"#);
        assert_eq!(err.status(), Some(422));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_cancelled_is_transport_class() {
        assert!(ApiError::Cancelled.is_transport());
        assert_eq!(ApiError::Cancelled.status(), None);
    }

    #[test]
    fn test_invalid_argument_message() {
        let err = ApiError::InvalidArgument {
            argument: "resourceId",
            operation: "GetSourceByID",
        };
        assert_eq!(err.to_string(), "missing resourceId, can't call GetSourceByID");
    }
}
