//! Error types for the sketchui core
//!
//! [`ServiceError`] is the caller-facing taxonomy:
//! - Missing sketches or components
//! - Malformed request fields
//! - Gateway transport and remote-service failures
//! - Undecodable model output, and explicit model refusals
//! - Storage failures, possibly after partial success
//! - Ownership violations

use crate::types::ComponentId;
use sketchui_extract::ExtractionError;
use sketchui_gateway::GatewayError;
use std::path::PathBuf;

/// Caller-facing error
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Sketch or component missing, expired or archived
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed request field
    #[error("invalid request: {0}")]
    Validation(String),

    /// Network or remote-service failure
    #[error("gateway failed: {0}")]
    Transport(#[source] GatewayError),

    /// Caller cancelled before completion
    #[error("operation cancelled")]
    Cancelled,

    /// Model output was not a well-typed JSON object
    #[error("could not decode model output: {0}")]
    Extraction(#[from] ExtractionError),

    /// Model explicitly refused
    #[error("model declined: {reason}")]
    ModelDeclined {
        /// Model's reason, or a generic one
        reason: String,
    },

    /// Storage failed; `committed` rows were written before it did
    #[error("persistence failed after {committed} committed: {source}")]
    Persistence {
        /// Rows written before the failure
        committed: usize,
        /// Ids of those rows, in creation order
        committed_ids: Vec<ComponentId>,
        /// Underlying storage error
        #[source]
        source: RepositoryError,
    },

    /// Caller does not own the resource
    #[error("not authorized: {0}")]
    Authorization(String),
}

impl ServiceError {
    /// Storage failure with nothing committed
    #[inline]
    #[must_use]
    pub fn persistence(source: RepositoryError) -> Self {
        Self::Persistence {
            committed: 0,
            committed_ids: Vec::new(),
            source,
        }
    }

    /// HTTP-style status class
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::Transport(_) => 502,
            Self::Cancelled => 499,
            Self::Extraction(_) | Self::Persistence { .. } => 500,
            Self::ModelDeclined { .. } => 422,
            Self::Authorization(_) => 403,
        }
    }

    /// Message safe to show an end user
    ///
    /// Only `NotFound` and `ModelDeclined` carry specifics; everything else
    /// is generic so transport details never leak.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(what) => what.clone(),
            Self::ModelDeclined { reason } => reason.clone(),
            Self::Validation(_) => "Invalid request".to_string(),
            Self::Transport(_) | Self::Extraction(_) => "Failed to generate UI components".to_string(),
            Self::Cancelled => "Request cancelled".to_string(),
            Self::Persistence { .. } => "Failed to save component".to_string(),
            Self::Authorization(_) => "You are not authorized to access this component".to_string(),
        }
    }

    /// Check for cancellation
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<GatewayError> for ServiceError {
    fn from(err: GatewayError) -> Self {
        if err.is_cancelled() {
            Self::Cancelled
        } else {
            Self::Transport(err)
        }
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFoundOrArchived(_) => Self::NotFound("Component not found".to_string()),
            other @ RepositoryError::Storage(_) => Self::persistence(other),
        }
    }
}

/// Persistence port errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// No live row with this id
    #[error("component {0} not found or already archived")]
    NotFoundOrArchived(ComponentId),

    /// Backend failure
    #[error("storage failure: {0}")]
    Storage(String),
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("cannot read config {path}: {source}")]
    Io {
        /// File that was read
        path: PathBuf,
        /// Read error
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`AppConfig`](crate::AppConfig)
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_taxonomy() {
        assert_eq!(ServiceError::NotFound("Sketch not found".into()).status_code(), 404);
        assert_eq!(ServiceError::Validation("x".into()).status_code(), 400);
        assert_eq!(ServiceError::Transport(GatewayError::EmptyResult).status_code(), 502);
        assert_eq!(ServiceError::Cancelled.status_code(), 499);
        assert_eq!(
            ServiceError::ModelDeclined {
                reason: "no".into()
            }
            .status_code(),
            422
        );
        assert_eq!(
            ServiceError::persistence(RepositoryError::Storage("down".into())).status_code(),
            500
        );
        assert_eq!(ServiceError::Authorization("x".into()).status_code(), 403);
    }

    #[test]
    fn user_message_hides_transport_details() {
        let err = ServiceError::from(GatewayError::gateway(401, "bad key sk-123"));
        assert!(!err.user_message().contains("sk-123"));
    }

    #[test]
    fn user_message_carries_model_reason() {
        let err = ServiceError::ModelDeclined {
            reason: "sketch unclear".into(),
        };
        assert_eq!(err.user_message(), "sketch unclear");
    }

    #[test]
    fn cancelled_gateway_error_maps_to_cancelled() {
        assert!(ServiceError::from(GatewayError::Cancelled).is_cancelled());
    }

    #[test]
    fn missing_row_maps_to_not_found() {
        let err = ServiceError::from(RepositoryError::NotFoundOrArchived(ComponentId(4)));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.user_message(), "Component not found");
    }
}
