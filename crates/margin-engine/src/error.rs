//! Error types for the Margin engine
//!
//! Provides error handling for:
//! - Suggestion application (unknown, malformed or unanchored issues)
//! - Analysis mode control and the analysis collaborator
//! - Analysis response ingestion
//! - Configuration loading

use margin_document::DocumentError;
use margin_issue::{IssueId, RegistryError};
use std::path::PathBuf;

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Anchor text no longer occurs in the document
    #[error("anchor for issue {id} not found: {anchor:?}")]
    AnchorNotFound {
        /// Issue being applied
        id: IssueId,
        /// Anchor text that was searched for
        anchor: String,
    },

    /// Issue cannot be applied
    #[error("issue {id} cannot be applied: {reason}")]
    MalformedIssue {
        /// Issue being applied
        id: IssueId,
        /// What is missing
        reason: &'static str,
    },

    /// Analysis collaborator failed or timed out
    #[error("analysis unavailable: {0}")]
    AnalysisUnavailable(#[from] AnalysisError),

    /// Issue is not tracked
    #[error("unknown issue: {0}")]
    UnknownIssue(IssueId),

    /// Issue is already being applied
    #[error("issue {0} is already being applied")]
    AlreadyAnimating(IssueId),

    /// Operation requires analysis mode
    #[error("analysis mode is not active")]
    NotActive,

    /// Document is read-only while analysis mode is active
    #[error("document is read-only while analysis mode is active")]
    ReadOnly,

    /// Markup could not be parsed or edited
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// Registry rejected an operation
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl EngineError {
    /// Check if the engine state is intact after this error
    ///
    /// Only document errors may leave a requested change unapplied in a way
    /// the caller has to handle.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Document(_))
    }

    /// Check if the error should be surfaced to the user
    #[inline]
    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::AnalysisUnavailable(_))
    }

    pub(crate) fn malformed(id: &IssueId, reason: &'static str) -> Self {
        Self::MalformedIssue {
            id: id.clone(),
            reason,
        }
    }
}

/// Analysis collaborator errors
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Source reported a failure
    #[error("analysis failed: {0}")]
    Failed(String),

    /// Source did not answer in time
    #[error("analysis timed out after {duration_secs}s")]
    Timeout {
        /// Configured timeout
        duration_secs: u64,
    },

    /// Response could not be turned into issues
    #[error("invalid analysis response: {0}")]
    Ingest(#[from] IngestError),
}

/// Analysis response ingestion errors
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// Response reports failure
    #[error("analysis was unsuccessful: {reason}")]
    Unsuccessful {
        /// Error text from the response metadata
        reason: String,
    },

    /// Response body is not valid JSON for its schema
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config is not valid TOML for [`crate::EngineConfig`]
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}
