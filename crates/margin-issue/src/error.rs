//! Error types for the issue registry and wire format

use crate::issue::IssueId;
use crate::registry::IssueState;

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// An issue with this id is already tracked
    #[error("duplicate issue id: {0}")]
    DuplicateId(IssueId),

    /// No issue with this id is tracked
    #[error("issue not found: {0}")]
    NotFound(IssueId),

    /// State change not permitted by the issue lifecycle
    #[error("illegal transition {from:?} -> {to:?}")]
    IllegalTransition { from: IssueState, to: IssueState },
}

/// Wire format errors
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// JSON could not be decoded or encoded
    #[error("invalid issue JSON: {0}")]
    Json(#[from] serde_json::Error),
}
