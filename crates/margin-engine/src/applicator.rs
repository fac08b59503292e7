//! Suggestion application
//!
//! Applying a suggestion takes two document edits separated by the commit
//! delay:
//!
//! 1. [`begin`] replaces the anchor with the suggestion inside an `Applying`
//!    wrapper tagged with the issue id.
//! 2. [`commit`] turns that wrapper into a permanent `Applied` one.
//!
//! Another suggestion may land inside the wrapper while it animates, splitting
//! it into several fragments. [`commit`] converts every fragment and keeps
//! the text each one currently holds.
//!
//! The document can change between the two steps, so [`commit`] searches
//! again and falls back to the bare suggestion text, then to the original
//! anchor, before giving up.

use crate::error::EngineError;
use margin_document::{Decoration, DecorationKind, Document, DocumentError};
use margin_issue::Issue;
use margin_overlay::{resolve, ResolveError};

/// How a commit found its target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The transient wrapper was converted
    Committed,
    /// The bare suggestion text was wrapped
    WrappedSuggestion,
    /// The original anchor was replaced with the suggestion
    ReplacedAnchor,
    /// Nothing to commit against; the document is unchanged
    Abandoned,
}

impl CommitOutcome {
    /// Whether the suggestion is now marked applied in the document
    #[inline]
    #[must_use]
    pub fn is_accepted(self) -> bool {
        !matches!(self, Self::Abandoned)
    }
}

/// Start applying `issue`: replace its anchor with an `Applying` wrapper
///
/// # Errors
/// - [`EngineError::MalformedIssue`] if the issue has no suggestion or anchor
/// - [`EngineError::AnchorNotFound`] if the anchor does not occur
/// - [`EngineError::Document`] if the edit fails
///
/// The document is unchanged on error.
pub fn begin(document: &mut Document, issue: &Issue) -> Result<(), EngineError> {
    let suggestion = issue
        .applicable_suggestion()
        .ok_or_else(|| EngineError::malformed(&issue.id, "no suggestion"))?;

    let span = resolve(document, &issue.anchor_text).map_err(|err| match err {
        ResolveError::EmptyAnchor => EngineError::malformed(&issue.id, "empty anchor text"),
        ResolveError::NotFound { anchor } => EngineError::AnchorNotFound {
            id: issue.id.clone(),
            anchor,
        },
    })?;

    document.replace_span(&span, suggestion, Some(marker(DecorationKind::Applying, issue)))?;
    Ok(())
}

/// Finish applying `issue`: mark the suggestion applied
///
/// # Errors
/// Returns [`DocumentError`] if an edit fails. Fragments converted before
/// the failure stay applied.
pub fn commit(document: &mut Document, issue: &Issue) -> Result<CommitOutcome, DocumentError> {
    let applied = marker(DecorationKind::Applied, issue);
    let suggestion = issue.applicable_suggestion().unwrap_or_default();

    let mut converted = 0;
    while let Some(span) = document.find_decoration(DecorationKind::Applying, issue.id.as_str()) {
        document.wrap_span(&span, applied.clone())?;
        converted += 1;
    }
    if converted > 0 {
        return Ok(CommitOutcome::Committed);
    }

    if !suggestion.is_empty() {
        if let Ok(span) = resolve(document, suggestion) {
            document.wrap_span(&span, applied)?;
            return Ok(CommitOutcome::WrappedSuggestion);
        }
        if let Ok(span) = resolve(document, &issue.anchor_text) {
            document.replace_span(&span, suggestion, Some(applied))?;
            return Ok(CommitOutcome::ReplacedAnchor);
        }
    }

    Ok(CommitOutcome::Abandoned)
}

fn marker(kind: DecorationKind, issue: &Issue) -> Decoration {
    Decoration::new(kind).with_issue(issue.id.as_str())
}
