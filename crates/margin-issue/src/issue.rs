//! Critique issues and their wire representation

use crate::error::WireError;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};

/// Opaque, stable issue identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(String);

impl IssueId {
    /// Create identifier
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for IssueId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IssueId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for IssueId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for IssueId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for IssueId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Category of a critique
///
/// Unknown wire values are kept as [`IssueKind::Other`] and shown with the
/// generic "Issue" label; an issue is never rejected for its type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum IssueKind {
    /// Two statements contradict each other
    Contradiction,
    /// A step in the argument is missing
    Gap,
    /// A claim is not backed by evidence
    WeakEvidence,
    /// Wording is unclear
    Clarity,
    /// A term is used without being defined
    UndefinedTerm,
    /// Any other category reported by the analysis source
    Other(String),
}

impl IssueKind {
    /// Normalize a wire type name
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "contradiction" | "logic_contradiction" => Self::Contradiction,
            "gap" | "logic_gap" => Self::Gap,
            "weak_evidence" => Self::WeakEvidence,
            "clarity" | "clarity_issue" => Self::Clarity,
            "undefined_term" => Self::UndefinedTerm,
            _ => Self::Other(value.to_string()),
        }
    }

    /// Canonical wire type name
    #[must_use]
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Contradiction => "contradiction",
            Self::Gap => "gap",
            Self::WeakEvidence => "weak_evidence",
            Self::Clarity => "clarity",
            Self::UndefinedTerm => "undefined_term",
            Self::Other(value) => value,
        }
    }

    /// Human-readable category label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Contradiction => "Logic Contradiction",
            Self::Gap => "Logic Gap",
            Self::WeakEvidence => "Weak Evidence",
            Self::Clarity => "Clarity Issue",
            Self::UndefinedTerm => "Undefined Term",
            Self::Other(_) => "Issue",
        }
    }
}

impl From<String> for IssueKind {
    fn from(value: String) -> Self {
        Self::from_wire(&value)
    }
}

impl From<IssueKind> for String {
    fn from(kind: IssueKind) -> Self {
        kind.as_wire().to_string()
    }
}

impl Display for IssueKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One critique reported against the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IssueWire", into = "IssueWire")]
pub struct Issue {
    /// Unique identifier
    pub id: IssueId,
    /// Category
    pub kind: IssueKind,
    /// Text the issue refers to; authoritative for matching
    pub anchor_text: String,
    /// Explanation shown to the user
    pub message: String,
    /// Replacement text, if the issue can be applied
    pub suggestion: Option<String>,
    /// Advisory start offset from the analysis source
    pub start_pos: Option<usize>,
    /// Advisory end offset from the analysis source
    pub end_pos: Option<usize>,
}

impl Issue {
    /// Create issue without message or suggestion
    #[must_use]
    pub fn new(id: impl Into<IssueId>, kind: IssueKind, anchor_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            anchor_text: anchor_text.into(),
            message: String::new(),
            suggestion: None,
            start_pos: None,
            end_pos: None,
        }
    }

    /// Set message
    #[inline]
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Set suggested replacement
    #[inline]
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Set advisory offsets
    #[inline]
    #[must_use]
    pub fn with_positions(mut self, start: usize, end: usize) -> Self {
        self.start_pos = Some(start);
        self.end_pos = Some(end);
        self
    }

    /// Suggestion text, if present and non-empty
    #[must_use]
    pub fn applicable_suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether the issue can be applied
    ///
    /// Requires both a non-empty anchor and a non-empty suggestion.
    #[must_use]
    pub fn is_applicable(&self) -> bool {
        !self.anchor_text.is_empty() && self.applicable_suggestion().is_some()
    }

    /// Human-readable category label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    /// Parse a JSON array of wire issues
    ///
    /// # Errors
    /// Returns [`WireError`] if the input is not a valid issue list.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, WireError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize issues as a JSON array in wire shape
    ///
    /// # Errors
    /// Returns [`WireError`] if serialization fails.
    pub fn list_to_json(issues: &[Self]) -> Result<String, WireError> {
        Ok(serde_json::to_string_pretty(issues)?)
    }
}

/// Issue as exchanged with the analysis source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueWire {
    /// Issue identifier
    pub id: String,
    /// Category name, normalized by [`IssueKind::from_wire`]
    #[serde(rename = "type")]
    pub kind: String,
    /// Anchor text; missing means the issue cannot be anchored
    #[serde(default)]
    pub text: String,
    /// Explanation shown to the user
    #[serde(default)]
    pub message: String,
    /// Replacement text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Advisory start offset
    #[serde(default, alias = "startPos", skip_serializing_if = "Option::is_none")]
    pub start_pos: Option<usize>,
    /// Advisory end offset
    #[serde(default, alias = "endPos", skip_serializing_if = "Option::is_none")]
    pub end_pos: Option<usize>,
}

impl From<IssueWire> for Issue {
    fn from(wire: IssueWire) -> Self {
        Self {
            id: IssueId(wire.id),
            kind: IssueKind::from_wire(&wire.kind),
            anchor_text: wire.text,
            message: wire.message,
            suggestion: wire.suggestion,
            start_pos: wire.start_pos,
            end_pos: wire.end_pos,
        }
    }
}

impl From<Issue> for IssueWire {
    fn from(issue: Issue) -> Self {
        Self {
            id: issue.id.0,
            kind: issue.kind.into(),
            text: issue.anchor_text,
            message: issue.message,
            suggestion: issue.suggestion,
            start_pos: issue.start_pos,
            end_pos: issue.end_pos,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kind_accepts_aliases() {
        assert_eq!(IssueKind::from_wire("logic_contradiction"), IssueKind::Contradiction);
        assert_eq!(IssueKind::from_wire("Logic_Gap"), IssueKind::Gap);
        assert_eq!(IssueKind::from_wire("clarity_issue"), IssueKind::Clarity);
        assert_eq!(IssueKind::from_wire("weak_evidence"), IssueKind::WeakEvidence);
    }

    #[test]
    fn unknown_kind_falls_back() {
        let kind = IssueKind::from_wire("tone");
        assert_eq!(kind, IssueKind::Other("tone".into()));
        assert_eq!(kind.label(), "Issue");
        assert_eq!(kind.as_wire(), "tone");
    }

    #[test]
    fn wire_issue_deserializes_with_aliases() {
        let json = r#"[{
            "id": "1",
            "type": "logic_gap",
            "text": "therefore",
            "startPos": 4,
            "endPos": 13,
            "suggestion": "so"
        }]"#;
        let issues = Issue::list_from_json(json).unwrap();
        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.id.as_str(), "1");
        assert_eq!(issue.kind, IssueKind::Gap);
        assert_eq!(issue.anchor_text, "therefore");
        assert_eq!(issue.message, "");
        assert_eq!((issue.start_pos, issue.end_pos), (Some(4), Some(13)));
        assert!(issue.is_applicable());
    }

    #[test]
    fn missing_anchor_text_keeps_the_batch() {
        let json = r#"[
            {"id": "1", "type": "gap", "message": "m"},
            {"id": "2", "type": "clarity", "text": "vague", "suggestion": "precise"}
        ]"#;
        let issues = Issue::list_from_json(json).unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].anchor_text, "");
        assert!(!issues[0].is_applicable());
        assert!(issues[1].is_applicable());
    }

    #[test]
    fn wire_shape_uses_snake_case_names() {
        let issue = Issue::new("a", IssueKind::Clarity, "x").with_positions(1, 2);
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(value["type"], "clarity");
        assert_eq!(value["text"], "x");
        assert_eq!(value["start_pos"], 1);
        assert!(value.get("suggestion").is_none());
    }

    #[test]
    fn empty_suggestion_is_not_applicable() {
        let issue = Issue::new("1", IssueKind::Gap, "x").with_suggestion("");
        assert!(!issue.is_applicable());
        assert_eq!(issue.applicable_suggestion(), None);
        assert!(!Issue::new("2", IssueKind::Gap, "").with_suggestion("y").is_applicable());
    }

    #[test]
    fn invalid_json_is_a_wire_error() {
        assert!(Issue::list_from_json("{\"id\": 1}").is_err());
    }
}
