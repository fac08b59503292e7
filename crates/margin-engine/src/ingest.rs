//! Analysis response ingestion
//!
//! Converts the analysis service's response bodies into [`Issue`]s:
//! - undefined terms become [`IssueKind::UndefinedTerm`] issues
//! - unsupported claims become [`IssueKind::WeakEvidence`] issues
//! - contradictions become [`IssueKind::Contradiction`] issues anchored on
//!   the second sentence
//!
//! Issue ids are `<kind>-<index>`, unique within one response.

use crate::error::IngestError;
use margin_issue::{Issue, IssueKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    /// Analysis timestamp
    pub analyzed_at: Option<String>,
    /// Model that produced the response
    pub model: Option<String>,
    /// Confidence threshold used
    pub threshold: Option<f64>,
    /// Failure description, set on unsuccessful responses
    pub error: Option<String>,
}

/// One term reported by the undefined-terms analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndefinedTermItem {
    /// The term itself
    pub term: Option<String>,
    /// Sentence where the term first occurs
    pub first_appeared: Option<String>,
    /// Text around the first occurrence
    pub context_snippet: Option<String>,
    /// Whether a definition was found
    pub is_defined: Option<bool>,
    /// Why the term counts as undefined
    pub reason: Option<String>,
    /// Definition text, when found
    pub definition_found: Option<String>,
}

/// Undefined-terms analysis response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndefinedTermsResponse {
    /// Whether the analysis ran
    pub success: bool,
    /// Analyzed text
    pub content: String,
    /// Caller-supplied context, passed through
    pub context: Value,
    /// Number of terms examined
    pub total_terms_found: usize,
    /// Number of undefined terms
    pub total_undefined: usize,
    /// Terms without a definition
    pub undefined_terms: Vec<UndefinedTermItem>,
    /// Terms with a definition
    pub defined_terms: Vec<UndefinedTermItem>,
    /// Response metadata
    pub metadata: Metadata,
}

/// One claim reported by the unsupported-claims analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnsupportedClaimItem {
    /// Claim text; used as the anchor
    pub claim: Option<String>,
    /// Where the claim appears
    pub location: Option<String>,
    /// Support status
    pub status: String,
    /// Why the claim is unsupported
    pub reason: Option<String>,
    /// Text around the claim
    pub surrounding_context: Option<String>,
    /// Suggested rewrite
    pub suggestion: Option<String>,
    /// Kind of evidence expected
    pub evidence_type: Option<String>,
    /// Evidence found, if any
    pub evidence: Option<String>,
}

/// Unsupported-claims analysis response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnsupportedClaimsResponse {
    /// Whether the analysis ran
    pub success: bool,
    /// Analyzed text
    pub content: String,
    /// Caller-supplied context, passed through
    pub context: Value,
    /// Number of claims examined
    pub total_claims_found: usize,
    /// Number of unsupported claims
    pub total_unsupported: usize,
    /// Claims lacking support
    pub unsupported_claims: Vec<UnsupportedClaimItem>,
    /// Claims with support
    pub supported_claims: Vec<UnsupportedClaimItem>,
    /// Response metadata
    pub metadata: Metadata,
}

/// One contradicting sentence pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContradictionItem {
    /// Pair identifier
    pub id: Option<u64>,
    /// Index of the first sentence
    pub sentence1_index: Option<usize>,
    /// Index of the second sentence
    pub sentence2_index: Option<usize>,
    /// First sentence
    pub sentence1: Option<String>,
    /// Second sentence; used as the anchor
    pub sentence2: Option<String>,
    /// Model confidence
    pub confidence: Option<f64>,
    /// Whether the score was boosted by a heuristic
    pub boosted: Option<bool>,
}

/// Contradiction check response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContradictionCheckResponse {
    /// Whether the analysis ran
    pub success: bool,
    /// Detection mode
    pub mode: String,
    /// Model location
    pub model_path: Option<String>,
    /// Analyzed text
    pub text: String,
    /// Number of sentences
    pub total_sentences: usize,
    /// Sentences in order
    pub sentences: Vec<String>,
    /// Number of contradicting pairs
    pub total_contradictions: usize,
    /// Contradicting pairs
    pub contradictions: Vec<ContradictionItem>,
    /// Response metadata
    pub metadata: Metadata,
}

fn check(success: bool, metadata: &Metadata) -> Result<(), IngestError> {
    if let Some(reason) = &metadata.error {
        return Err(IngestError::Unsuccessful {
            reason: reason.clone(),
        });
    }
    if !success {
        return Err(IngestError::Unsuccessful {
            reason: "service reported failure".to_string(),
        });
    }
    Ok(())
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

fn issue_id(kind: &IssueKind, index: usize) -> String {
    format!("{}-{index}", kind.as_wire())
}

impl UndefinedTermsResponse {
    /// Issues for every reported undefined term
    ///
    /// # Errors
    /// Returns [`IngestError::Unsuccessful`] if the response reports failure.
    pub fn into_issues(self) -> Result<Vec<Issue>, IngestError> {
        check(self.success, &self.metadata)?;
        let kind = IssueKind::UndefinedTerm;
        Ok(self
            .undefined_terms
            .iter()
            .filter_map(|item| {
                let term = non_empty(item.term.as_ref())?;
                let message = non_empty(item.reason.as_ref())
                    .unwrap_or("Term is used without being defined");
                Some((term.to_string(), message.to_string()))
            })
            .enumerate()
            .map(|(i, (term, message))| {
                Issue::new(issue_id(&kind, i), kind.clone(), term).with_message(message)
            })
            .collect())
    }
}

impl UnsupportedClaimsResponse {
    /// Issues for every unsupported claim
    ///
    /// # Errors
    /// Returns [`IngestError::Unsuccessful`] if the response reports failure.
    pub fn into_issues(self) -> Result<Vec<Issue>, IngestError> {
        check(self.success, &self.metadata)?;
        let kind = IssueKind::WeakEvidence;
        Ok(self
            .unsupported_claims
            .into_iter()
            .filter(|item| item.status != "supported")
            .filter_map(|item| {
                let claim = non_empty(item.claim.as_ref())?.to_string();
                let message = item.reason.clone().unwrap_or_default();
                let suggestion = non_empty(item.suggestion.as_ref()).map(str::to_string);
                Some((claim, message, suggestion))
            })
            .enumerate()
            .map(|(i, (claim, message, suggestion))| {
                let issue = Issue::new(issue_id(&kind, i), kind.clone(), claim).with_message(message);
                match suggestion {
                    Some(s) => issue.with_suggestion(s),
                    None => issue,
                }
            })
            .collect())
    }
}

impl ContradictionCheckResponse {
    /// Issues for every contradicting pair, anchored on the later sentence
    ///
    /// # Errors
    /// Returns [`IngestError::Unsuccessful`] if the response reports failure.
    pub fn into_issues(self) -> Result<Vec<Issue>, IngestError> {
        check(self.success, &self.metadata)?;
        let kind = IssueKind::Contradiction;
        Ok(self
            .contradictions
            .iter()
            .filter_map(|item| {
                let first = non_empty(item.sentence1.as_ref())?;
                let second = non_empty(item.sentence2.as_ref())?;
                let mut message = format!("Contradicts: \"{first}\"");
                if let Some(confidence) = item.confidence {
                    message.push_str(&format!(" (confidence {confidence:.2})"));
                }
                Some((second.to_string(), message))
            })
            .enumerate()
            .map(|(i, (anchor, message))| {
                Issue::new(issue_id(&kind, i), kind.clone(), anchor).with_message(message)
            })
            .collect())
    }
}

/// Combined results of one analysis pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisReport {
    /// Contradiction check result
    pub contradictions: Option<ContradictionCheckResponse>,
    /// Unsupported-claims result
    pub unsupported_claims: Option<UnsupportedClaimsResponse>,
    /// Undefined-terms result
    pub undefined_terms: Option<UndefinedTermsResponse>,
}

impl AnalysisReport {
    /// Parse a report from JSON
    ///
    /// # Errors
    /// Returns [`IngestError::Json`] if the body does not match the schema.
    pub fn from_json(json: &str) -> Result<Self, IngestError> {
        Ok(serde_json::from_str(json)?)
    }

    /// All issues: contradictions, then unsupported claims, then undefined
    /// terms
    ///
    /// # Errors
    /// Returns the first [`IngestError::Unsuccessful`] among the responses.
    pub fn into_issues(self) -> Result<Vec<Issue>, IngestError> {
        let mut issues = Vec::new();
        if let Some(response) = self.contradictions {
            issues.extend(response.into_issues()?);
        }
        if let Some(response) = self.unsupported_claims {
            issues.extend(response.into_issues()?);
        }
        if let Some(response) = self.undefined_terms {
            issues.extend(response.into_issues()?);
        }
        tracing::debug!(count = issues.len(), "ingested analysis report");
        Ok(issues)
    }
}
