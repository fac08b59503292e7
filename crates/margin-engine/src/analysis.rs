//! Analysis collaborator seam
//!
//! The engine never talks to an analysis service directly. Anything that can
//! turn document text into issues implements [`AnalysisSource`].

use crate::error::AnalysisError;
use crate::ingest::AnalysisReport;
use async_trait::async_trait;
use margin_issue::Issue;

/// Produces issues for document content
#[async_trait]
pub trait AnalysisSource: Send + Sync {
    /// Analyse the document's text content
    async fn analyze(&self, content: &str) -> Result<Vec<Issue>, AnalysisError>;
}

/// Source that always returns the same issues
#[derive(Debug, Clone, Default)]
pub struct StaticAnalysis {
    issues: Vec<Issue>,
}

impl StaticAnalysis {
    /// Create source returning `issues`
    #[must_use]
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }
}

#[async_trait]
impl AnalysisSource for StaticAnalysis {
    async fn analyze(&self, _content: &str) -> Result<Vec<Issue>, AnalysisError> {
        Ok(self.issues.clone())
    }
}

#[async_trait]
impl AnalysisSource for AnalysisReport {
    async fn analyze(&self, _content: &str) -> Result<Vec<Issue>, AnalysisError> {
        Ok(self.clone().into_issues()?)
    }
}
