//! Annotation rendering
//!
//! Produces a display-only view of the document with every resolvable issue
//! wrapped in a highlight decoration. The source document is never mutated.

use crate::resolver::resolve;
use margin_document::{Decoration, DecorationKind, Document, OverlayStyle};
use margin_issue::{Issue, IssueId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Order in which issues are highlighted
///
/// Later highlights win where anchors overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderOrder {
    /// Descending `end_pos`; issues without offsets last, ties in input order
    #[default]
    EndPosDescending,
    /// Input order
    Registry,
}

/// Rendering options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Highlight order
    pub order: RenderOrder,
    /// Overlay class lists
    pub style: OverlayStyle,
}

impl RenderOptions {
    /// Set highlight order
    #[inline]
    #[must_use]
    pub fn with_order(mut self, order: RenderOrder) -> Self {
        self.order = order;
        self
    }

    /// Set overlay style
    #[inline]
    #[must_use]
    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }
}

/// Decorated, display-only view of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    /// Serialized markup including highlights
    pub markup: String,
    /// Issues with a visible highlight, in document order
    pub highlighted: Vec<IssueId>,
    /// Issues without a visible highlight, in render order
    pub skipped: Vec<IssueId>,
}

/// Render issue highlights over a copy of `document`
///
/// Never fails: issues whose anchor cannot be resolved, or whose highlight
/// is entirely covered by a later one, are reported in
/// [`RenderedView::skipped`].
#[must_use]
pub fn render<'a>(
    document: &Document,
    issues: impl IntoIterator<Item = &'a Issue>,
    options: &RenderOptions,
) -> RenderedView {
    let mut issues: Vec<&Issue> = issues.into_iter().collect();
    if options.order == RenderOrder::EndPosDescending {
        issues.sort_by(|a, b| end_pos_descending(a.end_pos, b.end_pos));
    }

    let mut view = document.clone();
    let mut wrapped = Vec::with_capacity(issues.len());
    let mut skipped = Vec::new();

    for issue in issues {
        let decoration = Decoration::new(DecorationKind::Highlight)
            .with_issue(issue.id.as_str())
            .with_label(issue.label());

        match resolve(&view, &issue.anchor_text) {
            Ok(span) => match view.wrap_span(&span, decoration) {
                Ok(()) => wrapped.push(issue.id.clone()),
                Err(err) => {
                    tracing::debug!(issue = %issue.id, %err, "highlight failed");
                    skipped.push(issue.id.clone());
                }
            },
            Err(err) => {
                tracing::debug!(issue = %issue.id, %err, "issue not highlighted");
                skipped.push(issue.id.clone());
            }
        }
    }

    let mut highlighted = Vec::with_capacity(wrapped.len());
    for decorated in view.decorations() {
        if decorated.kind() != DecorationKind::Highlight {
            continue;
        }
        if let Some(id) = wrapped
            .iter()
            .find(|id| decorated.decoration.belongs_to(id.as_str()))
        {
            if !highlighted.contains(id) {
                highlighted.push(id.clone());
            }
        }
    }
    skipped.extend(wrapped.into_iter().filter(|id| !highlighted.contains(id)));

    RenderedView {
        markup: view.to_markup_with(&options.style),
        highlighted,
        skipped,
    }
}

fn end_pos_descending(a: Option<usize>, b: Option<usize>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
