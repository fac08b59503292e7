//! Markup serialization
//!
//! Provides [`OverlayStyle`], the class lists written onto overlay wrappers,
//! and the serializer used by [`crate::Document::to_markup_with`].

use crate::escape::{escape_attr, escape_text};
use crate::node::{Decorated, DecorationKind, Node};
use crate::parse::TOOLTIP_CLASS;
use serde::{Deserialize, Serialize};

/// Class lists written onto overlay wrapper elements
///
/// Each list always carries the kind's marker class so the markup can be
/// parsed back into decorations; [`OverlayStyle::class_for`] adds it when a
/// configured list leaves it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Classes for pending issue highlights
    pub highlight: String,
    /// Classes for the hover tooltip nested in a highlight
    pub tooltip: String,
    /// Classes for the transient wrapper while a suggestion animates
    pub applying: String,
    /// Classes for committed suggestions
    pub applied: String,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            highlight: "underline decoration-red-500 decoration-2 bg-red-100 cursor-pointer \
                        hover:bg-red-200 transition-all relative group px-0.5 rounded issue-highlight"
                .to_string(),
            tooltip: "issue-tooltip invisible group-hover:visible absolute bottom-full left-0 mb-2 \
                      px-2 py-1 bg-gray-900 text-white text-xs rounded whitespace-nowrap z-50 \
                      pointer-events-none"
                .to_string(),
            applying: "suggestion-applying bg-green-200 text-green-800 font-semibold animate-pulse \
                       px-1 rounded"
                .to_string(),
            applied: "suggestion-applied bg-green-100 text-green-800 font-medium px-1 rounded"
                .to_string(),
        }
    }
}

impl OverlayStyle {
    /// Minimal style carrying only the marker classes
    #[must_use]
    pub fn bare() -> Self {
        Self {
            highlight: DecorationKind::Highlight.marker_class().to_string(),
            tooltip: TOOLTIP_CLASS.to_string(),
            applying: DecorationKind::Applying.marker_class().to_string(),
            applied: DecorationKind::Applied.marker_class().to_string(),
        }
    }

    /// Class attribute value for a decoration kind
    #[must_use]
    pub fn class_for(&self, kind: DecorationKind) -> String {
        let configured = match kind {
            DecorationKind::Highlight => &self.highlight,
            DecorationKind::Applying => &self.applying,
            DecorationKind::Applied => &self.applied,
        };
        with_marker(configured, kind.marker_class())
    }

    fn tooltip_class(&self) -> String {
        with_marker(&self.tooltip, TOOLTIP_CLASS)
    }
}

fn with_marker(classes: &str, marker: &str) -> String {
    if classes.split_whitespace().any(|c| c == marker) {
        classes.split_whitespace().collect::<Vec<_>>().join(" ")
    } else if classes.trim().is_empty() {
        marker.to_string()
    } else {
        format!("{marker} {}", classes.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

pub(crate) fn write_nodes(nodes: &[Node], style: &OverlayStyle, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => escape_text(text, out),
            Node::Decorated(decorated) => write_decorated(decorated, style, out),
            Node::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                for attr in &element.attrs {
                    out.push(' ');
                    out.push_str(&attr.name);
                    if let Some(value) = &attr.value {
                        out.push_str("=\"");
                        escape_attr(value, out);
                        out.push('"');
                    }
                }
                out.push('>');
                if element.is_void() {
                    continue;
                }
                write_nodes(&element.children, style, out);
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }
}

fn write_decorated(decorated: &Decorated, style: &OverlayStyle, out: &mut String) {
    let decoration = &decorated.decoration;
    out.push_str("<span class=\"");
    escape_attr(&style.class_for(decoration.kind), out);
    out.push('"');
    if let Some(issue) = &decoration.issue {
        out.push_str(" data-issue-id=\"");
        escape_attr(issue, out);
        out.push('"');
    }
    if let Some(label) = &decoration.label {
        out.push_str(" data-issue-type=\"");
        escape_attr(label, out);
        out.push('"');
    }
    out.push('>');
    escape_text(&decorated.text, out);

    if decoration.kind == DecorationKind::Highlight {
        if let Some(label) = &decoration.label {
            out.push_str("<span class=\"");
            escape_attr(&style.tooltip_class(), out);
            out.push_str("\">");
            escape_text(label, out);
            out.push_str("</span>");
        }
    }
    out.push_str("</span>");
}
