//! Document tree nodes
//!
//! A document is a forest of [`Node`]s. Ordinary markup becomes
//! [`Element`]s and [`Node::Text`]; overlay wrappers become
//! [`Node::Decorated`] so they can be removed structurally.

use std::fmt::{self, Display, Formatter};

/// Elements that never have children or a closing tag
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Check whether a tag name is a void element
#[inline]
#[must_use]
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// A single node in the document tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Ordinary markup element (paragraph, heading, bold, ...)
    Element(Element),

    /// Entity-decoded text
    Text(String),

    /// Overlay wrapper around a run of text
    Decorated(Decorated),
}

impl Node {
    /// Create a text node
    #[inline]
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Inline nodes take part in anchor matching
    #[inline]
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Text(_) | Self::Decorated(_))
    }

    /// Text carried by an inline node
    #[inline]
    #[must_use]
    pub fn inline_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Decorated(decorated) => Some(&decorated.text),
            Self::Element(_) => None,
        }
    }
}

/// Markup element with attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name
    pub tag: String,
    /// Attributes in source order
    pub attrs: Vec<Attribute>,
    /// Child nodes
    pub children: Vec<Node>,
}

impl Element {
    /// Create element without attributes
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push(Attribute {
            name: name.into(),
            value: Some(value.into()),
        });
        self
    }

    /// Add a child node
    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Look up an attribute value by name (ASCII case-insensitive)
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .and_then(|a| a.value.as_deref())
    }

    /// Check whether the `class` attribute contains a token
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Void elements serialize without a closing tag
    #[inline]
    #[must_use]
    pub fn is_void(&self) -> bool {
        is_void(&self.tag)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// Element attribute; `value` is `None` for bare boolean attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute name as written
    pub name: String,
    /// Decoded value
    pub value: Option<String>,
}

/// Kind of overlay a decoration conveys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DecorationKind {
    /// Pending issue highlight (display-only views)
    Highlight,
    /// Transient wrapper while a suggestion is animating in
    Applying,
    /// Permanent wrapper around a committed suggestion
    Applied,
}

impl DecorationKind {
    /// All kinds, in cleanup order
    pub const ALL: [DecorationKind; 3] = [Self::Highlight, Self::Applying, Self::Applied];

    /// Class token that identifies this kind in markup
    #[inline]
    #[must_use]
    pub const fn marker_class(self) -> &'static str {
        match self {
            Self::Highlight => "issue-highlight",
            Self::Applying => "suggestion-applying",
            Self::Applied => "suggestion-applied",
        }
    }

    /// Detect the kind from a class attribute value
    ///
    /// `Applying` wins over `Applied`, which wins over `Highlight`.
    #[must_use]
    pub fn from_classes(classes: &str) -> Option<Self> {
        let has = |kind: Self| classes.split_whitespace().any(|c| c == kind.marker_class());
        [Self::Applying, Self::Applied, Self::Highlight]
            .into_iter()
            .find(|kind| has(*kind))
    }
}

impl Display for DecorationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Highlight => "highlight",
            Self::Applying => "applying",
            Self::Applied => "applied",
        })
    }
}

/// Decoration metadata, independent of the text it wraps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    /// Overlay kind
    pub kind: DecorationKind,
    /// Owning issue id, if any
    pub issue: Option<String>,
    /// Human-readable label shown on hover
    pub label: Option<String>,
}

impl Decoration {
    /// Create decoration of the given kind
    #[inline]
    #[must_use]
    pub fn new(kind: DecorationKind) -> Self {
        Self {
            kind,
            issue: None,
            label: None,
        }
    }

    /// Attach an issue id
    #[inline]
    #[must_use]
    pub fn with_issue(mut self, issue: impl Into<String>) -> Self {
        self.issue = Some(issue.into());
        self
    }

    /// Attach a hover label
    #[inline]
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Check whether this decoration belongs to `issue`
    #[inline]
    #[must_use]
    pub fn belongs_to(&self, issue: &str) -> bool {
        self.issue.as_deref() == Some(issue)
    }
}

/// Overlay wrapper node: a decoration plus the text it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decorated {
    /// Decoration metadata
    pub decoration: Decoration,
    /// Wrapped text (never contains markup)
    pub text: String,
}

impl Decorated {
    /// Create decorated text
    #[inline]
    #[must_use]
    pub fn new(decoration: Decoration, text: impl Into<String>) -> Self {
        Self {
            decoration,
            text: text.into(),
        }
    }

    /// Decoration kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> DecorationKind {
        self.decoration.kind
    }
}

/// Merge adjacent text nodes and drop empty inline nodes
pub(crate) fn normalize(nodes: &mut Vec<Node>) {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes.drain(..) {
        match node {
            Node::Text(text) if text.is_empty() => {}
            Node::Decorated(d) if d.text.is_empty() => {}
            Node::Text(text) => {
                if let Some(Node::Text(prev)) = merged.last_mut() {
                    prev.push_str(&text);
                } else {
                    merged.push(Node::Text(text));
                }
            }
            Node::Decorated(d) => {
                if let Some(Node::Decorated(prev)) = merged.last_mut() {
                    if prev.decoration == d.decoration {
                        prev.text.push_str(&d.text);
                        continue;
                    }
                }
                merged.push(Node::Decorated(d));
            }
            element @ Node::Element(_) => merged.push(element),
        }
    }
    *nodes = merged;
}
