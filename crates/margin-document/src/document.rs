//! The owned document: Content Store of the overlay engine
//!
//! [`Document`] owns the parsed node forest. Overlay edits address text
//! through [`Span`]s over *inline runs*: maximal sequences of sibling
//! text/decoration nodes inside one container. Decorations are transparent
//! to run text, so a span may start or end inside an existing decoration.

use crate::error::DocumentError;
use crate::node::{normalize, Decorated, Decoration, DecorationKind, Node};
use crate::serialize::{write_nodes, OverlayStyle};
use std::fmt::{self, Display, Formatter};
use std::ops::Range;
use std::str::FromStr;

/// Parsed rich-text document
///
/// # Invariants
/// - No empty inline nodes and no adjacent text nodes in any child list
/// - Decorations are never nested and never cross element boundaries
/// - [`Document::to_markup`] always yields well-formed markup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

/// A contiguous piece of run text addressed inside a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// Child-index path of the containing element (empty for the root)
    pub container: Vec<usize>,
    /// Child index of the run's first node within the container
    pub run_start: usize,
    /// Byte range inside the run text
    pub range: Range<usize>,
    /// Text currently covered by the span
    pub text: String,
}

/// Maximal sequence of inline siblings, viewed as one string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineRun {
    container: Vec<usize>,
    start: usize,
    len: usize,
    text: String,
}

impl InlineRun {
    /// Concatenated text of the run's nodes
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of child nodes in the run
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.len
    }

    /// Build a span over `range` of this run's text
    ///
    /// Returns `None` if the range is out of bounds or not on char boundaries.
    #[must_use]
    pub fn span(&self, range: Range<usize>) -> Option<Span> {
        let text = self.text.get(range.clone())?.to_string();
        Some(Span {
            container: self.container.clone(),
            run_start: self.start,
            range,
            text,
        })
    }
}

impl Document {
    /// Create an empty document
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse serialized markup
    ///
    /// # Errors
    /// Returns [`DocumentError`] if the markup is not well-formed.
    pub fn parse(markup: &str) -> Result<Self, DocumentError> {
        Ok(Self {
            nodes: crate::parse::parse(markup)?,
        })
    }

    /// Build from nodes, normalizing every child list
    #[must_use]
    pub fn from_nodes(mut nodes: Vec<Node>) -> Self {
        normalize_tree(&mut nodes);
        Self { nodes }
    }

    /// Top-level nodes
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Check whether the document has no content
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Serialize with the default overlay style
    #[must_use]
    pub fn to_markup(&self) -> String {
        self.to_markup_with(&OverlayStyle::default())
    }

    /// Serialize with a specific overlay style
    #[must_use]
    pub fn to_markup_with(&self, style: &OverlayStyle) -> String {
        let mut out = String::new();
        write_nodes(&self.nodes, style, &mut out);
        out
    }

    /// Concatenated text content
    #[must_use]
    pub fn plain_text(&self) -> String {
        fn walk(nodes: &[Node], out: &mut String) {
            for node in nodes {
                match node {
                    Node::Element(el) => walk(&el.children, out),
                    inline => out.push_str(inline.inline_text().unwrap_or_default()),
                }
            }
        }
        let mut out = String::new();
        walk(&self.nodes, &mut out);
        out
    }

    /// Inline runs in document order
    #[must_use]
    pub fn inline_runs(&self) -> Vec<InlineRun> {
        fn walk(nodes: &[Node], path: &mut Vec<usize>, runs: &mut Vec<InlineRun>) {
            let mut current: Option<InlineRun> = None;
            for (i, node) in nodes.iter().enumerate() {
                match node {
                    Node::Element(el) => {
                        runs.extend(current.take());
                        path.push(i);
                        walk(&el.children, path, runs);
                        path.pop();
                    }
                    inline => {
                        let text = inline.inline_text().unwrap_or_default();
                        let run = current.get_or_insert_with(|| InlineRun {
                            container: path.clone(),
                            start: i,
                            len: 0,
                            text: String::new(),
                        });
                        run.len += 1;
                        run.text.push_str(text);
                    }
                }
            }
            runs.extend(current);
        }

        let mut runs = Vec::new();
        walk(&self.nodes, &mut Vec::new(), &mut runs);
        runs
    }

    /// All decorations in document order
    #[must_use]
    pub fn decorations(&self) -> Vec<&Decorated> {
        fn walk<'a>(nodes: &'a [Node], out: &mut Vec<&'a Decorated>) {
            for node in nodes {
                match node {
                    Node::Element(el) => walk(&el.children, out),
                    Node::Decorated(d) => out.push(d),
                    Node::Text(_) => {}
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, &mut out);
        out
    }

    /// Count decorations of a kind
    #[must_use]
    pub fn count_decorations(&self, kind: DecorationKind) -> usize {
        self.decorations().iter().filter(|d| d.kind() == kind).count()
    }

    /// Locate the first decoration of `kind` owned by `issue`
    #[must_use]
    pub fn find_decoration(&self, kind: DecorationKind, issue: &str) -> Option<Span> {
        for run in self.inline_runs() {
            let Some(nodes) = self.children(&run.container) else {
                continue;
            };
            let mut offset = 0;
            for node in &nodes[run.start..run.start + run.len] {
                let len = node.inline_text().map_or(0, str::len);
                if let Node::Decorated(d) = node {
                    if d.kind() == kind && d.decoration.belongs_to(issue) {
                        return run.span(offset..offset + len);
                    }
                }
                offset += len;
            }
        }
        None
    }

    /// Wrap the span's text in a decoration
    ///
    /// Decorations partially covered by the span are split; the parts outside
    /// the span keep their decoration.
    ///
    /// # Errors
    /// Returns error if the span is invalid or stale.
    pub fn wrap_span(&mut self, span: &Span, decoration: Decoration) -> Result<(), DocumentError> {
        let text = span.text.clone();
        self.splice(span, Node::Decorated(Decorated::new(decoration, text)))
    }

    /// Replace the span's text, optionally decorating the replacement
    ///
    /// # Errors
    /// Returns error if the span is invalid or stale.
    pub fn replace_span(
        &mut self,
        span: &Span,
        replacement: &str,
        decoration: Option<Decoration>,
    ) -> Result<(), DocumentError> {
        let node = match decoration {
            Some(decoration) => Node::Decorated(Decorated::new(decoration, replacement)),
            None => Node::text(replacement),
        };
        self.splice(span, node)
    }

    /// Strip decorations of the given kinds down to their text
    ///
    /// Returns the number of decorations removed. Calling it again with the
    /// same kinds removes nothing.
    pub fn strip_decorations(&mut self, kinds: &[DecorationKind]) -> usize {
        fn walk(nodes: &mut Vec<Node>, kinds: &[DecorationKind]) -> usize {
            let mut stripped = 0;
            for node in nodes.iter_mut() {
                match node {
                    Node::Element(el) => stripped += walk(&mut el.children, kinds),
                    Node::Decorated(d) if kinds.contains(&d.kind()) => {
                        *node = Node::Text(std::mem::take(&mut d.text));
                        stripped += 1;
                    }
                    _ => {}
                }
            }
            if stripped > 0 {
                normalize(nodes);
            }
            stripped
        }
        walk(&mut self.nodes, kinds)
    }

    /// Strip every overlay decoration
    pub fn strip_overlays(&mut self) -> usize {
        self.strip_decorations(&DecorationKind::ALL)
    }

    fn children(&self, path: &[usize]) -> Option<&Vec<Node>> {
        let mut nodes = &self.nodes;
        for &i in path {
            match nodes.get(i)? {
                Node::Element(el) => nodes = &el.children,
                _ => return None,
            }
        }
        Some(nodes)
    }

    fn children_mut(&mut self, path: &[usize]) -> Option<&mut Vec<Node>> {
        let mut nodes = &mut self.nodes;
        for &i in path {
            match nodes.get_mut(i)? {
                Node::Element(el) => nodes = &mut el.children,
                _ => return None,
            }
        }
        Some(nodes)
    }

    /// Replace the span's bytes in its run with `node`
    fn splice(&mut self, span: &Span, node: Node) -> Result<(), DocumentError> {
        let nodes = self
            .children_mut(&span.container)
            .ok_or_else(|| DocumentError::InvalidSpan(format!("no container at {:?}", span.container)))?;

        if !nodes.get(span.run_start).is_some_and(Node::is_inline) {
            return Err(DocumentError::InvalidSpan(format!(
                "no inline node at index {}",
                span.run_start
            )));
        }
        let run_end = nodes[span.run_start..]
            .iter()
            .position(|n| !n.is_inline())
            .map_or(nodes.len(), |p| span.run_start + p);

        let run_text: String = nodes[span.run_start..run_end]
            .iter()
            .filter_map(Node::inline_text)
            .collect();
        let actual = run_text
            .get(span.range.clone())
            .ok_or_else(|| DocumentError::InvalidSpan(format!("range {:?} out of run", span.range)))?;
        if actual != span.text {
            return Err(DocumentError::StaleSpan {
                expected: span.text.clone(),
                actual: actual.to_string(),
            });
        }

        let run: Vec<Node> = nodes.drain(span.run_start..run_end).collect();
        let mut rebuilt = Vec::with_capacity(run.len() + 2);
        rebuilt.extend(clip(&run, 0..span.range.start));
        rebuilt.push(node);
        rebuilt.extend(clip(&run, span.range.end..run_text.len()));
        normalize(&mut rebuilt);

        let tail = nodes.split_off(span.run_start);
        nodes.extend(rebuilt);
        nodes.extend(tail);
        normalize(nodes);
        Ok(())
    }
}

/// Pieces of a run's nodes that fall inside `window` (run-text byte offsets)
fn clip(run: &[Node], window: Range<usize>) -> Vec<Node> {
    let mut out = Vec::new();
    let mut offset = 0;
    for node in run {
        let text = node.inline_text().unwrap_or_default();
        let (start, end) = (offset, offset + text.len());
        offset = end;

        let lo = start.max(window.start);
        let hi = end.min(window.end);
        if lo >= hi {
            continue;
        }
        let piece = text[lo - start..hi - start].to_string();
        out.push(match node {
            Node::Decorated(d) => Node::Decorated(Decorated::new(d.decoration.clone(), piece)),
            _ => Node::Text(piece),
        });
    }
    out
}

fn normalize_tree(nodes: &mut Vec<Node>) {
    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            normalize_tree(&mut el.children);
        }
    }
    normalize(nodes);
}

impl FromStr for Document {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Element;
    use pretty_assertions::assert_eq;

    fn style() -> OverlayStyle {
        OverlayStyle::bare()
    }

    fn span_of(doc: &Document, needle: &str) -> Span {
        doc.inline_runs()
            .iter()
            .find_map(|run| run.text().find(needle).and_then(|at| run.span(at..at + needle.len())))
            .expect("needle present")
    }

    #[test]
    fn inline_runs_follow_document_order() {
        let doc = Document::parse("<p>one <b>two</b> three</p><p>four</p>").unwrap();
        let texts: Vec<_> = doc.inline_runs().iter().map(|r| r.text().to_string()).collect();
        assert_eq!(texts, vec!["one ", "two", " three", "four"]);
    }

    #[test]
    fn decorations_are_transparent_to_run_text() {
        let doc = Document::parse(
            r#"<p>keep <span class="suggestion-applied" data-issue-id="1">this</span> text</p>"#,
        )
        .unwrap();
        let runs = doc.inline_runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].text(), "keep this text");
        assert_eq!(runs[0].node_count(), 3);
    }

    #[test]
    fn wrap_span_inside_text() {
        let mut doc = Document::parse("<p>the key points</p>").unwrap();
        let span = span_of(&doc, "key");
        doc.wrap_span(&span, Decoration::new(DecorationKind::Applied).with_issue("1"))
            .unwrap();
        assert_eq!(
            doc.to_markup_with(&style()),
            r#"<p>the <span class="suggestion-applied" data-issue-id="1">key</span> points</p>"#
        );
    }

    #[test]
    fn wrap_span_splits_partially_covered_decoration() {
        let mut doc = Document::parse(
            r#"<p><span class="suggestion-applied" data-issue-id="a">alpha beta</span> gamma</p>"#,
        )
        .unwrap();
        let span = span_of(&doc, "beta gam");
        doc.wrap_span(&span, Decoration::new(DecorationKind::Highlight).with_issue("b"))
            .unwrap();
        assert_eq!(
            doc.to_markup_with(&style()),
            concat!(
                r#"<p><span class="suggestion-applied" data-issue-id="a">alpha </span>"#,
                r#"<span class="issue-highlight" data-issue-id="b">beta gam</span>ma</p>"#
            )
        );
    }

    #[test]
    fn replace_span_with_decorated_text() {
        let mut doc = Document::parse("<p>weak claim here</p>").unwrap();
        let span = span_of(&doc, "weak claim");
        doc.replace_span(
            &span,
            "supported claim",
            Some(Decoration::new(DecorationKind::Applying).with_issue("9")),
        )
        .unwrap();
        assert_eq!(
            doc.to_markup_with(&style()),
            r#"<p><span class="suggestion-applying" data-issue-id="9">supported claim</span> here</p>"#
        );
        assert!(doc.find_decoration(DecorationKind::Applying, "9").is_some());
        assert!(doc.find_decoration(DecorationKind::Applying, "8").is_none());
    }

    #[test]
    fn stale_span_is_rejected() {
        let mut doc = Document::parse("<p>abc</p>").unwrap();
        let mut span = span_of(&doc, "b");
        span.text = "x".into();
        assert!(matches!(
            doc.replace_span(&span, "y", None),
            Err(DocumentError::StaleSpan { .. })
        ));
        assert_eq!(doc.to_markup(), "<p>abc</p>");
    }

    #[test]
    fn invalid_span_is_rejected() {
        let mut doc = Document::parse("<p>abc</p>").unwrap();
        let span = Span {
            container: vec![3],
            run_start: 0,
            range: 0..1,
            text: "a".into(),
        };
        assert!(matches!(
            doc.wrap_span(&span, Decoration::new(DecorationKind::Applied)),
            Err(DocumentError::InvalidSpan(_))
        ));
    }

    #[test]
    fn strip_is_structural_and_idempotent() {
        let mut doc = Document::parse(concat!(
            r#"<p>a <span class="suggestion-applied">b</span>"#,
            r#"<span class='suggestion-applying'>c</span> d</p>"#
        ))
        .unwrap();
        assert_eq!(doc.strip_overlays(), 2);
        assert_eq!(doc.to_markup(), "<p>a bc d</p>");
        assert_eq!(doc.nodes().len(), 1);
        assert_eq!(doc.strip_overlays(), 0);
        assert_eq!(doc.to_markup(), "<p>a bc d</p>");
    }

    #[test]
    fn strip_only_selected_kinds() {
        let mut doc = Document::parse(concat!(
            r#"<span class="issue-highlight" data-issue-id="h">x</span>"#,
            r#"<span class="suggestion-applied">y</span>"#
        ))
        .unwrap();
        doc.strip_decorations(&[DecorationKind::Highlight]);
        assert_eq!(doc.count_decorations(DecorationKind::Highlight), 0);
        assert_eq!(doc.count_decorations(DecorationKind::Applied), 1);
    }

    #[test]
    fn from_nodes_normalizes() {
        let doc = Document::from_nodes(vec![Node::Element(
            Element::new("p")
                .with_child(Node::text("a"))
                .with_child(Node::text("b")),
        )]);
        let Node::Element(p) = &doc.nodes()[0] else {
            panic!("expected element")
        };
        assert_eq!(p.children, vec![Node::text("ab")]);
    }

    #[test]
    fn plain_text_concatenates() {
        let doc = Document::parse("<h1>T</h1><p>x &amp; <em>y</em></p>").unwrap();
        assert_eq!(doc.plain_text(), "Tx & y");
    }
}
