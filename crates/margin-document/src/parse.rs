//! Markup parser
//!
//! A small, strict scanner for the serialized markup produced by the rich-text
//! editor. Overlay wrappers (`<span class="... suggestion-applied ...">`) are
//! recognised by their marker class regardless of how the attribute is
//! quoted and turned into [`Node::Decorated`].

use crate::error::DocumentError;
use crate::escape::decode;
use crate::node::{is_void, Attribute, Decorated, Decoration, DecorationKind, Element, Node};

/// Class token of the hover tooltip nested inside rendered highlights
pub const TOOLTIP_CLASS: &str = "issue-tooltip";

/// Parse markup into a normalized node forest
///
/// # Errors
/// Returns [`DocumentError`] for unterminated tags, mismatched closing tags,
/// or elements left open at end of input.
pub(crate) fn parse(input: &str) -> Result<Vec<Node>, DocumentError> {
    Parser::new(input).run()
}

struct Frame {
    element: Element,
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    root: Vec<Node>,
    stack: Vec<Frame>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            root: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn run(mut self) -> Result<Vec<Node>, DocumentError> {
        while self.pos < self.input.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                let end = rest
                    .find("-->")
                    .ok_or(DocumentError::UnterminatedTag { offset: self.pos })?;
                self.pos += end + 3;
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                let end = rest
                    .find('>')
                    .ok_or(DocumentError::UnterminatedTag { offset: self.pos })?;
                self.pos += end + 1;
            } else if rest.starts_with("</") {
                self.closing_tag()?;
            } else if rest.starts_with('<')
                && rest[1..].starts_with(|c: char| c.is_ascii_alphabetic())
            {
                self.start_tag()?;
            } else {
                self.text();
            }
        }

        if let Some(frame) = self.stack.pop() {
            return Err(DocumentError::UnclosedElement {
                tag: frame.element.tag,
            });
        }

        crate::node::normalize(&mut self.root);
        Ok(self.root)
    }

    fn text(&mut self) {
        let rest = self.rest();
        // A lone '<' that does not open a tag is literal text.
        let skip = usize::from(rest.starts_with('<'));
        let len = rest[skip..].find('<').map_or(rest.len(), |i| i + skip);
        let text = decode(&rest[..len]);
        self.pos += len;
        self.push(Node::Text(text));
    }

    fn push(&mut self, node: Node) {
        let children = match self.stack.last_mut() {
            Some(frame) => &mut frame.element.children,
            None => &mut self.root,
        };
        match (children.last_mut(), node) {
            (Some(Node::Text(prev)), Node::Text(text)) => prev.push_str(&text),
            (_, node) => children.push(node),
        }
    }

    fn closing_tag(&mut self) -> Result<(), DocumentError> {
        let offset = self.pos;
        let rest = self.rest();
        let end = rest
            .find('>')
            .ok_or(DocumentError::UnterminatedTag { offset })?;
        let tag = rest[2..end].trim().to_ascii_lowercase();
        self.pos += end + 1;

        // Stray closers for void elements (`</br>`) are ignored.
        if is_void(&tag) {
            return Ok(());
        }

        match self.stack.pop() {
            Some(frame) if frame.element.tag == tag => {
                let node = finish_element(frame.element);
                self.push(node);
                Ok(())
            }
            Some(frame) => {
                self.stack.push(frame);
                Err(DocumentError::UnexpectedClosingTag { tag, offset })
            }
            None => Err(DocumentError::UnexpectedClosingTag { tag, offset }),
        }
    }

    fn start_tag(&mut self) -> Result<(), DocumentError> {
        let offset = self.pos;
        let bytes = self.input.as_bytes();
        let mut i = self.pos + 1;

        let name_start = i;
        while i < bytes.len() && is_name_byte(bytes[i]) {
            i += 1;
        }
        if i == name_start {
            return Err(DocumentError::InvalidTagName { offset });
        }
        let mut element = Element::new(&self.input[name_start..i]);

        let mut self_closing = false;
        loop {
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match bytes.get(i) {
                None => return Err(DocumentError::UnterminatedTag { offset }),
                Some(b'>') => {
                    i += 1;
                    break;
                }
                Some(b'/') if bytes.get(i + 1) == Some(&b'>') => {
                    self_closing = true;
                    i += 2;
                    break;
                }
                Some(b'/') => i += 1,
                Some(_) => {
                    let (attr, next) = self.attribute(i, offset)?;
                    element.attrs.push(attr);
                    i = next;
                }
            }
        }
        self.pos = i;

        if self_closing || element.is_void() {
            self.push(finish_element(element));
        } else {
            self.stack.push(Frame { element });
        }
        Ok(())
    }

    fn attribute(&self, start: usize, offset: usize) -> Result<(Attribute, usize), DocumentError> {
        let bytes = self.input.as_bytes();
        let mut i = start;
        while i < bytes.len() && !matches!(bytes[i], b'=' | b'>' | b'/') && !bytes[i].is_ascii_whitespace()
        {
            i += 1;
        }
        let name = self.input[start..i].to_string();

        let mut j = i;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if bytes.get(j) != Some(&b'=') {
            return Ok((Attribute { name, value: None }, i));
        }
        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }

        let (raw, next) = match bytes.get(j) {
            None => return Err(DocumentError::UnterminatedTag { offset }),
            Some(&quote @ (b'"' | b'\'')) => {
                let close = self.input[j + 1..]
                    .find(char::from(quote))
                    .ok_or(DocumentError::UnterminatedTag { offset })?;
                (&self.input[j + 1..j + 1 + close], j + close + 2)
            }
            Some(_) => {
                let mut k = j;
                while k < bytes.len() && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                    k += 1;
                }
                (&self.input[j..k], k)
            }
        };

        Ok((
            Attribute {
                name,
                value: Some(decode(raw)),
            },
            next,
        ))
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':')
}

/// Turn a closed element into its final node, converting overlay wrappers
fn finish_element(element: Element) -> Node {
    if element.tag != "span" {
        return Node::Element(element);
    }
    let Some(kind) = element.attr("class").and_then(DecorationKind::from_classes) else {
        return Node::Element(element);
    };

    let mut decoration = Decoration::new(kind);
    decoration.issue = element.attr("data-issue-id").map(str::to_string);
    decoration.label = element.attr("data-issue-type").map(str::to_string);

    let mut text = String::new();
    flatten_text(&element.children, &mut text);
    Node::Decorated(Decorated::new(decoration, text))
}

fn flatten_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Decorated(d) => out.push_str(&d.text),
            Node::Element(el) if el.has_class(TOOLTIP_CLASS) => {}
            Node::Element(el) => flatten_text(&el.children, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deco(nodes: &[Node], i: usize) -> &Decorated {
        match &nodes[i] {
            Node::Decorated(d) => d,
            other => panic!("expected decoration, got {other:?}"),
        }
    }

    #[test]
    fn parses_nested_elements() {
        let nodes = parse("<p>Hello <strong>big</strong> world</p>").unwrap();
        assert_eq!(nodes.len(), 1);
        let Node::Element(p) = &nodes[0] else {
            panic!("expected element")
        };
        assert_eq!(p.tag, "p");
        assert_eq!(p.children.len(), 3);
        assert_eq!(p.children[0], Node::text("Hello "));
    }

    #[test]
    fn recognises_overlays_in_any_quoting_style() {
        let nodes = parse(concat!(
            r#"<span class="bg suggestion-applied" data-issue-id="1">a</span>"#,
            r#"<span class='suggestion-applying' data-issue-id='2'>b</span>"#,
            r#"<span class=suggestion-applied>c</span>"#,
        ))
        .unwrap();
        assert_eq!(deco(&nodes, 0).kind(), DecorationKind::Applied);
        assert_eq!(deco(&nodes, 0).decoration.issue.as_deref(), Some("1"));
        assert_eq!(deco(&nodes, 1).kind(), DecorationKind::Applying);
        assert_eq!(deco(&nodes, 1).text, "b");
        assert_eq!(deco(&nodes, 2).kind(), DecorationKind::Applied);
        assert_eq!(deco(&nodes, 2).decoration.issue, None);
    }

    #[test]
    fn highlight_tooltip_is_not_text() {
        let nodes = parse(concat!(
            r#"<span class="issue-highlight" data-issue-id="7" data-issue-type="Logic Gap">gap"#,
            r#"<span class="issue-tooltip">Logic Gap</span></span>"#,
        ))
        .unwrap();
        let d = deco(&nodes, 0);
        assert_eq!(d.text, "gap");
        assert_eq!(d.decoration.label.as_deref(), Some("Logic Gap"));
    }

    #[test]
    fn overlay_inner_markup_is_flattened() {
        let nodes = parse(r#"<span class="suggestion-applied">x <em>y</em></span>"#).unwrap();
        assert_eq!(deco(&nodes, 0).text, "x y");
    }

    #[test]
    fn void_and_self_closing_elements() {
        let nodes = parse("<p>a<br>b<img src=x.png/></p>").unwrap();
        let Node::Element(p) = &nodes[0] else {
            panic!("expected element")
        };
        assert_eq!(p.children.len(), 4);
    }

    #[test]
    fn comments_and_doctype_are_skipped() {
        let nodes = parse("<!DOCTYPE html><!-- note --><p>x</p>").unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[test]
    fn lone_angle_bracket_is_text() {
        let nodes = parse("<p>a < b</p>").unwrap();
        let Node::Element(p) = &nodes[0] else {
            panic!("expected element")
        };
        assert_eq!(p.children, vec![Node::text("a < b")]);
    }

    #[test]
    fn mismatched_closing_tag_fails() {
        let err = parse("<p><em>x</p>").unwrap_err();
        assert!(matches!(err, DocumentError::UnexpectedClosingTag { ref tag, .. } if tag == "p"));
    }

    #[test]
    fn unclosed_element_fails() {
        let err = parse("<p>open").unwrap_err();
        assert_eq!(err, DocumentError::UnclosedElement { tag: "p".into() });
    }

    #[test]
    fn unterminated_tag_fails() {
        assert!(matches!(
            parse("<p class=\"x>").unwrap_err(),
            DocumentError::UnterminatedTag { .. }
        ));
        assert!(matches!(
            parse("<p").unwrap_err(),
            DocumentError::UnterminatedTag { .. }
        ));
    }
}
