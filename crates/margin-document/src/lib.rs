//! Margin Document Model
//!
//! Parsed rich-text documents whose overlay wrappers are first-class nodes.
//!
//! # Core Concepts
//!
//! - [`Document`]: Owned node forest, parsed from and serialized to markup
//! - [`Node`]: Element, text, or [`Decorated`] overlay wrapper
//! - [`DecorationKind`]: Highlight, applying, or applied overlay
//! - [`InlineRun`] / [`Span`]: Addressing text across sibling inline nodes
//! - [`OverlayStyle`]: Class lists written onto overlay wrappers
//!
//! # Example
//!
//! ```rust
//! use margin_document::{Decoration, DecorationKind, Document};
//!
//! let mut doc = Document::parse("<p>the main claim</p>").unwrap();
//! let span = doc.inline_runs()[0].span(4..8).unwrap();
//! doc.wrap_span(&span, Decoration::new(DecorationKind::Applied).with_issue("1"))
//!     .unwrap();
//! assert_eq!(doc.count_decorations(DecorationKind::Applied), 1);
//!
//! doc.strip_overlays();
//! assert_eq!(doc.to_markup(), "<p>the main claim</p>");
//! ```

#![warn(unreachable_pub)]

// Core modules
mod document;
mod error;
mod escape;
mod node;
mod parse;
mod serialize;

// Re-exports
pub use document::{Document, InlineRun, Span};
pub use error::DocumentError;
pub use node::{
    is_void, Attribute, Decorated, Decoration, DecorationKind, Element, Node, VOID_ELEMENTS,
};
pub use parse::TOOLTIP_CLASS;
pub use serialize::OverlayStyle;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use proptest::prelude::*;

    fn word() -> impl Strategy<Value = String> {
        "[a-z]{1,8}"
    }

    fn paragraph() -> impl Strategy<Value = String> {
        prop::collection::vec(word(), 1..8).prop_map(|words| words.join(" "))
    }

    fn markup() -> impl Strategy<Value = String> {
        prop::collection::vec(paragraph(), 1..4).prop_map(|paras| {
            paras
                .iter()
                .map(|p| format!("<p>{p}</p>"))
                .collect::<String>()
        })
    }

    #[test]
    fn rendered_overlays_parse_back() {
        let mut doc = Document::parse("<p>alpha beta gamma</p>").unwrap();
        let span = doc.inline_runs()[0].span(6..10).unwrap();
        doc.wrap_span(
            &span,
            Decoration::new(DecorationKind::Highlight)
                .with_issue("i1")
                .with_label("Logic Gap"),
        )
        .unwrap();

        let markup = doc.to_markup();
        assert!(markup.contains(TOOLTIP_CLASS));

        let reparsed = Document::parse(&markup).unwrap();
        assert_eq!(reparsed, doc);
        assert_eq!(reparsed.plain_text(), "alpha beta gamma");
    }

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }

    proptest! {
        #[test]
        fn serialize_parse_roundtrip(src in markup()) {
            let doc = Document::parse(&src).unwrap();
            prop_assert_eq!(doc.to_markup(), src);
        }

        #[test]
        fn wrap_then_strip_restores_markup(
            src in markup(),
            run_pick in any::<prop::sample::Index>(),
            a in any::<prop::sample::Index>(),
            b in any::<prop::sample::Index>(),
            kind_pick in 0usize..3,
        ) {
            let mut doc = Document::parse(&src).unwrap();
            let runs = doc.inline_runs();
            let run = run_pick.get(&runs);
            let len = run.text().len();
            let (mut lo, mut hi) = (a.index(len + 1), b.index(len + 1));
            if lo > hi {
                std::mem::swap(&mut lo, &mut hi);
            }
            prop_assume!(lo < hi);

            let span = run.span(lo..hi).unwrap();
            let kind = DecorationKind::ALL[kind_pick];
            doc.wrap_span(&span, Decoration::new(kind).with_issue("p")).unwrap();
            prop_assert_eq!(doc.count_decorations(kind), 1);
            prop_assert_eq!(doc.plain_text(), Document::parse(&src).unwrap().plain_text());

            prop_assert_eq!(doc.strip_overlays(), 1);
            prop_assert_eq!(doc.to_markup(), src.clone());
            prop_assert_eq!(doc.strip_overlays(), 0);
            prop_assert_eq!(doc.to_markup(), src);
        }
    }
}
