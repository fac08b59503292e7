//! Margin Overlay
//!
//! Locating issue anchors in a document and rendering issue highlights.
//!
//! # Core Concepts
//!
//! - [`resolve`]: Anchor text to the leftmost matching [`Span`], exact case
//!   first, then ignoring case
//! - [`render`]: Display-only markup with a highlight per resolvable issue
//!
//! # Example
//!
//! ```rust
//! use margin_document::Document;
//! use margin_issue::{Issue, IssueKind};
//! use margin_overlay::{render, resolve, RenderOptions};
//!
//! let doc = Document::parse("<p>The results prove it</p>").unwrap();
//! assert_eq!(resolve(&doc, "results prove").unwrap().text, "results prove");
//!
//! let issues = [Issue::new("1", IssueKind::WeakEvidence, "prove")];
//! let view = render(&doc, &issues, &RenderOptions::default());
//! assert_eq!(view.highlighted.len(), 1);
//! ```
//!
//! [`Span`]: margin_document::Span

#![warn(missing_docs)]
#![warn(unreachable_pub)]

// Core modules
mod renderer;
mod resolver;

// Re-exports
pub use renderer::{render, RenderOptions, RenderOrder, RenderedView};
pub use resolver::{resolve, resolve_match, MatchKind, ResolveError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use margin_document::Document;
    use proptest::prelude::*;

    fn words() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-z]{1,6}", 1..10)
    }

    proptest! {
        #[test]
        fn exact_occurrence_resolves_to_itself(
            words in words(),
            pick in any::<prop::sample::Index>(),
            width in 1usize..4,
        ) {
            let start = pick.index(words.len());
            let end = (start + width).min(words.len());
            let anchor = words[start..end].join(" ");
            let text = words.join(" ");
            let doc = Document::parse(&format!("<p>{text}</p>")).unwrap();

            let (span, kind) = resolve_match(&doc, &anchor).unwrap();
            prop_assert_eq!(kind, MatchKind::Exact);
            prop_assert_eq!(&span.text, &anchor);
            prop_assert_eq!(span.range.start, text.find(&anchor).unwrap());
        }

        #[test]
        fn differently_cased_occurrence_keeps_page_casing(
            words in words(),
            pick in any::<prop::sample::Index>(),
        ) {
            let at = pick.index(words.len());
            let mut page = words.clone();
            page[at] = page[at].to_uppercase();
            let anchor = words[at].clone();
            prop_assume!(!page.iter().any(|w| w.contains(&anchor)));

            let doc = Document::parse(&format!("<p>{}</p>", page.join(" "))).unwrap();
            let (span, kind) = resolve_match(&doc, &anchor).unwrap();
            prop_assert_eq!(kind, MatchKind::CaseInsensitive);
            prop_assert_eq!(span.text.to_lowercase(), anchor);
        }

        #[test]
        fn render_never_touches_source(words in words(), anchors in words()) {
            let doc = Document::parse(&format!("<p>{}</p>", words.join(" "))).unwrap();
            let before = doc.to_markup();
            let issues: Vec<_> = anchors
                .iter()
                .enumerate()
                .map(|(i, a)| margin_issue::Issue::new(i.to_string(), margin_issue::IssueKind::Gap, a.as_str()))
                .collect();
            let view = render(&doc, &issues, &RenderOptions::default());
            prop_assert_eq!(doc.to_markup(), before);
            prop_assert_eq!(view.highlighted.len() + view.skipped.len(), issues.len());
            prop_assert!(Document::parse(&view.markup).is_ok());
        }
    }
}
