//! Anchor resolution
//!
//! Maps an issue's anchor text to a [`Span`] of the current document. The
//! search runs over inline runs in document order, with overlay decorations
//! transparent, so anchors never match across element boundaries.

use margin_document::{Document, InlineRun, Span};
use std::fmt::{self, Display, Formatter};
use std::ops::Range;

/// Anchor resolution errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Anchor text does not occur in the document
    #[error("anchor not found: {anchor:?}")]
    NotFound { anchor: String },

    /// Empty anchors never match
    #[error("empty anchor")]
    EmptyAnchor,
}

/// How an anchor was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// Same casing as the anchor
    Exact,
    /// Matched after lowercasing both sides
    CaseInsensitive,
}

impl Display for MatchKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exact => "exact",
            Self::CaseInsensitive => "case-insensitive",
        })
    }
}

/// Resolve an anchor to the leftmost matching span
///
/// Exact matches anywhere in the document win over case-insensitive ones.
/// A case-insensitive match carries the document's own casing in
/// [`Span::text`].
///
/// # Errors
/// Returns [`ResolveError`] if the anchor is empty or does not occur.
pub fn resolve(document: &Document, anchor: &str) -> Result<Span, ResolveError> {
    resolve_match(document, anchor).map(|(span, _)| span)
}

/// Like [`resolve`], also reporting how the anchor matched
///
/// # Errors
/// Returns [`ResolveError`] if the anchor is empty or does not occur.
pub fn resolve_match(document: &Document, anchor: &str) -> Result<(Span, MatchKind), ResolveError> {
    if anchor.is_empty() {
        return Err(ResolveError::EmptyAnchor);
    }
    let runs = document.inline_runs();

    if let Some(span) = first_match(&runs, |text| {
        text.find(anchor).map(|at| at..at + anchor.len())
    }) {
        return Ok((span, MatchKind::Exact));
    }

    if let Some(span) = first_match(&runs, |text| find_ignore_case(text, anchor)) {
        tracing::debug!(anchor, found = %span.text, "anchor matched ignoring case");
        return Ok((span, MatchKind::CaseInsensitive));
    }

    Err(ResolveError::NotFound {
        anchor: anchor.to_string(),
    })
}

fn first_match(
    runs: &[InlineRun],
    find: impl Fn(&str) -> Option<Range<usize>>,
) -> Option<Span> {
    runs.iter()
        .find_map(|run| find(run.text()).and_then(|range| run.span(range)))
}

/// Leftmost case-insensitive occurrence of `needle`, as a byte range of
/// `haystack`
///
/// Case folding is per character, so a match always starts and ends on
/// character boundaries of the original text.
fn find_ignore_case(haystack: &str, needle: &str) -> Option<Range<usize>> {
    let needle: String = needle.chars().flat_map(char::to_lowercase).collect();
    if needle.is_empty() {
        return None;
    }

    let mut folded = String::with_capacity(haystack.len());
    // (folded offset, original offset) at every original char boundary
    let mut bounds = Vec::with_capacity(haystack.len() + 1);
    for (at, c) in haystack.char_indices() {
        bounds.push((folded.len(), at));
        folded.extend(c.to_lowercase());
    }
    bounds.push((folded.len(), haystack.len()));

    let original = |folded_at: usize| {
        bounds
            .binary_search_by_key(&folded_at, |&(f, _)| f)
            .ok()
            .map(|i| bounds[i].1)
    };

    let mut from = 0;
    while let Some(found) = folded[from..].find(&needle) {
        let start = from + found;
        if let (Some(s), Some(e)) = (original(start), original(start + needle.len())) {
            return Some(s..e);
        }
        from = start + folded[start..].chars().next().map_or(1, char::len_utf8);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use margin_document::{Decoration, DecorationKind};

    fn doc(markup: &str) -> Document {
        Document::parse(markup).unwrap()
    }

    #[test]
    fn exact_match_in_first_run() {
        let d = doc("<p>the system has identified key points</p>");
        let span = resolve(&d, "identified key points").unwrap();
        assert_eq!(span.text, "identified key points");
        assert_eq!(span.range, 15..36);
    }

    #[test]
    fn exact_match_beats_earlier_case_insensitive_one() {
        let d = doc("<p>Evidence first</p><p>then evidence</p>");
        let (span, kind) = resolve_match(&d, "evidence").unwrap();
        assert_eq!(kind, MatchKind::Exact);
        assert_eq!(span.container, vec![1]);
    }

    #[test]
    fn case_insensitive_keeps_document_casing() {
        let d = doc("<p>The Key Points are here</p>");
        let (span, kind) = resolve_match(&d, "key points").unwrap();
        assert_eq!(kind, MatchKind::CaseInsensitive);
        assert_eq!(span.text, "Key Points");
    }

    #[test]
    fn case_folding_changes_byte_lengths() {
        // 'İ' lowercases to two chars
        assert_eq!(find_ignore_case("xİy", "i\u{307}y"), Some(1..4));
        assert_eq!(find_ignore_case("ÄBC", "äb"), Some(0..3));
        assert_eq!(find_ignore_case("abc", "d"), None);
    }

    #[test]
    fn leftmost_occurrence_wins() {
        let d = doc("<p>evidence and more evidence</p>");
        let span = resolve(&d, "evidence").unwrap();
        assert_eq!(span.range, 0..8);
    }

    #[test]
    fn decorations_are_transparent() {
        let mut d = doc("<p>alpha beta gamma</p>");
        let span = resolve(&d, "beta").unwrap();
        d.wrap_span(&span, Decoration::new(DecorationKind::Applied)).unwrap();
        let again = resolve(&d, "alpha beta").unwrap();
        assert_eq!(again.text, "alpha beta");
    }

    #[test]
    fn no_match_across_elements() {
        let d = doc("<p>key <strong>points</strong></p>");
        assert_eq!(
            resolve(&d, "key points"),
            Err(ResolveError::NotFound {
                anchor: "key points".into()
            })
        );
    }

    #[test]
    fn empty_anchor_is_rejected() {
        assert_eq!(resolve(&doc("<p>x</p>"), ""), Err(ResolveError::EmptyAnchor));
    }

    #[test]
    fn entities_are_decoded_before_matching() {
        let d = doc("<p>R&amp;D spending</p>");
        assert_eq!(resolve(&d, "R&D").unwrap().text, "R&D");
    }
}
