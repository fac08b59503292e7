//! Error types for document parsing and editing

/// Errors raised by [`crate::Document`] operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// A tag, comment or declaration is missing its terminator
    #[error("unterminated tag at byte {offset}")]
    UnterminatedTag {
        /// Byte offset of the tag start
        offset: usize,
    },

    /// A start tag has no usable name
    #[error("invalid tag name at byte {offset}")]
    InvalidTagName {
        /// Byte offset of the tag start
        offset: usize,
    },

    /// A closing tag does not match the innermost open element
    #[error("unexpected closing tag </{tag}> at byte {offset}")]
    UnexpectedClosingTag {
        /// Name in the closing tag
        tag: String,
        /// Byte offset of the closing tag
        offset: usize,
    },

    /// The input ended with elements still open
    #[error("element <{tag}> is never closed")]
    UnclosedElement {
        /// Name of the innermost open element
        tag: String,
    },

    /// Span does not address an inline run of this document
    #[error("span does not address an inline run: {0}")]
    InvalidSpan(String),

    /// Span text no longer matches the document
    #[error("stale span: expected {expected:?}, found {actual:?}")]
    StaleSpan {
        /// Text recorded in the span
        expected: String,
        /// Text now at the span's range
        actual: String,
    },
}

impl DocumentError {
    /// Errors produced while reading markup (as opposed to editing)
    #[inline]
    #[must_use]
    pub fn is_parse_error(&self) -> bool {
        !matches!(self, Self::InvalidSpan(_) | Self::StaleSpan { .. })
    }
}
