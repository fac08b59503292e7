//! Margin Issues
//!
//! Critiques reported by an analysis pass and the registry that tracks them.
//!
//! # Overview
//!
//! - **Issue**: anchor text, category, message and optional suggestion
//! - **IssueKind**: closed category set with an `Other` fallback
//! - **IssueRegistry**: ordered, id-unique store with lifecycle states
//!
//! # Example
//!
//! ```rust
//! use margin_issue::{Issue, IssueKind, IssueRegistry, IssueState};
//!
//! let mut registry = IssueRegistry::new();
//! registry
//!     .insert(Issue::new("1", IssueKind::Gap, "therefore").with_suggestion("so"))
//!     .unwrap();
//!
//! registry.transition("1", IssueState::Animating).unwrap();
//! let applied = registry.complete("1").unwrap();
//! assert_eq!(applied.kind.label(), "Logic Gap");
//! assert!(registry.is_empty());
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod issue;
pub mod registry;

// Re-exports
pub use error::{RegistryError, WireError};
pub use issue::{Issue, IssueId, IssueKind, IssueWire};
pub use registry::{allowed_transitions, validate_transition, IssueRegistry, IssueState};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for issue handling
    pub use crate::{Issue, IssueId, IssueKind, IssueRegistry, IssueState, RegistryError};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
