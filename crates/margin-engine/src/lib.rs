//! Margin Engine
//!
//! The critique overlay engine:
//! - Enters and leaves analysis mode, keeping the persisted content free of
//!   overlay markup once analysis is off
//! - Applies suggestions in two timed phases (applying, then applied)
//! - Emits content changes and suggestion acceptances to observers
//! - Ingests analysis service responses into issues
//!
//! # Example
//!
//! ```rust
//! use margin_engine::{Engine, EngineConfig};
//! use margin_issue::{Issue, IssueKind};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = Engine::with_content(EngineConfig::new(), "<p>sales doubled</p>")?;
//! let mut events = engine.subscribe();
//!
//! engine.activate(vec![Issue::new("1", IssueKind::WeakEvidence, "sales doubled")
//!     .with_suggestion("sales doubled (Q3 report)")]);
//! engine.select("1")?;
//! let accepted = engine.settle().await;
//! assert_eq!(accepted.len(), 1);
//!
//! engine.deactivate();
//! assert_eq!(engine.content(), "<p>sales doubled (Q3 report)</p>");
//! # let _ = events.try_recv();
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod analysis;
pub mod applicator;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod ingest;
pub mod mode;
pub mod scheduler;

// Re-exports for convenience
pub use analysis::{AnalysisSource, StaticAnalysis};
pub use applicator::CommitOutcome;
pub use config::EngineConfig;
pub use engine::{Engine, SessionStats};
pub use error::{AnalysisError, ConfigError, EngineError, IngestError};
pub use events::{EngineEvent, EngineObserver};
pub use ingest::{
    AnalysisReport, ContradictionCheckResponse, UndefinedTermsResponse, UnsupportedClaimsResponse,
};
pub use mode::{Mode, ModeEvent, Transition};
pub use scheduler::DeferredTasks;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the engine
    pub use crate::{
        AnalysisReport, AnalysisSource, Engine, EngineConfig, EngineError, EngineEvent, Mode,
    };
    pub use margin_issue::{Issue, IssueId, IssueKind};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use margin_document::{Decoration, DecorationKind, Document};
    use margin_issue::{Issue, IssueId, IssueKind};
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Paragraphs of words, some wrapped in applying/applied overlays
    fn overlaid_markup() -> impl Strategy<Value = String> {
        let piece = ("[a-z]{1,6}", 0u8..3).prop_map(|(word, kind)| match kind {
            0 => format!("{word} "),
            1 => format!(r#"<span class="suggestion-applying" data-issue-id="a">{word}</span> "#),
            _ => format!(r#"<span class='suggestion-applied bg-green-100'>{word}</span> "#),
        });
        prop::collection::vec(prop::collection::vec(piece, 1..6), 1..4).prop_map(|paras| {
            paras
                .into_iter()
                .map(|p| format!("<p>{}</p>", p.concat()))
                .collect::<String>()
        })
    }

    #[derive(Debug, Clone)]
    enum Op {
        Activate,
        Select(usize),
        Advance(u64),
        Deactivate,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            1 => Just(Op::Activate),
            4 => (0usize..4).prop_map(Op::Select),
            3 => (0u64..1200).prop_map(Op::Advance),
            1 => Just(Op::Deactivate),
        ]
    }

    fn issues() -> Vec<Issue> {
        ["alpha", "beta", "gamma", "alpha"]
            .iter()
            .enumerate()
            .map(|(i, anchor)| {
                Issue::new(format!("i{i}"), IssueKind::Clarity, *anchor)
                    .with_suggestion(format!("{anchor}{i}"))
            })
            .collect()
    }

    proptest! {
        #[test]
        fn deactivating_twice_equals_once(markup in overlaid_markup()) {
            let mut engine = Engine::with_content(EngineConfig::new(), &markup).unwrap();
            engine.deactivate();
            let once = engine.content();
            engine.deactivate();
            prop_assert_eq!(engine.content(), once.clone());

            let doc = Document::parse(&once).unwrap();
            prop_assert_eq!(doc.decorations().len(), 0);
            prop_assert_eq!(doc.plain_text(), Document::parse(&markup).unwrap().plain_text());
        }

        #[test]
        fn acceptance_is_exactly_once(ops in prop::collection::vec(op(), 0..30)) {
            let mut engine =
                Engine::with_content(EngineConfig::new(), "<p>alpha beta gamma alpha</p>").unwrap();
            let mut rx = engine.subscribe();
            let mut now = Instant::now();
            let mut session: HashSet<IssueId> = HashSet::new();
            let mut total = 0usize;

            for op in ops {
                match op {
                    Op::Activate => {
                        session.clear();
                        engine.activate(issues());
                    }
                    Op::Select(i) => {
                        let _ = engine.select_issue(&format!("i{i}"), now);
                    }
                    Op::Advance(ms) => {
                        now += Duration::from_millis(ms);
                        engine.poll(now);
                    }
                    Op::Deactivate => {
                        engine.deactivate();
                        prop_assert!(engine.document().decorations().is_empty());
                        prop_assert_eq!(engine.pending_commits(), 0);
                    }
                }

                while let Ok(event) = rx.try_recv() {
                    if let EngineEvent::SuggestionAccepted(id) = event {
                        prop_assert!(!engine.registry().contains(id.as_str()));
                        prop_assert!(session.insert(id));
                        total += 1;
                    }
                }

                let ids: Vec<_> = engine.registry().iter().map(|i| i.id.clone()).collect();
                let unique: HashSet<_> = ids.iter().collect();
                prop_assert_eq!(unique.len(), ids.len());
            }
            prop_assert_eq!(total, engine.stats().accepted);
        }
    }

    #[test]
    fn applied_markup_roundtrips() {
        let mut doc = Document::parse("<h1>T</h1><p>one <em>two</em> three</p>").unwrap();
        let span = doc.inline_runs()[3].span(1..6).unwrap();
        doc.wrap_span(&span, Decoration::new(DecorationKind::Applied).with_issue("x"))
            .unwrap();
        let markup = doc.to_markup();
        assert_eq!(Document::parse(&markup).unwrap(), doc);
    }
}
