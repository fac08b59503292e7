//! Testing utilities for the Margin workspace
//!
//! Shared fixtures, engine setup and assertions.

#![allow(missing_docs)]

use margin_document::{Document, OverlayStyle};
use margin_engine::{Engine, EngineConfig, EngineEvent};
use margin_issue::{Issue, IssueId, IssueKind};
use tokio::sync::mpsc;

/// Single paragraph with one anchor
pub const KEY_POINTS_DOC: &str = "<p>the system has identified key points</p>";

/// Paragraph where "evidence" occurs twice
pub const EVIDENCE_DOC: &str =
    "<p>The evidence is thin and the evidence base is small.</p>";

/// Analysis report with one entry per section
pub const SAMPLE_REPORT_JSON: &str = r#"{
    "contradictions": {
        "success": true,
        "mode": "finetuned",
        "text": "Prices rose. Prices fell.",
        "total_sentences": 2,
        "sentences": ["Prices rose.", "Prices fell."],
        "total_contradictions": 1,
        "contradictions": [
            {"id": 0, "sentence1": "Prices rose.", "sentence2": "Prices fell.", "confidence": 0.88}
        ],
        "metadata": {"model": "nli"}
    },
    "unsupported_claims": {
        "success": true,
        "content": "Sales doubled.",
        "context": {},
        "total_claims_found": 1,
        "total_unsupported": 1,
        "unsupported_claims": [
            {
                "claim": "Sales doubled",
                "status": "unsupported",
                "reason": "No source is given",
                "suggestion": "Sales doubled (Q3 report)"
            }
        ],
        "metadata": {}
    },
    "undefined_terms": {
        "success": true,
        "content": "ROI",
        "context": {},
        "total_terms_found": 1,
        "total_undefined": 1,
        "undefined_terms": [{"term": "ROI", "reason": "Acronym never expanded"}],
        "metadata": {}
    }
}"#;

/// Document matching [`SAMPLE_REPORT_JSON`]
pub const SAMPLE_REPORT_DOC: &str =
    "<h1>Q3</h1><p>Prices rose. Prices fell.</p><p>Sales doubled. ROI improved.</p>";

pub fn issue(id: &str, anchor: &str, suggestion: &str) -> Issue {
    Issue::new(id, IssueKind::WeakEvidence, anchor).with_suggestion(suggestion)
}

pub fn key_points_issue() -> Issue {
    Issue::new("1", IssueKind::Clarity, "identified key points")
        .with_message("Be specific")
        .with_suggestion("the system has identified consistent points")
}

/// Config whose overlays carry only marker classes
pub fn bare_config() -> EngineConfig {
    EngineConfig::new().with_style(OverlayStyle::bare())
}

pub fn setup_test_engine(content: &str) -> (Engine, mpsc::UnboundedReceiver<EngineEvent>) {
    let mut engine = Engine::with_content(bare_config(), content).unwrap();
    let events = engine.subscribe();
    (engine, events)
}

pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<EngineEvent>) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn accepted_ids(events: &[EngineEvent]) -> Vec<IssueId> {
    events
        .iter()
        .filter_map(EngineEvent::accepted)
        .cloned()
        .collect()
}

/// Assert that `content` parses and carries no overlay markup
pub fn assert_no_overlays(content: &str) {
    let doc = Document::parse(content).unwrap();
    assert!(
        doc.decorations().is_empty(),
        "overlay markup left in content: {content}"
    );
}
