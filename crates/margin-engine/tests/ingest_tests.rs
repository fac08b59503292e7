use margin_engine::{AnalysisReport, EngineError, IngestError, StaticAnalysis};
use margin_issue::{IssueId, IssueKind};
use margin_test_utils::{
    accepted_ids, drain_events, issue, setup_test_engine, SAMPLE_REPORT_DOC, SAMPLE_REPORT_JSON,
};

#[test]
fn test_report_into_issues() {
    let issues = AnalysisReport::from_json(SAMPLE_REPORT_JSON)
        .unwrap()
        .into_issues()
        .unwrap();
    let summary: Vec<_> = issues
        .iter()
        .map(|i| (i.id.as_str(), i.kind.clone(), i.anchor_text.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("contradiction-0", IssueKind::Contradiction, "Prices fell."),
            ("weak_evidence-0", IssueKind::WeakEvidence, "Sales doubled"),
            ("undefined_term-0", IssueKind::UndefinedTerm, "ROI"),
        ]
    );
    assert_eq!(
        issues[0].message,
        "Contradicts: \"Prices rose.\" (confidence 0.88)"
    );
}

#[test]
fn test_malformed_report_is_rejected() {
    assert!(matches!(
        AnalysisReport::from_json("{\"contradictions\": 3}"),
        Err(IngestError::Json(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn test_activate_from_report_and_apply() {
    let (mut engine, mut events) = setup_test_engine(SAMPLE_REPORT_DOC);
    let report = AnalysisReport::from_json(SAMPLE_REPORT_JSON).unwrap();
    assert_eq!(engine.activate_from(&report).await.unwrap(), 0);

    let view = engine.decorated_view().unwrap();
    assert_eq!(view.highlighted.len(), 3);
    assert!(view.skipped.is_empty());

    assert!(matches!(
        engine.select("contradiction-0"),
        Err(EngineError::MalformedIssue { .. })
    ));

    engine.select("weak_evidence-0").unwrap();
    engine.settle().await;
    assert_eq!(
        engine.document().plain_text(),
        "Q3Prices rose. Prices fell.Sales doubled (Q3 report). ROI improved."
    );
    assert_eq!(
        accepted_ids(&drain_events(&mut events)),
        vec![IssueId::new("weak_evidence-0")]
    );
    assert_eq!(engine.registry().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_failed_report_keeps_engine_inactive() {
    let (mut engine, _events) = setup_test_engine(SAMPLE_REPORT_DOC);
    let mut report = AnalysisReport::from_json(SAMPLE_REPORT_JSON).unwrap();
    if let Some(terms) = report.undefined_terms.as_mut() {
        terms.success = false;
    }

    let err = engine.activate_from(&report).await.unwrap_err();
    assert!(matches!(err, EngineError::AnalysisUnavailable(_)));
    assert!(err.is_user_visible());
    assert!(!engine.is_active());
}

#[tokio::test(start_paused = true)]
async fn test_duplicate_ids_are_skipped() {
    let (mut engine, _events) = setup_test_engine(SAMPLE_REPORT_DOC);
    let source = StaticAnalysis::new(vec![
        issue("1", "Sales", "Revenue"),
        issue("1", "ROI", "Return"),
    ]);
    assert_eq!(engine.activate_from(&source).await.unwrap(), 1);
    assert_eq!(engine.registry().get("1").unwrap().anchor_text, "Sales");
}
