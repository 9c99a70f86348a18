//! End-to-end test: baseline and retrained generation runs are evaluated,
//! compared by the improvement gate and scanned for regressions.

use nolang_feedback_gate::*;
use nolang_feedback_oracle::{BatchValidator, SimulatedOracle, Validator};
use nolang_feedback_store::{read_json, write_json};
use nolang_feedback_types::GenerationEntry;
use serde_json::json;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn batch() -> BatchValidator {
    let oracle = SimulatedOracle::new().with_assembly_error("BOGUS", "unknown opcode BOGUS");
    BatchValidator::new(Validator::new(Arc::new(oracle)))
}

fn entry(key: &str, text: &str) -> GenerationEntry {
    GenerationEntry::new(key, text).with_witnesses(vec![json!({"input": [], "expected": 0})])
}

fn metrics(assembled: f64, verified: f64, witness: f64) -> MetricSet {
    MetricSet {
        assembled_pct: assembled,
        verified_pct: verified,
        witness_pass_pct: witness,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn two_improvements_and_small_drop_pass() {
    let decision =
        ImprovementGate::default().compare(&metrics(80.0, 70.0, 60.0), &metrics(85.0, 69.0, 65.0));
    assert_eq!(decision.improved_count, 2);
    let deltas: Vec<(Metric, f64)> = decision
        .deltas
        .iter()
        .map(|d| (d.metric, d.delta))
        .collect();
    assert_eq!(
        deltas,
        [
            (Metric::AssembledPct, 5.0),
            (Metric::VerifiedPct, -1.0),
            (Metric::WitnessPassPct, 5.0),
        ]
    );
    assert!(decision.majority_improved);
    assert!(decision.no_severe_regression);
    assert!(decision.passed);
}

#[test]
fn large_drop_fails_both_gates() {
    let decision =
        ImprovementGate::default().compare(&metrics(80.0, 70.0, 60.0), &metrics(80.0, 70.0, 55.0));
    assert_eq!(decision.improved_count, 0);
    assert!(!decision.majority_improved);
    assert!(!decision.no_severe_regression);
    assert!(!decision.passed);
    assert!(decision
        .messages
        .iter()
        .any(|m| m.starts_with("REGRESSION: Witness pass dropped 5.0%")));
}

#[tokio::test]
async fn retrained_run_is_gated_and_reported() {
    let batch = batch();
    let baseline = vec![
        entry("negate", "NEG\nHALT"),
        entry("double", "BOGUS\nHALT"),
        entry("square", "BOGUS MUL\nHALT"),
        entry("halt", "HALT"),
    ];
    let improved = vec![
        entry("negate", "NEG\nHALT"),
        entry("double", "DUP\nADD\nHALT"),
        entry("square", "DUP\nMUL\nHALT"),
        entry("halt", "BOGUS\nHALT"),
    ];

    let base_results = batch.validate_entries(&baseline).await;
    let imp_results = batch.validate_entries(&improved).await;
    let base_metrics = evaluate_run(&baseline, &base_results);
    let imp_metrics = evaluate_run(&improved, &imp_results);
    assert_eq!(base_metrics.assembled_pct, 50.0);
    assert_eq!(base_metrics.witness_pass_pct, 50.0);
    assert_eq!(imp_metrics.assembled_pct, 75.0);
    assert_eq!(imp_metrics.verified_pct, 75.0);
    assert_eq!(imp_metrics.witness_pass_pct, 75.0);
    assert_eq!(imp_metrics.error_types["assembly failed"], 1);

    let gate = ImprovementGate::default();
    let decision = gate.compare(&base_metrics, &imp_metrics);
    assert_eq!(decision.improved_count, 3);
    assert!(decision.passed);

    let scan = find_regressions(&baseline, &improved, &batch).await;
    assert_eq!(scan.compared, 4);
    assert_eq!(scan.count(), 1);
    assert_eq!(scan.regressions[0].key, "halt");

    let report = ImprovementReport::new(
        2,
        base_metrics,
        imp_metrics,
        decision,
        Some(scan),
        gate.thresholds().regression_report_cap,
    );
    let rendered = report.render();
    assert!(rendered.iter().any(|l| l == "  Overall: PASS"));
    assert!(rendered.iter().any(|l| l.trim() == "halt"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("metrics/improvement_v2.json");
    write_json(&path, &report).await.unwrap();
    let back: ImprovementReport = read_json(&path).await.unwrap();
    assert_eq!(back, report);
}
