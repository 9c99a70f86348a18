//! End-to-end test: a generation run is validated, its failures classified,
//! merged with human verdicts and turned into corrective examples.

use nolang_feedback_classifier::{aggregate, classify_verdict, failure_from_validation};
use nolang_feedback_dataset::{FeedbackBuilder, ReferenceCorpus, ReferenceRecord};
use nolang_feedback_oracle::{BatchValidator, SimulatedOracle, Validator, WitnessRun};
use nolang_feedback_types::*;
use serde_json::json;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const NEGATE: &str =
    "FUNC 1 4\nPARAM I64\nREF 0\nNEG\nRET\nHASH 0x0000 0x0000 0x0000\nENDFUNC\nCALL 0\nHALT\n";

fn oracle() -> SimulatedOracle {
    SimulatedOracle::new()
        .with_assembly_error("BOGUS", "line 1: unknown opcode BOGUS")
        .with_verify_error("UNBALANCED", "stack underflow at instruction 2")
        .with_witness_run(
            "DUP",
            WitnessRun::failed("witness 0: PASS\nwitness 1: FAIL\n", "1 of 2 witnesses failed"),
        )
}

fn batch(oracle: SimulatedOracle) -> BatchValidator {
    BatchValidator::new(Validator::new(Arc::new(oracle))).with_max_workers(3)
}

fn generation_run() -> Vec<GenerationEntry> {
    vec![
        GenerationEntry::new("negate a number", NEGATE),
        GenerationEntry::new("add one", "BOGUS 1\nHALT\n"),
        GenerationEntry::new("pop twice", "UNBALANCED\nHALT\n"),
        GenerationEntry::new("square a number", "DUP\nMUL\nHALT\n")
            .with_witnesses(vec![json!({"input": [3], "expected": 9}), json!({"input": [4], "expected": 16})]),
        GenerationEntry::new("halt", "HALT\n"),
    ]
}

fn corpus() -> ReferenceCorpus {
    [
        ReferenceRecord::new("add one", "CONST I64 0x0000 0x0001\nADD\nHALT"),
        ReferenceRecord::new("pop twice", "POP\nPOP\nHALT"),
        ReferenceRecord::new("square a number", "DUP\nMUL\nHALT"),
        ReferenceRecord::new("double a number", "DUP\nADD\nHALT"),
    ]
    .into_iter()
    .collect()
}

async fn harvest(batch: &BatchValidator, run: &[GenerationEntry]) -> Vec<FailureRecord> {
    let results = batch.validate_entries(run).await;
    run.iter()
        .zip(&results)
        .filter_map(|(entry, result)| failure_from_validation(entry, result, "2025-06-01T12:00:00"))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn single_slot_program_patches_and_validates() {
    let validator = Validator::new(Arc::new(SimulatedOracle::new()));
    let result = validator.validate(NEGATE, None).await;

    assert!(result.hash_patched());
    assert!(result.fully_valid());
    assert!(result.warnings().is_empty());
    assert!(!result.final_text().contains("HASH 0x0000 0x0000 0x0000"));
    assert_eq!(result.final_text().matches("HASH 0x").count(), 1);
}

#[tokio::test]
async fn generation_failures_land_on_their_layers() {
    let failures = harvest(&batch(oracle()), &generation_run()).await;

    let layers: Vec<(&str, FailureLayer)> = failures
        .iter()
        .map(|f| (f.key.as_str(), f.layer()))
        .collect();
    assert_eq!(
        layers,
        vec![
            ("add one", FailureLayer::Syntax),
            ("pop twice", FailureLayer::Verification),
            ("square a number", FailureLayer::Witness),
        ]
    );
    assert!(failures
        .iter()
        .all(|f| f.source == FailureSource::Eval && !f.error_message.is_empty()));
    assert!(failures[0].error_message.starts_with("assembly failed:"));
}

#[tokio::test]
async fn full_cycle_produces_corrective_examples() {
    let mut failures = harvest(&batch(oracle()), &generation_run()).await;

    let valid = ValidationResult::builder("DUP\nADD\nHALT")
        .assembled(true)
        .verified(true)
        .build();
    let verdicts = vec![
        HumanVerdict {
            key: "double a number".into(),
            candidate_text: "DUP\nMUL\nHALT".into(),
            feedback: Feedback::Reject,
            concern: Concern::Program,
            validation: valid.clone(),
            description: None,
            timestamp: Some("2025-06-02T09:00:00".into()),
        },
        HumanVerdict {
            key: "halt".into(),
            candidate_text: "HALT".into(),
            feedback: Feedback::Accept,
            concern: Concern::Program,
            validation: valid,
            description: None,
            timestamp: Some("2025-06-02T09:00:00".into()),
        },
    ];
    failures.extend(verdicts.iter().filter_map(classify_verdict));

    let unique = aggregate(failures);
    assert_eq!(unique.len(), 4);

    let dataset = FeedbackBuilder::new().build(&unique, &corpus());
    assert_eq!(dataset.summary.matched, 4);
    assert_eq!(dataset.summary.unmatched, 0);
    assert_eq!(dataset.primary.len(), 4);
    assert!(dataset.descriptions.is_empty());

    let semantic = dataset
        .primary
        .iter()
        .find(|e| e.key == "double a number")
        .unwrap();
    assert_eq!(semantic.failure_layer, FailureLayer::Semantic);
    assert_eq!(semantic.target_text, "DUP\nADD\nHALT");
    assert!(semantic.corrective_context.contains("DUP\nMUL\nHALT"));

    let syntax = dataset.primary.iter().find(|e| e.key == "add one").unwrap();
    assert!(syntax.corrective_context.contains("unknown opcode BOGUS"));
}

#[tokio::test]
async fn unmatched_failure_counts_exactly_once() {
    let failures = harvest(&batch(oracle()), &generation_run()).await;
    let before = FeedbackBuilder::new().build(&failures, &corpus()).summary;

    let mut extended = failures.clone();
    extended.push(FailureRecord::new(
        "reverse a list",
        "BOGUS\nHALT",
        StructuralFault::AssemblySyntax,
        "assembly failed: unknown opcode BOGUS",
        FailureSource::Eval,
    ));
    let after = FeedbackBuilder::new().build(&extended, &corpus()).summary;

    assert_eq!(after.unmatched, before.unmatched + 1);
    assert_eq!(after.matched, before.matched);
}

#[tokio::test]
async fn newer_human_verdict_replaces_eval_failure() {
    let failures = harvest(&batch(oracle()), &generation_run()).await;

    let verdict = HumanVerdict {
        key: "square a number".into(),
        candidate_text: "DUP\nMUL\nHALT".into(),
        feedback: Feedback::Reject,
        concern: Concern::Description,
        validation: ValidationResult::builder("DUP\nMUL\nHALT")
            .assembled(true)
            .verified(true)
            .witnesses(2, 2)
            .build(),
        description: Some("doubles its input".into()),
        timestamp: Some("2025-07-01T00:00:00".into()),
    };

    let mut all = failures;
    all.extend(classify_verdict(&verdict));
    let unique = aggregate(all);

    let square = unique.iter().find(|r| r.key == "square a number").unwrap();
    assert!(square.kind.is_description_mismatch());
    assert_eq!(square.source, FailureSource::HumanFeedbackDescription);

    let dataset = FeedbackBuilder::new().build(&unique, &corpus());
    assert_eq!(dataset.descriptions.len(), 1);
    assert_eq!(dataset.descriptions[0].description, "square a number");
}
