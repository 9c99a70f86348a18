//! Property tests: aggregation keeps exactly the newest record per key.

use nolang_feedback_classifier::aggregate;
use nolang_feedback_types::*;
use proptest::prelude::*;
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_fault() -> impl Strategy<Value = StructuralFault> {
    prop_oneof![
        Just(StructuralFault::AssemblySyntax),
        Just(StructuralFault::Verification),
        Just(StructuralFault::WitnessMismatch),
    ]
}

/// Records drawn from a small key and timestamp space so collisions are common.
fn arb_record() -> impl Strategy<Value = FailureRecord> {
    (
        prop_oneof![Just(""), Just("negate"), Just("double"), Just("square"), Just("halt")],
        0u8..6,
        arb_fault(),
        "[A-Z]{1,8}",
    )
        .prop_map(|(key, day, fault, text)| {
            FailureRecord::new(key, text, fault, "assembly failed: x", FailureSource::Eval)
                .with_timestamp(format!("2025-01-0{}T00:00:00", day + 1))
        })
}

fn arb_records() -> impl Strategy<Value = Vec<FailureRecord>> {
    prop::collection::vec(arb_record(), 0..40)
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn aggregation_is_idempotent(records in arb_records()) {
        let once = aggregate(records);
        let twice = aggregate(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn one_record_per_nonempty_key(records in arb_records()) {
        let keys: BTreeSet<String> = records
            .iter()
            .filter(|r| !r.key.is_empty())
            .map(|r| r.key.clone())
            .collect();
        let unique = aggregate(records);
        let out: Vec<String> = unique.iter().map(|r| r.key.clone()).collect();
        prop_assert_eq!(out, keys.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn survivor_carries_newest_timestamp(records in arb_records()) {
        let unique = aggregate(records.clone());
        for survivor in &unique {
            let newest = records
                .iter()
                .filter(|r| r.key == survivor.key)
                .map(|r| r.timestamp.as_str())
                .max()
                .unwrap();
            prop_assert_eq!(survivor.timestamp.as_str(), newest);
        }
    }

    #[test]
    fn later_record_wins_a_tie(records in arb_records(), text in "[a-z]{12}") {
        prop_assume!(records.iter().any(|r| !r.key.is_empty()));
        let target = records.iter().find(|r| !r.key.is_empty()).unwrap().clone();
        let newest = records
            .iter()
            .filter(|r| r.key == target.key)
            .map(|r| r.timestamp.clone())
            .max()
            .unwrap();

        let mut extended = records;
        extended.push(
            FailureRecord::new(
                target.key.as_str(),
                text.as_str(),
                StructuralFault::Verification,
                "verification failed: y",
                FailureSource::Eval,
            )
            .with_timestamp(newest),
        );

        let unique = aggregate(extended);
        let survivor = unique.iter().find(|r| r.key == target.key).unwrap();
        prop_assert_eq!(survivor.candidate_text.as_str(), text.as_str());
    }
}
