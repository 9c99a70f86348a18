//! Property tests: every validation outcome maps onto exactly one layer, and
//! semantic layers are only reachable from structurally valid results.

use nolang_feedback_classifier::{classify, classify_verdict, Classification};
use nolang_feedback_types::*;
use proptest::prelude::*;

fn arb_result() -> impl Strategy<Value = ValidationResult> {
    (any::<bool>(), any::<bool>(), 0usize..5, 0usize..5).prop_map(
        |(assembled, verified, total, ok)| {
            ValidationResult::builder("HALT")
                .assembled(assembled)
                .verified(assembled && verified)
                .witnesses(total, ok.min(total))
                .build()
        },
    )
}

fn arb_concern() -> impl Strategy<Value = Concern> {
    prop_oneof![Just(Concern::Program), Just(Concern::Description)]
}

proptest! {
    #[test]
    fn fully_valid_implies_assembled_and_verified(result in arb_result()) {
        if result.fully_valid() {
            prop_assert!(result.assembled());
            prop_assert!(result.verified());
        }
    }

    #[test]
    fn structural_layers_stay_in_range(result in arb_result()) {
        match classify(&result) {
            Classification::Pass(_) => {
                prop_assert!(result.fully_valid());
                prop_assert!(result.witnesses_total() == 0 || result.witnesses_passed());
            }
            Classification::Fail(fault) => {
                let n = fault.layer().number();
                prop_assert!((1..=3).contains(&n));
            }
        }
    }

    #[test]
    fn rejection_layer_respects_structure(result in arb_result(), concern in arb_concern()) {
        let verdict = HumanVerdict {
            key: "negate".into(),
            candidate_text: "NEG\nHALT".into(),
            feedback: Feedback::Reject,
            concern,
            validation: result.clone(),
            description: None,
            timestamp: None,
        };
        let record = classify_verdict(&verdict).unwrap();
        let n = record.layer().number();
        prop_assert!((1..=4).contains(&n));
        prop_assert_eq!(n == 4, classify(&result).is_pass());
    }

    #[test]
    fn accepted_verdicts_never_fail(result in arb_result(), concern in arb_concern()) {
        let verdict = HumanVerdict {
            key: "negate".into(),
            candidate_text: "NEG\nHALT".into(),
            feedback: Feedback::Accept,
            concern,
            validation: result,
            description: None,
            timestamp: None,
        };
        prop_assert!(classify_verdict(&verdict).is_none());
    }
}
