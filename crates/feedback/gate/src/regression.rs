//! Per-key regressions between two generation runs.

use nolang_feedback_oracle::{BatchItem, BatchValidator};
use nolang_feedback_types::GenerationEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// A key whose baseline candidate was fully valid but whose improved
/// candidate is not.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Regression {
    pub key: String,
    pub baseline_status: String,
    pub improved_status: String,
    pub improved_errors: Vec<String>,
}

/// Regressions found by [`find_regressions`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegressionScan {
    /// Keys present in both runs.
    pub compared: usize,
    /// Every regression, in key order.
    pub regressions: Vec<Regression>,
}

impl RegressionScan {
    pub fn count(&self) -> usize {
        self.regressions.len()
    }
}

fn by_key(run: &[GenerationEntry]) -> BTreeMap<&str, &GenerationEntry> {
    // Later entries for the same key replace earlier ones.
    run.iter().map(|e| (e.key.as_str(), e)).collect()
}

/// Re-validate both candidates of every key the two runs share and report
/// the keys that went from fully valid to not fully valid.
pub async fn find_regressions(
    baseline: &[GenerationEntry],
    improved: &[GenerationEntry],
    validator: &BatchValidator,
) -> RegressionScan {
    let baseline = by_key(baseline);
    let improved = by_key(improved);

    let shared: Vec<(&str, &GenerationEntry, &GenerationEntry)> = baseline
        .iter()
        .filter_map(|(key, base)| improved.get(key).map(|imp| (*key, *base, *imp)))
        .collect();

    let items: Vec<BatchItem> = shared
        .iter()
        .flat_map(|(_, base, imp)| [BatchItem::from(*base), BatchItem::from(*imp)])
        .collect();
    let results = validator.validate_batch(items).await;

    let regressions: Vec<Regression> = shared
        .iter()
        .zip(results.chunks(2))
        .filter_map(|((key, _, _), pair)| match pair {
            [base, imp] if base.fully_valid() && !imp.fully_valid() => Some(Regression {
                key: key.to_string(),
                baseline_status: "valid".to_string(),
                improved_status: "invalid".to_string(),
                improved_errors: imp.errors().to_vec(),
            }),
            _ => None,
        })
        .collect();

    info!(
        compared = shared.len(),
        regressions = regressions.len(),
        "regression scan finished"
    );
    RegressionScan {
        compared: shared.len(),
        regressions,
    }
}
