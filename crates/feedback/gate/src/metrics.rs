//! Run-level metrics.

use nolang_feedback_oracle::hash::strip_hash_values;
use nolang_feedback_types::{GenerationEntry, ValidationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// The three metrics the gate compares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    AssembledPct,
    VerifiedPct,
    WitnessPassPct,
}

impl Metric {
    pub const PRIMARY: [Metric; 3] = [
        Metric::AssembledPct,
        Metric::VerifiedPct,
        Metric::WitnessPassPct,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::AssembledPct => "Syntax validity",
            Self::VerifiedPct => "Verification pass",
            Self::WitnessPassPct => "Witness pass",
        }
    }
}

/// Aggregate metrics over one generation run.
///
/// Every field defaults when absent, so a partial metrics file reads as zeros.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricSet {
    pub total: usize,
    pub assembled: usize,
    #[serde(alias = "assembled_pct")]
    pub assembled_pct: f64,
    pub verified: usize,
    #[serde(alias = "verified_pct")]
    pub verified_pct: f64,
    /// Entries that carried witness vectors.
    #[serde(alias = "witness_total")]
    pub witness_total: usize,
    #[serde(alias = "witness_pass")]
    pub witness_pass: usize,
    #[serde(alias = "witness_pass_pct")]
    pub witness_pass_pct: f64,
    #[serde(alias = "exact_match")]
    pub exact_match: usize,
    #[serde(alias = "exact_match_pct")]
    pub exact_match_pct: f64,
    /// Error count keyed by the text before the first `:`.
    #[serde(alias = "error_types")]
    pub error_types: BTreeMap<String, usize>,
}

impl MetricSet {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::AssembledPct => self.assembled_pct,
            Metric::VerifiedPct => self.verified_pct,
            Metric::WitnessPassPct => self.witness_pass_pct,
        }
    }
}

fn pct(count: usize, of: usize) -> f64 {
    if of == 0 {
        0.0
    } else {
        count as f64 / of as f64 * 100.0
    }
}

/// Histogram key for an error message.
pub fn error_type(message: &str) -> String {
    match message.split_once(':') {
        Some((head, _)) => head.to_string(),
        None => message.chars().take(40).collect(),
    }
}

/// Compute metrics for a run from its entries and their validation results,
/// paired by position.
pub fn evaluate_run(entries: &[GenerationEntry], results: &[ValidationResult]) -> MetricSet {
    if entries.len() != results.len() {
        warn!(
            entries = entries.len(),
            results = results.len(),
            "entry and result counts differ, evaluating the common prefix"
        );
    }

    let mut metrics = MetricSet::default();
    for (entry, result) in entries.iter().zip(results) {
        metrics.total += 1;
        if result.assembled() {
            metrics.assembled += 1;
        }
        if result.verified() {
            metrics.verified += 1;
        }
        if entry.witness_slice().is_some() {
            metrics.witness_total += 1;
            if result.witnesses_passed() {
                metrics.witness_pass += 1;
            }
        }
        if let Some(reference) = entry.reference_text.as_deref().filter(|r| !r.is_empty()) {
            if strip_hash_values(&entry.candidate_text) == strip_hash_values(reference) {
                metrics.exact_match += 1;
            }
        }
        for error in result.errors() {
            *metrics.error_types.entry(error_type(error)).or_default() += 1;
        }
    }

    metrics.assembled_pct = pct(metrics.assembled, metrics.total);
    metrics.verified_pct = pct(metrics.verified, metrics.total);
    metrics.witness_pass_pct = pct(metrics.witness_pass, metrics.witness_total);
    metrics.exact_match_pct = pct(metrics.exact_match, metrics.total);
    metrics
}
