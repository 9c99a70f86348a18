use crate::corpus::ReferenceCorpus;
use crate::example::{DescriptionExample, FeedbackExample};
use nolang_feedback_types::{FailureLayer, FailureRecord};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// Counters for one build.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSummary {
    /// Failures paired with a reference.
    pub matched: usize,
    /// Failures whose key has no reference.
    pub unmatched: usize,
    /// Repeat keys within the batch.
    pub duplicates: usize,
    /// Failures with an empty key.
    pub skipped: usize,
    /// Primary examples per layer.
    pub by_layer: BTreeMap<FailureLayer, usize>,
    pub description_examples: usize,
}

impl BuildSummary {
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("Matched with reference: {}", self.matched),
            format!("Unmatched (skipped):    {}", self.unmatched),
        ];
        if self.duplicates > 0 || self.skipped > 0 {
            lines.push(format!(
                "Duplicates: {}, empty keys: {}",
                self.duplicates, self.skipped
            ));
        }
        lines.push(format!("Primary examples: {}", self.matched));
        for (layer, count) in &self.by_layer {
            lines.push(format!("  {}: {}", layer, count));
        }
        lines.push(format!("Description examples: {}", self.description_examples));
        lines
    }
}

/// Output of one build: both example streams and the counters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedbackDataset {
    pub primary: Vec<FeedbackExample>,
    pub descriptions: Vec<DescriptionExample>,
    pub summary: BuildSummary,
}

/// Pairs failure records with reference programs to produce corrective
/// examples.
#[derive(Clone, Debug)]
pub struct FeedbackBuilder {
    include_descriptions: bool,
}

impl Default for FeedbackBuilder {
    fn default() -> Self {
        Self {
            include_descriptions: true,
        }
    }
}

impl FeedbackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether description-mismatch failures also yield description examples.
    pub fn with_descriptions(mut self, include: bool) -> Self {
        self.include_descriptions = include;
        self
    }

    /// Build examples in input order. Keys are trimmed; the first record for a
    /// key wins and later ones count as duplicates.
    pub fn build(&self, failures: &[FailureRecord], corpus: &ReferenceCorpus) -> FeedbackDataset {
        let mut dataset = FeedbackDataset::default();
        let mut seen: HashSet<&str> = HashSet::new();

        for record in failures {
            let key = record.key.trim();
            if key.is_empty() {
                dataset.summary.skipped += 1;
                continue;
            }
            if !seen.insert(key) {
                dataset.summary.duplicates += 1;
                continue;
            }
            let Some(reference) = corpus.get(key) else {
                debug!(key, "no reference program");
                dataset.summary.unmatched += 1;
                continue;
            };

            dataset.summary.matched += 1;
            *dataset.summary.by_layer.entry(record.layer()).or_default() += 1;
            dataset
                .primary
                .push(FeedbackExample::from_failure(record, key, reference));

            if self.include_descriptions {
                if let Some(example) = DescriptionExample::from_failure(record, key) {
                    dataset.descriptions.push(example);
                }
            }
        }

        dataset.summary.description_examples = dataset.descriptions.len();
        info!(
            matched = dataset.summary.matched,
            unmatched = dataset.summary.unmatched,
            descriptions = dataset.summary.description_examples,
            "feedback dataset built"
        );
        dataset
    }
}
