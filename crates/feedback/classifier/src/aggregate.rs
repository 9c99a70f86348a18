//! Per-key deduplication of failure records.

use nolang_feedback_types::{FailureLayer, FailureRecord, FailureSource};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Keep the newest record for every key.
///
/// Keys are trimmed before comparison and stored trimmed; records whose key is
/// blank are dropped. Timestamps compare as strings; on a tie the record later
/// in the input wins. Output is sorted by key, so
/// `aggregate(aggregate(s)) == aggregate(s)`.
pub fn aggregate<I>(records: I) -> Vec<FailureRecord>
where
    I: IntoIterator<Item = FailureRecord>,
{
    let mut newest: BTreeMap<String, FailureRecord> = BTreeMap::new();
    let mut dropped = 0usize;
    let mut superseded = 0usize;

    for mut record in records {
        let key = record.key.trim();
        if key.is_empty() {
            dropped += 1;
            continue;
        }
        if key.len() != record.key.len() {
            record.key = key.to_string();
        }
        match newest.get(&record.key) {
            Some(existing) if record.timestamp < existing.timestamp => superseded += 1,
            Some(_) => {
                superseded += 1;
                newest.insert(record.key.clone(), record);
            }
            None => {
                newest.insert(record.key.clone(), record);
            }
        }
    }

    debug!(
        unique = newest.len(),
        superseded, dropped, "failure records aggregated"
    );
    newest.into_values().collect()
}

/// Counts of aggregated failures by layer and by source.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureSummary {
    pub total: usize,
    pub by_layer: BTreeMap<FailureLayer, usize>,
    pub by_source: BTreeMap<FailureSource, usize>,
}

impl FailureSummary {
    pub fn from_records(records: &[FailureRecord]) -> Self {
        let mut summary = Self {
            total: records.len(),
            ..Default::default()
        };
        for record in records {
            *summary.by_layer.entry(record.layer()).or_default() += 1;
            *summary.by_source.entry(record.source).or_default() += 1;
        }
        summary
    }

    pub fn count(&self, layer: FailureLayer) -> usize {
        self.by_layer.get(&layer).copied().unwrap_or(0)
    }

    /// Human-readable lines, one per non-empty layer then one per source.
    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Collected {} unique failures:", self.total)];
        for (layer, count) in &self.by_layer {
            lines.push(format!("  {}: {}", layer, count));
        }
        lines.push("  By source:".to_string());
        for (source, count) in &self.by_source {
            lines.push(format!("    {}: {}", source, count));
        }
        lines
    }
}
