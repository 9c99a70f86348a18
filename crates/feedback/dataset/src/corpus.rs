//! Reference corpus: known-correct program per intent.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// One persisted reference pair, as found in corpus (`*.nolt`) and training
/// split files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    #[serde(default)]
    pub intent: String,
    #[serde(default)]
    pub assembly: String,
}

impl ReferenceRecord {
    pub fn new(intent: impl Into<String>, assembly: impl Into<String>) -> Self {
        Self {
            intent: intent.into(),
            assembly: assembly.into(),
        }
    }
}

/// Map from trimmed intent to trimmed reference program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceCorpus {
    entries: BTreeMap<String, String>,
}

impl ReferenceCorpus {
    pub fn builder() -> CorpusBuilder {
        CorpusBuilder::default()
    }

    /// Reference program for a key; the key is trimmed before lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key.trim()).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Per-source load statistics.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceStats {
    pub name: String,
    /// Records offered by the source.
    pub records: usize,
    /// Keys this source contributed to the corpus.
    pub added: usize,
}

/// Merges provenance sources into a [`ReferenceCorpus`].
///
/// Sources must be added highest priority first. A key already present is
/// never overwritten, so an earlier source always beats a later one and within
/// one source the first occurrence wins.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
    entries: BTreeMap<String, String>,
    stats: Vec<SourceStats>,
}

impl CorpusBuilder {
    pub fn add_source<I>(&mut self, name: impl Into<String>, records: I) -> &mut Self
    where
        I: IntoIterator<Item = ReferenceRecord>,
    {
        let mut stats = SourceStats {
            name: name.into(),
            records: 0,
            added: 0,
        };
        for record in records {
            stats.records += 1;
            let intent = record.intent.trim();
            let assembly = record.assembly.trim();
            if intent.is_empty() || assembly.is_empty() || self.entries.contains_key(intent) {
                continue;
            }
            self.entries.insert(intent.to_string(), assembly.to_string());
            stats.added += 1;
        }
        debug!(
            source = %stats.name,
            records = stats.records,
            added = stats.added,
            "reference source merged"
        );
        self.stats.push(stats);
        self
    }

    pub fn stats(&self) -> &[SourceStats] {
        &self.stats
    }

    pub fn build(self) -> ReferenceCorpus {
        ReferenceCorpus {
            entries: self.entries,
        }
    }
}

impl FromIterator<ReferenceRecord> for ReferenceCorpus {
    fn from_iter<T: IntoIterator<Item = ReferenceRecord>>(iter: T) -> Self {
        let mut builder = CorpusBuilder::default();
        builder.add_source("inline", iter);
        builder.build()
    }
}
