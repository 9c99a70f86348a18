use crate::error::LayerError;
use crate::layer::{Concern, FailureKind, FailureLayer};
use crate::validation::{ValidationResult, Witness};
use serde::{Deserialize, Serialize};

/// Timestamp format used by every persisted record. Sorts lexicographically.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Current local time in [`TIMESTAMP_FORMAT`].
pub fn now_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Where a failure record was harvested from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureSource {
    /// Automated validation of a generation run.
    #[serde(alias = "eval_7a")]
    Eval,
    /// Human rejection of a generated program.
    HumanFeedback,
    /// Human rejection of a generated description.
    #[serde(alias = "human_feedback_7b")]
    HumanFeedbackDescription,
}

impl std::fmt::Display for FailureSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Eval => write!(f, "eval"),
            Self::HumanFeedback => write!(f, "human_feedback"),
            Self::HumanFeedbackDescription => write!(f, "human_feedback_description"),
        }
    }
}

/// One harvested failure. Identified by `key`; a newer record with the same
/// key supersedes an older one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FailureRecordWire", into = "FailureRecordWire")]
pub struct FailureRecord {
    pub key: String,
    pub candidate_text: String,
    pub kind: FailureKind,
    pub error_message: String,
    pub source: FailureSource,
    pub timestamp: String,
    /// Generated description, for description-mismatch records.
    pub description: Option<String>,
}

impl FailureRecord {
    pub fn new(
        key: impl Into<String>,
        candidate_text: impl Into<String>,
        kind: impl Into<FailureKind>,
        error_message: impl Into<String>,
        source: FailureSource,
    ) -> Self {
        Self {
            key: key.into(),
            candidate_text: candidate_text.into(),
            kind: kind.into(),
            error_message: error_message.into(),
            source,
            timestamp: now_timestamp(),
            description: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn layer(&self) -> FailureLayer {
        self.kind.layer()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FailureRecordWire {
    #[serde(alias = "intent")]
    key: String,
    #[serde(alias = "generated_assembly", default)]
    candidate_text: String,
    #[serde(alias = "failure_layer")]
    failure_layer: u8,
    #[serde(alias = "failure_type")]
    failure_type: String,
    #[serde(alias = "error_message", default)]
    error_message: String,
    source: FailureSource,
    #[serde(default)]
    timestamp: String,
    #[serde(
        alias = "generated_description",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    description: Option<String>,
}

impl TryFrom<FailureRecordWire> for FailureRecord {
    type Error = LayerError;

    fn try_from(wire: FailureRecordWire) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: FailureKind::from_persisted(wire.failure_layer, &wire.failure_type)?,
            key: wire.key,
            candidate_text: wire.candidate_text,
            error_message: wire.error_message,
            source: wire.source,
            timestamp: wire.timestamp,
            description: wire.description,
        })
    }
}

impl From<FailureRecord> for FailureRecordWire {
    fn from(record: FailureRecord) -> Self {
        Self {
            failure_layer: record.kind.layer().number(),
            failure_type: record.kind.as_str().to_string(),
            key: record.key,
            candidate_text: record.candidate_text,
            error_message: record.error_message,
            source: record.source,
            timestamp: record.timestamp,
            description: record.description,
        }
    }
}

/// One generated candidate from a generation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationEntry {
    #[serde(alias = "intent")]
    pub key: String,
    #[serde(alias = "generated_assembly", default)]
    pub candidate_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub witnesses: Option<Vec<Witness>>,
    #[serde(
        alias = "reference_assembly",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub reference_text: Option<String>,
}

impl GenerationEntry {
    pub fn new(key: impl Into<String>, candidate_text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            candidate_text: candidate_text.into(),
            witnesses: None,
            reference_text: None,
        }
    }

    pub fn with_witnesses(mut self, witnesses: Vec<Witness>) -> Self {
        self.witnesses = Some(witnesses);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference_text = Some(reference.into());
        self
    }

    /// Witness vectors, treating an empty list as none supplied.
    pub fn witness_slice(&self) -> Option<&[Witness]> {
        self.witnesses.as_deref().filter(|w| !w.is_empty())
    }
}

/// Reviewer decision on one candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feedback {
    #[serde(rename = "y", alias = "yes")]
    Accept,
    #[serde(rename = "n", alias = "no")]
    Reject,
    #[serde(rename = "s", alias = "skip")]
    Skip,
}

/// One human review record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanVerdict {
    #[serde(alias = "intent")]
    pub key: String,
    #[serde(alias = "generated_assembly", default)]
    pub candidate_text: String,
    pub feedback: Feedback,
    #[serde(default)]
    pub concern: Concern,
    /// Validation outcome shown to the reviewer.
    #[serde(default = "unvalidated")]
    pub validation: ValidationResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

fn unvalidated() -> ValidationResult {
    ValidationResult::builder("").build()
}

impl HumanVerdict {
    pub fn is_rejection(&self) -> bool {
        self.feedback == Feedback::Reject
    }
}
