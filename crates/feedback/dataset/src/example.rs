//! Corrective training examples.

use nolang_feedback_types::{FailureLayer, FailureRecord};
use serde::{Deserialize, Serialize};

/// Provenance tag carried by every generated example.
pub const FEEDBACK_SOURCE: &str = "feedback";

/// Corrective context appended to the generation prompt.
///
/// Structural failures quote the error; semantic failures show the incorrect
/// program as a negative exemplar.
pub fn corrective_context(record: &FailureRecord) -> String {
    if record.layer().is_structural() {
        format!(
            "\nA previous attempt produced an error: {}\nGenerate correct assembly.",
            record.error_message
        )
    } else {
        format!(
            "\nA previous attempt was syntactically valid but did not match the user's intent.\n\
             The incorrect assembly was:\n{}\n\
             Generate the correct assembly instead.",
            record.candidate_text
        )
    }
}

/// Corrective context for a description example.
pub const DESCRIPTION_CONTEXT: &str = "\nA previous description of this code did not accurately capture its behavior.\nProvide an accurate description.";

/// Primary example: intent to known-correct program, with corrective context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackExample {
    pub key: String,
    pub target_text: String,
    pub corrective_context: String,
    pub failure_layer: FailureLayer,
    pub failure_type: String,
    pub source: String,
}

impl FeedbackExample {
    pub fn from_failure(record: &FailureRecord, key: &str, reference: &str) -> Self {
        Self {
            key: key.to_string(),
            target_text: reference.to_string(),
            corrective_context: corrective_context(record),
            failure_layer: record.layer(),
            failure_type: record.kind.as_str().to_string(),
            source: FEEDBACK_SOURCE.to_string(),
        }
    }
}

/// Secondary example: program to description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionExample {
    pub target_text: String,
    pub description: String,
    pub corrective_context: String,
    pub failure_layer: FailureLayer,
    pub source: String,
}

impl DescriptionExample {
    /// Built only for description-mismatch failures. The intent itself is the
    /// correct description.
    pub fn from_failure(record: &FailureRecord, key: &str) -> Option<Self> {
        if !record.kind.is_description_mismatch() || key.is_empty() {
            return None;
        }
        Some(Self {
            target_text: record.candidate_text.clone(),
            description: key.to_string(),
            corrective_context: DESCRIPTION_CONTEXT.to_string(),
            failure_layer: FailureLayer::Semantic,
            source: FEEDBACK_SOURCE.to_string(),
        })
    }
}
