//! Layer assignment for validation results and human verdicts.

use nolang_feedback_types::{
    Concern, FailureKind, FailureLayer, FailureRecord, FailureSource, GenerationEntry,
    HumanVerdict, StructuralFault, StructuralPass, ValidationResult,
};

/// Error message for a rejected program that cleared every structural check.
pub const PROGRAM_REJECTED: &str = "Human rejected: assembly does not match intent";

/// Error message for a rejected description of a structurally valid program.
pub const DESCRIPTION_REJECTED: &str = "Human rejected: description does not match intent";

/// Structural verdict on a validation result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    Pass(StructuralPass),
    Fail(StructuralFault),
}

impl Classification {
    /// Failure layer, or `None` for a pass.
    pub fn layer(&self) -> Option<FailureLayer> {
        match self {
            Self::Pass(_) => None,
            Self::Fail(fault) => Some(fault.layer()),
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass(_))
    }
}

/// First failing structural layer of a result, in the order assembled,
/// verified, witnesses.
pub fn classify(result: &ValidationResult) -> Classification {
    match StructuralPass::check(result) {
        Ok(pass) => Classification::Pass(pass),
        Err(fault) => Classification::Fail(fault),
    }
}

/// Message recorded for a structural failure: the validation errors joined,
/// or a generic per-layer message when the result carries none.
pub fn structural_message(result: &ValidationResult, fault: StructuralFault) -> String {
    if result.errors().is_empty() {
        format!("Layer {} failure", fault.layer().number())
    } else {
        result.errors().join("; ")
    }
}

/// Failure record for one automatically validated generation, if it failed.
pub fn failure_from_validation(
    entry: &GenerationEntry,
    result: &ValidationResult,
    timestamp: &str,
) -> Option<FailureRecord> {
    let fault = match classify(result) {
        Classification::Pass(_) => return None,
        Classification::Fail(fault) => fault,
    };
    Some(
        FailureRecord::new(
            entry.key.as_str(),
            entry.candidate_text.as_str(),
            fault,
            structural_message(result, fault),
            FailureSource::Eval,
        )
        .with_timestamp(timestamp),
    )
}

/// Failure record for a human verdict.
///
/// Only rejections produce a record. The structural check runs first: a
/// rejected candidate that is structurally broken keeps its layer 1-3
/// classification, whatever the reviewer's concern was.
pub fn classify_verdict(verdict: &HumanVerdict) -> Option<FailureRecord> {
    if !verdict.is_rejection() {
        return None;
    }

    let source = match verdict.concern {
        Concern::Program => FailureSource::HumanFeedback,
        Concern::Description => FailureSource::HumanFeedbackDescription,
    };

    let (kind, message): (FailureKind, String) = match classify(&verdict.validation) {
        Classification::Fail(fault) => (fault.into(), structural_message(&verdict.validation, fault)),
        Classification::Pass(pass) => {
            let message = match verdict.concern {
                Concern::Program => PROGRAM_REJECTED,
                Concern::Description => DESCRIPTION_REJECTED,
            };
            (pass.reject(verdict.concern).into(), message.to_string())
        }
    };

    let mut record = FailureRecord::new(
        verdict.key.as_str(),
        verdict.candidate_text.as_str(),
        kind,
        message,
        source,
    );
    if let Some(timestamp) = &verdict.timestamp {
        record = record.with_timestamp(timestamp.as_str());
    }
    if let Some(description) = &verdict.description {
        record = record.with_description(description.as_str());
    }
    Some(record)
}
