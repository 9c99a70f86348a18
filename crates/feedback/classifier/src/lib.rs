#![deny(unsafe_code)]
//! # nolang-feedback-classifier
//!
//! Assigns failure layers to validation results and human verdicts, and
//! collapses failure streams to one record per key.
//!
//! ## Key Types
//!
//! - [`Classification`] — structural pass (carrying a `StructuralPass` token) or layer 1-3 fault
//! - [`classify_verdict`] — human rejection to layer 1-4 failure record
//! - [`aggregate`] — newest-record-per-key deduplication
//! - [`FailureSummary`] — counts by layer and by source

pub mod aggregate;
pub mod classify;

pub use aggregate::{aggregate, FailureSummary};
pub use classify::{
    classify, classify_verdict, failure_from_validation, structural_message, Classification,
    DESCRIPTION_REJECTED, PROGRAM_REJECTED,
};
