#![deny(unsafe_code)]
//! # nolang-feedback-dataset
//!
//! Turns classified failures into corrective training examples by pairing
//! each one with a known-correct reference program.
//!
//! ## Key Types
//!
//! - [`ReferenceCorpus`] / [`CorpusBuilder`] — priority-merged intent → program map
//! - [`FeedbackBuilder`] — failure records to [`FeedbackDataset`]
//! - [`FeedbackExample`] — primary example with corrective context
//! - [`DescriptionExample`] — program → description example for description mismatches
//! - [`BuildSummary`] — matched / unmatched / duplicate counters

pub mod builder;
pub mod corpus;
pub mod example;

pub use builder::{BuildSummary, FeedbackBuilder, FeedbackDataset};
pub use corpus::{CorpusBuilder, ReferenceCorpus, ReferenceRecord, SourceStats};
pub use example::{
    corrective_context, DescriptionExample, FeedbackExample, DESCRIPTION_CONTEXT, FEEDBACK_SOURCE,
};
