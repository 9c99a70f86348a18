#![deny(unsafe_code)]
//! # nolang-feedback-types
//!
//! Shared record types for the NoLang feedback loop.
//!
//! ## Key Types
//!
//! - [`ValidationResult`] — immutable outcome of one pass through the oracle pipeline
//! - [`FailureLayer`] — ordered severity layer (Syntax < Verification < Witness < Semantic)
//! - [`FailureKind`] — concrete failure type; the layer is derived from it
//! - [`StructuralPass`] — proof that a candidate cleared layers 1-3, the only way
//!   to reach a layer-4 [`SemanticFault`]
//! - [`FailureRecord`] — one harvested failure, keyed by intent
//! - [`GenerationEntry`] / [`HumanVerdict`] — input records from generation runs and review

pub mod error;
pub mod layer;
pub mod record;
pub mod validation;

pub use error::LayerError;
pub use layer::{
    Concern, FailureKind, FailureLayer, SemanticFault, StructuralFault, StructuralPass,
};
pub use record::{
    now_timestamp, FailureRecord, FailureSource, Feedback, GenerationEntry, HumanVerdict,
};
pub use validation::{ValidationResult, ValidationResultBuilder, Witness};
