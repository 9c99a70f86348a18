#![deny(unsafe_code)]
//! # nolang-feedback-gate
//!
//! Decides whether a retrained model is accepted: run metrics, the two-part
//! improvement gate, and per-key regression analysis.
//!
//! ## Key Types
//!
//! - [`MetricSet`] / [`evaluate_run`] — run-level validity percentages
//! - [`ImprovementGate`] — majority-improved and no-severe-regression checks
//! - [`find_regressions`] — keys that went from fully valid to invalid
//! - [`ImprovementReport`] — persisted and printable cycle report

pub mod gate;
pub mod metrics;
pub mod regression;
pub mod report;

pub use gate::{GateDecision, GateThresholds, ImprovementGate, MetricDelta};
pub use metrics::{error_type, evaluate_run, Metric, MetricSet};
pub use regression::{find_regressions, Regression, RegressionScan};
pub use report::ImprovementReport;
