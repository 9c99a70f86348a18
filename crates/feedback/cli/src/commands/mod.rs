//! Subcommand implementations

pub mod build;
pub mod collect;
pub mod evaluate;
pub mod improve;
pub mod validate;

use crate::config::FeedbackConfig;
use crate::error::CliResult;
use nolang_feedback_oracle::{BatchValidator, Validator};
use nolang_feedback_store::read_records;
use nolang_feedback_types::GenerationEntry;
use std::path::Path;
use tracing::info;

/// Shared state for every subcommand.
pub struct Context {
    pub config: FeedbackConfig,
    pub batch: BatchValidator,
}

impl Context {
    /// Context over the configured oracle binary.
    pub fn from_config(config: FeedbackConfig) -> Self {
        let validator = Validator::from_config(&config.oracle);
        Self::with_validator(config, validator)
    }

    pub fn with_validator(config: FeedbackConfig, validator: Validator) -> Self {
        let batch = BatchValidator::new(validator).with_max_workers(config.batch.max_workers);
        Self { config, batch }
    }
}

/// Load a generation run, warning about skipped lines.
pub(crate) async fn load_generations(path: &Path) -> CliResult<Vec<GenerationEntry>> {
    let report = read_records::<GenerationEntry>(path).await?;
    info!(
        file = %path.display(),
        entries = report.len(),
        skipped = report.skipped,
        "generation run loaded"
    );
    Ok(report.records)
}
