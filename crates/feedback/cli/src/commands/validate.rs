//! `validate`: run candidates through the oracle pipeline

use super::{load_generations, Context};
use crate::error::{CliError, CliResult};
use crate::output::{print_heading, print_lines, print_success, print_warning};
use clap::{ArgGroup, Args};
use nolang_feedback_classifier::{classify, Classification};
use nolang_feedback_store::{read_json, write_records};
use nolang_feedback_types::{FailureLayer, ValidationResult, Witness};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Arguments for `validate`
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("input").required(true).args(["program", "generations"])))]
pub struct ValidateArgs {
    /// Single program file
    #[arg(long)]
    pub program: Option<PathBuf>,

    /// Witness vectors (JSON array) for --program
    #[arg(long, requires = "program")]
    pub witnesses: Option<PathBuf>,

    /// Generation run (JSONL)
    #[arg(long)]
    pub generations: Option<PathBuf>,

    /// Where to write per-entry results (JSONL)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// One validated entry of a generation run.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedEntry {
    pub key: String,
    pub result: ValidationResult,
}

/// Counts printed after a validation run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    pub total: usize,
    pub passed: usize,
    pub by_layer: BTreeMap<FailureLayer, usize>,
}

impl ValidationSummary {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a ValidationResult>) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.total += 1;
            match classify(result) {
                Classification::Pass(_) => summary.passed += 1,
                Classification::Fail(fault) => {
                    *summary.by_layer.entry(fault.layer()).or_default() += 1
                }
            }
        }
        summary
    }

    pub fn report_lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "{} candidates, {} structurally valid",
            self.total, self.passed
        )];
        for (layer, count) in &self.by_layer {
            lines.push(format!("{}: {}", layer, count));
        }
        lines
    }
}

/// Execute `validate`
pub async fn execute(args: ValidateArgs, ctx: &Context) -> CliResult<()> {
    if let Some(program) = &args.program {
        return validate_program(program, args.witnesses.as_deref(), ctx).await;
    }
    match &args.generations {
        Some(generations) => validate_run(generations, args.output.as_deref(), ctx).await,
        None => Err(CliError::Usage(
            "pass --program or --generations".to_string(),
        )),
    }
}

async fn validate_program(path: &Path, witnesses: Option<&Path>, ctx: &Context) -> CliResult<()> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Program {
            path: path.display().to_string(),
            source,
        })?;
    let vectors: Option<Vec<Witness>> = match witnesses {
        Some(file) => Some(read_json(file).await?),
        None => None,
    };

    let result = ctx
        .batch
        .validator()
        .validate(&text, vectors.as_deref())
        .await;

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => print_warning(&format!("cannot render result: {}", e)),
    }
    report_single(&result);
    Ok(())
}

fn report_single(result: &ValidationResult) {
    match classify(result) {
        Classification::Pass(_) => print_success("structurally valid"),
        Classification::Fail(fault) => print_warning(&format!("failed at {}", fault.layer())),
    }
    for warning in result.warnings() {
        print_warning(warning);
    }
}

async fn validate_run(path: &Path, output: Option<&Path>, ctx: &Context) -> CliResult<()> {
    let entries = load_generations(path).await?;
    let results = ctx.batch.validate_entries(&entries).await;

    let summary = ValidationSummary::from_results(&results);
    print_heading("Validation");
    print_lines(&summary.report_lines());

    if let Some(output) = output {
        let rows: Vec<ValidatedEntry> = entries
            .into_iter()
            .zip(results)
            .map(|(entry, result)| ValidatedEntry {
                key: entry.key,
                result,
            })
            .collect();
        let written = write_records(output, &rows).await?;
        print_success(&format!("{} results written to {}", written, output.display()));
    }
    Ok(())
}
