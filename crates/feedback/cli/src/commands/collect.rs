//! `collect`: harvest failures from generation runs and human verdicts

use super::{load_generations, Context};
use crate::error::{CliError, CliResult};
use crate::output::{print_heading, print_lines, print_success};
use clap::Args;
use nolang_feedback_classifier::{
    aggregate, classify_verdict, failure_from_validation, FailureSummary,
};
use nolang_feedback_store::{read_records, write_records};
use nolang_feedback_types::{now_timestamp, Concern, FailureRecord, HumanVerdict};
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments for `collect`
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Generation run to validate (JSONL)
    #[arg(long)]
    pub generations: Option<PathBuf>,

    /// Human verdicts (JSONL)
    #[arg(long)]
    pub human_feedback: Option<PathBuf>,

    /// Also harvest description rejections
    #[arg(long)]
    pub include_descriptions: bool,

    /// Unified failures output (JSONL)
    #[arg(short, long, default_value = "outputs/feedback/failures.jsonl")]
    pub output: PathBuf,
}

/// Execute `collect`
pub async fn execute(args: CollectArgs, ctx: &Context) -> CliResult<()> {
    if args.generations.is_none() && args.human_feedback.is_none() {
        return Err(CliError::Usage(
            "pass --generations and/or --human-feedback".to_string(),
        ));
    }

    let mut failures = Vec::new();
    if let Some(path) = &args.generations {
        print_heading("Source: generation run");
        failures.extend(collect_from_generations(path, ctx).await?);
    }
    if let Some(path) = &args.human_feedback {
        print_heading("Source: human feedback");
        failures.extend(collect_from_verdicts(path, args.include_descriptions).await?);
    }

    let unique = aggregate(failures);
    let summary = FailureSummary::from_records(&unique);
    print_heading("Failures");
    print_lines(&summary.report_lines());

    let written = write_records(&args.output, &unique).await?;
    print_success(&format!(
        "{} failures written to {}",
        written,
        args.output.display()
    ));
    Ok(())
}

async fn collect_from_generations(path: &Path, ctx: &Context) -> CliResult<Vec<FailureRecord>> {
    let entries = load_generations(path).await?;
    let total = entries.len();
    let (candidates, empty): (Vec<_>, Vec<_>) = entries
        .into_iter()
        .partition(|e| !e.candidate_text.is_empty());

    let results = ctx.batch.validate_entries(&candidates).await;
    let timestamp = now_timestamp();
    let failures: Vec<FailureRecord> = candidates
        .iter()
        .zip(&results)
        .filter_map(|(entry, result)| failure_from_validation(entry, result, &timestamp))
        .collect();

    print_lines(&[format!(
        "Generations: {} total, {} failures, {} skipped",
        total,
        failures.len(),
        empty.len()
    )]);
    Ok(failures)
}

async fn collect_from_verdicts(
    path: &Path,
    include_descriptions: bool,
) -> CliResult<Vec<FailureRecord>> {
    let report = read_records::<HumanVerdict>(path).await?;
    let total = report.len();
    let mut rejected = 0;
    let mut failures = Vec::new();

    for verdict in &report.records {
        if verdict.concern == Concern::Description && !include_descriptions {
            continue;
        }
        if verdict.is_rejection() {
            rejected += 1;
        }
        failures.extend(classify_verdict(verdict));
    }

    info!(total, rejected, skipped = report.skipped, "human verdicts read");
    print_lines(&[format!(
        "Human feedback: {} total, {} rejected",
        total, rejected
    )]);
    Ok(failures)
}
