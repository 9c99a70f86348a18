//! `improve`: gate a retrained model against its baseline

use super::evaluate::evaluate_generations;
use super::{load_generations, Context};
use crate::error::{CliError, CliResult};
use crate::output::{print_failure, print_success};
use clap::Args;
use nolang_feedback_gate::{find_regressions, ImprovementGate, ImprovementReport, MetricSet};
use nolang_feedback_store::{read_json, write_json};
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments for `improve`
#[derive(Args, Debug)]
pub struct ImproveArgs {
    /// Feedback cycle number
    #[arg(long, default_value_t = 1)]
    pub cycle: u32,

    /// Baseline metrics (JSON)
    #[arg(long)]
    pub baseline: Option<PathBuf>,

    /// Baseline generation run (JSONL); evaluated when --baseline is absent
    /// and scanned for regressions
    #[arg(long)]
    pub baseline_generations: Option<PathBuf>,

    /// Improved metrics (JSON)
    #[arg(long)]
    pub improved: Option<PathBuf>,

    /// Improved generation run (JSONL); evaluated when --improved is absent
    #[arg(long)]
    pub improved_generations: Option<PathBuf>,

    /// Report output (JSON); defaults to outputs/metrics/improvement_v<cycle>.json
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ImproveArgs {
    fn report_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!("outputs/metrics/improvement_v{}.json", self.cycle))
        })
    }
}

/// Execute `improve`. Returns whether the gate passed.
pub async fn execute(args: ImproveArgs, ctx: &Context) -> CliResult<bool> {
    let baseline = load_metrics(
        "baseline",
        args.baseline.as_deref(),
        args.baseline_generations.as_deref(),
        ctx,
    )
    .await?;
    let improved = load_metrics(
        "improved",
        args.improved.as_deref(),
        args.improved_generations.as_deref(),
        ctx,
    )
    .await?;

    let scan = match (&args.baseline_generations, &args.improved_generations) {
        (Some(base), Some(imp)) => {
            let base = load_generations(base).await?;
            let imp = load_generations(imp).await?;
            Some(find_regressions(&base, &imp, &ctx.batch).await)
        }
        _ => None,
    };

    let thresholds = ctx.config.gate.clone();
    let cap = thresholds.regression_report_cap;
    let decision = ImprovementGate::new(thresholds).compare(&baseline, &improved);
    let report = ImprovementReport::new(args.cycle, baseline, improved, decision, scan, cap);

    for line in report.render() {
        println!("{}", line);
    }

    let path = args.report_path();
    write_json(&path, &report).await?;
    info!(cycle = report.cycle, passed = report.gate_passed, "improvement report written");

    if report.gate_passed {
        print_success(&format!("gate passed; report at {}", path.display()));
    } else {
        print_failure(&format!("gate failed; report at {}", path.display()));
    }
    Ok(report.gate_passed)
}

async fn load_metrics(
    side: &str,
    metrics: Option<&Path>,
    generations: Option<&Path>,
    ctx: &Context,
) -> CliResult<MetricSet> {
    match (metrics, generations) {
        (Some(path), _) => Ok(read_json(path).await?),
        (None, Some(path)) => evaluate_generations(path, ctx).await,
        (None, None) => Err(CliError::Usage(format!(
            "pass --{side} or --{side}-generations"
        ))),
    }
}
