//! `evaluate`: run-level metrics for a generation run

use super::{load_generations, Context};
use crate::error::CliResult;
use crate::output::{print_heading, print_lines, print_success};
use clap::Args;
use nolang_feedback_gate::{evaluate_run, Metric, MetricSet};
use nolang_feedback_store::write_json;
use std::path::{Path, PathBuf};

/// Arguments for `evaluate`
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Generation run (JSONL)
    #[arg(long)]
    pub generations: PathBuf,

    /// Metrics output (JSON)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute `evaluate`
pub async fn execute(args: EvaluateArgs, ctx: &Context) -> CliResult<()> {
    let metrics = evaluate_generations(&args.generations, ctx).await?;

    print_heading("Metrics");
    print_lines(&metric_lines(&metrics));

    if let Some(output) = &args.output {
        write_json(output, &metrics).await?;
        print_success(&format!("metrics written to {}", output.display()));
    }
    Ok(())
}

/// Validate every entry of a run and compute its metrics.
pub(crate) async fn evaluate_generations(path: &Path, ctx: &Context) -> CliResult<MetricSet> {
    let entries = load_generations(path).await?;
    let results = ctx.batch.validate_entries(&entries).await;
    Ok(evaluate_run(&entries, &results))
}

fn metric_lines(metrics: &MetricSet) -> Vec<String> {
    let mut lines = vec![format!("Entries: {}", metrics.total)];
    for metric in Metric::PRIMARY {
        lines.push(format!("{:<20} {:>6.1}%", metric.label(), metrics.get(metric)));
    }
    lines.push(format!(
        "{:<20} {:>6.1}%",
        "Exact match", metrics.exact_match_pct
    ));
    for (kind, count) in &metrics.error_types {
        lines.push(format!("  {}: {}", kind, count));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{context, write_lines};
    use nolang_feedback_oracle::SimulatedOracle;
    use nolang_feedback_store::read_json;
    use serde_json::json;

    #[tokio::test]
    async fn writes_metrics() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("run.jsonl");
        let output = dir.path().join("metrics/baseline.json");
        write_lines(
            &input,
            &[
                json!({"intent": "halt", "generated_assembly": "HALT", "reference_assembly": "HALT"}),
                json!({"intent": "bad", "generated_assembly": "BAD\nHALT"}),
                json!({"intent": "neg", "generated_assembly": "NEG\nHALT",
                       "witnesses": [{"input": [1], "expected": -1}]}),
                json!({"intent": "sub", "generated_assembly": "SUB\nHALT"}),
            ],
        );

        let ctx = context(SimulatedOracle::new().with_assembly_error("BAD", "unknown opcode"));
        let args = EvaluateArgs {
            generations: input,
            output: Some(output.clone()),
        };
        execute(args, &ctx).await.unwrap();

        let metrics: MetricSet = read_json(&output).await.unwrap();
        assert_eq!(metrics.total, 4);
        assert_eq!(metrics.assembled, 3);
        assert_eq!(metrics.assembled_pct, 75.0);
        assert_eq!(metrics.exact_match, 1);
        assert_eq!(metrics.witness_total, 1);
        assert_eq!(metrics.witness_pass_pct, 100.0);
        assert_eq!(metrics.error_types["assembly failed"], 1);
    }

    #[test]
    fn metric_lines_cover_primary_metrics() {
        let lines = metric_lines(&MetricSet::default());
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("Syntax validity"));
    }
}
