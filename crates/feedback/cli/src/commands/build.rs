//! `build`: pair failures with reference programs

use super::Context;
use crate::error::CliResult;
use crate::output::{print_heading, print_lines, print_success, print_warning};
use clap::Args;
use nolang_feedback_dataset::{CorpusBuilder, FeedbackBuilder, ReferenceCorpus, ReferenceRecord};
use nolang_feedback_store::{read_dir_records, read_records, read_records_if_exists, write_records};
use nolang_feedback_types::FailureRecord;
use std::path::{Path, PathBuf};
use tracing::info;

/// Training split files, in priority order after the corpus.
const SPLIT_FILES: [&str; 3] = ["train.jsonl", "val.jsonl", "test.jsonl"];

/// Corpus file extension.
const CORPUS_EXTENSION: &str = "nolt";

/// Arguments for `build`
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Unified failures (JSONL) from `collect`
    #[arg(long, default_value = "outputs/feedback/failures.jsonl")]
    pub failures: PathBuf,

    /// Directory of `*.nolt` reference files
    #[arg(long)]
    pub corpus_dir: Option<PathBuf>,

    /// Directory holding train/val/test split files
    #[arg(long)]
    pub splits_dir: Option<PathBuf>,

    /// Primary examples output (JSONL)
    #[arg(short, long, default_value = "outputs/feedback/feedback_examples.jsonl")]
    pub output: PathBuf,

    /// Description examples output (JSONL)
    #[arg(long, default_value = "outputs/feedback/description_examples.jsonl")]
    pub descriptions_output: PathBuf,

    /// Skip description examples
    #[arg(long)]
    pub no_descriptions: bool,
}

/// Execute `build`
pub async fn execute(args: BuildArgs, _ctx: &Context) -> CliResult<()> {
    let failures = read_records::<FailureRecord>(&args.failures).await?;
    info!(
        failures = failures.len(),
        skipped = failures.skipped,
        "failures loaded"
    );

    print_heading("Reference corpus");
    let corpus = load_corpus(args.corpus_dir.as_deref(), args.splits_dir.as_deref()).await?;
    print_lines(&[format!("{} reference programs", corpus.len())]);
    if corpus.is_empty() {
        print_warning("no reference programs found; every failure will be unmatched");
    }

    let dataset = FeedbackBuilder::new()
        .with_descriptions(!args.no_descriptions)
        .build(&failures.records, &corpus);

    print_heading("Feedback examples");
    print_lines(&dataset.summary.report_lines());

    let written = write_records(&args.output, &dataset.primary).await?;
    print_success(&format!(
        "{} examples written to {}",
        written,
        args.output.display()
    ));
    if !dataset.descriptions.is_empty() {
        let written = write_records(&args.descriptions_output, &dataset.descriptions).await?;
        print_success(&format!(
            "{} description examples written to {}",
            written,
            args.descriptions_output.display()
        ));
    }
    Ok(())
}

/// Corpus files first, then the split files; earlier sources win on key
/// collisions. A given corpus directory must exist, split files may not.
pub(crate) async fn load_corpus(
    corpus_dir: Option<&Path>,
    splits_dir: Option<&Path>,
) -> CliResult<ReferenceCorpus> {
    let mut builder = CorpusBuilder::default();

    if let Some(dir) = corpus_dir {
        let report = read_dir_records::<ReferenceRecord>(dir, CORPUS_EXTENSION).await?;
        builder.add_source(dir.display().to_string(), report.records);
    }
    if let Some(dir) = splits_dir {
        for name in SPLIT_FILES {
            let path = dir.join(name);
            if let Some(report) = read_records_if_exists::<ReferenceRecord>(&path).await? {
                builder.add_source(name, report.records);
            }
        }
    }

    let lines: Vec<String> = builder
        .stats()
        .iter()
        .map(|s| format!("{}: {} records, {} added", s.name, s.records, s.added))
        .collect();
    print_lines(&lines);
    Ok(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{context, write_lines};
    use crate::error::CliError;
    use nolang_feedback_oracle::SimulatedOracle;
    use nolang_feedback_store::StoreError;
    use serde_json::json;

    #[tokio::test]
    async fn corpus_beats_splits() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = dir.path().join("corpus");
        let splits = dir.path().join("splits");
        std::fs::create_dir_all(&corpus).unwrap();
        std::fs::create_dir_all(&splits).unwrap();
        write_lines(
            &corpus.join("arith.nolt"),
            &[json!({"intent": "negate", "assembly": "NEG\nHALT"})],
        );
        write_lines(
            &splits.join("train.jsonl"),
            &[
                json!({"intent": "negate", "assembly": "PUSH 0\nSUB\nHALT"}),
                json!({"intent": "halt", "assembly": "HALT"}),
            ],
        );

        let corpus = load_corpus(Some(corpus.as_path()), Some(splits.as_path())).await.unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get("negate"), Some("NEG\nHALT"));
        assert_eq!(corpus.get("halt"), Some("HALT"));
    }

    #[tokio::test]
    async fn missing_corpus_dir_is_fatal() {
        let err = load_corpus(Some(Path::new("/nonexistent/corpus")), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Store(StoreError::MissingInput(_))));
    }

    #[tokio::test]
    async fn writes_both_streams() {
        let dir = tempfile::tempdir().unwrap();
        let failures = dir.path().join("failures.jsonl");
        let splits = dir.path().join("splits");
        std::fs::create_dir_all(&splits).unwrap();
        write_lines(
            &splits.join("val.jsonl"),
            &[
                json!({"intent": "negate", "assembly": "NEG\nHALT"}),
                json!({"intent": "halt", "assembly": "HALT"}),
            ],
        );
        write_lines(
            &failures,
            &[
                json!({"key": "negate", "candidateText": "BAD\nHALT", "failureLayer": 1,
                       "failureType": "assembly_syntax", "errorMessage": "assembly failed: BAD",
                       "source": "eval", "timestamp": "2025-01-01T00:00:00"}),
                json!({"key": "halt", "candidateText": "HALT", "failureLayer": 4,
                       "failureType": "description_mismatch",
                       "errorMessage": "Human rejected: description does not match intent",
                       "source": "human_feedback_description",
                       "timestamp": "2025-01-01T00:00:00", "description": "stops"}),
                json!({"key": "square", "candidateText": "HALT", "failureLayer": 1,
                       "failureType": "assembly_syntax", "errorMessage": "x",
                       "source": "eval", "timestamp": "2025-01-01T00:00:00"}),
            ],
        );

        let output = dir.path().join("out/examples.jsonl");
        let descriptions = dir.path().join("out/descriptions.jsonl");
        let args = BuildArgs {
            failures,
            corpus_dir: None,
            splits_dir: Some(splits),
            output: output.clone(),
            descriptions_output: descriptions.clone(),
            no_descriptions: false,
        };
        execute(args, &context(SimulatedOracle::new())).await.unwrap();

        assert_eq!(std::fs::read_to_string(&output).unwrap().lines().count(), 2);
        assert_eq!(
            std::fs::read_to_string(&descriptions).unwrap().lines().count(),
            1
        );
    }
}
