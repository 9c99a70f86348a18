//! NoLang feedback loop driver
//!
//! Stages:
//! - `validate`: run candidates through the oracle
//! - `collect`: harvest layered failures from runs and human verdicts
//! - `build`: pair failures with reference programs as corrective examples
//! - `evaluate`: run-level metrics
//! - `improve`: gate a retrained model against its baseline

use clap::{Parser, Subcommand};
use nolang_feedback_oracle::OracleConfig;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;

use commands::Context;
use config::FeedbackConfig;
use error::CliResult;

/// NoLang feedback loop CLI
#[derive(Parser)]
#[command(name = "nolang-feedback")]
#[command(about = "Turn model failures into corrective training data", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "NOLANG_FEEDBACK_CONFIG")]
    config: Option<String>,

    /// Log level (overrides configuration)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, global = true)]
    json_logs: bool,

    /// Oracle binary
    #[arg(long, global = true)]
    oracle: Option<PathBuf>,

    /// Project root to search for a built oracle binary
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    /// Concurrent validations
    #[arg(short, long, global = true)]
    workers: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a program or a generation run
    Validate(commands::validate::ValidateArgs),

    /// Collect failures into a unified, deduplicated file
    Collect(commands::collect::CollectArgs),

    /// Build corrective examples from collected failures
    Build(commands::build::BuildArgs),

    /// Compute metrics for a generation run
    Evaluate(commands::evaluate::EvaluateArgs),

    /// Check a retrained model against the improvement gate
    Improve(commands::improve::ImproveArgs),
}

#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = FeedbackConfig::load(cli.config.as_deref())?;

    // Override with CLI args
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    if let Some(workers) = cli.workers {
        config.batch.max_workers = workers;
    }

    init_tracing(&config);

    if let Some(binary) = &cli.oracle {
        config.oracle.binary = binary.clone();
    } else if let Some(root) = &cli.project_root {
        match OracleConfig::discover(root) {
            Some(found) => config.oracle.binary = found.binary,
            None => warn!(root = %root.display(), "no oracle binary found under project root"),
        }
    }
    info!(
        oracle = %config.oracle.binary.display(),
        workers = config.batch.max_workers,
        "configuration loaded"
    );

    let ctx = Context::from_config(config);

    match cli.command {
        Commands::Validate(args) => commands::validate::execute(args, &ctx).await,
        Commands::Collect(args) => commands::collect::execute(args, &ctx).await,
        Commands::Build(args) => commands::build::execute(args, &ctx).await,
        Commands::Evaluate(args) => commands::evaluate::execute(args, &ctx).await,
        Commands::Improve(args) => {
            if !commands::improve::execute(args, &ctx).await? {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn init_tracing(config: &FeedbackConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
