//! Configuration for the feedback CLI

use nolang_feedback_gate::GateThresholds;
use nolang_feedback_oracle::batch::DEFAULT_MAX_WORKERS;
use nolang_feedback_oracle::OracleConfig;
use serde::{Deserialize, Serialize};

/// Environment variable prefix, e.g. `NOLANG_FEEDBACK_ORACLE__TIMEOUT_SECS`.
pub const ENV_PREFIX: &str = "NOLANG_FEEDBACK";

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Oracle binary and per-call timeout
    #[serde(default)]
    pub oracle: OracleConfig,

    /// Batch validation
    #[serde(default)]
    pub batch: BatchConfig,

    /// Improvement gate thresholds
    #[serde(default)]
    pub gate: GateThresholds,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Batch validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Validations in flight
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_max_workers() -> usize {
    DEFAULT_MAX_WORKERS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl FeedbackConfig {
    /// Load configuration: defaults, then the file if given, then environment.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&FeedbackConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
