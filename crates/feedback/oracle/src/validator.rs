//! The validation pipeline: normalize, hash, patch, assemble, verify, witness.

use crate::config::OracleConfig;
use crate::error::{OracleError, OracleResult};
use crate::hash::{self, Patch};
use crate::oracle::Oracle;
use crate::process::ProcessOracle;
use crate::witness::WitnessTally;
use nolang_feedback_types::{ValidationResult, ValidationResultBuilder, Witness};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tracing::{debug, instrument, warn};

const PROGRAM_FILE: &str = "program.nol";
const BINARY_FILE: &str = "program.nolb";
const WITNESS_FILE: &str = "witnesses.json";

/// Runs a candidate program through the oracle and reports what it got
/// through.
///
/// Oracle failures never escape as errors: each one becomes a stage-scoped
/// message on the returned [`ValidationResult`].
#[derive(Clone)]
pub struct Validator {
    oracle: Arc<dyn Oracle>,
    timeout: Duration,
}

impl Validator {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self {
            oracle,
            timeout: OracleConfig::default().timeout(),
        }
    }

    /// Validator over the real `nolang` binary.
    pub fn from_config(config: &OracleConfig) -> Self {
        Self::new(Arc::new(ProcessOracle::new(config))).with_timeout(config.timeout())
    }

    /// Bound on each individual oracle call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Validate one candidate, optionally against witness vectors.
    ///
    /// Scratch files live in a private temporary directory that is removed
    /// on every exit path, including cancellation.
    #[instrument(skip_all, fields(oracle = self.oracle.name(), bytes = candidate.len()))]
    pub async fn validate(
        &self,
        candidate: &str,
        witnesses: Option<&[Witness]>,
    ) -> ValidationResult {
        let normalized = hash::normalize(candidate);

        let scratch = match tempfile::Builder::new()
            .prefix("nolang-feedback-")
            .tempdir()
        {
            Ok(dir) => dir,
            Err(e) => {
                return ValidationResult::builder(normalized)
                    .error(format!("scratch directory unavailable: {}", e))
                    .build();
            }
        };

        let result = self.run_stages(&scratch, normalized, witnesses).await;
        debug!(
            assembled = result.assembled(),
            verified = result.verified(),
            witnesses_ok = result.witnesses_ok(),
            "validation finished"
        );
        result
    }

    async fn run_stages(
        &self,
        scratch: &TempDir,
        normalized: String,
        witnesses: Option<&[Witness]>,
    ) -> ValidationResult {
        let program_file = scratch.path().join(PROGRAM_FILE);
        let binary_file = scratch.path().join(BINARY_FILE);

        if let Err(e) = tokio::fs::write(&program_file, normalized.as_bytes()).await {
            return ValidationResult::builder(normalized)
                .error(format!("scratch file error: {}", e))
                .build();
        }

        let mut text = normalized;
        let mut hash_patched = false;
        let mut warnings = Vec::new();

        if hash::has_placeholder(&text) {
            let canonical = match self
                .bounded("hash", self.oracle.compute_hashes(&program_file))
                .await
            {
                Ok(output) => output,
                Err(e) => {
                    return ValidationResult::builder(text)
                        .error(format!("hash computation failed ({})", e.diagnostic()))
                        .build();
                }
            };

            let patch = hash::patch(&text, &canonical);
            if let Patch::Fallback {
                original_slots,
                canonical_slots,
                ..
            } = &patch
            {
                warn!(
                    original_slots,
                    canonical_slots, "hash slot count mismatch, using oracle output verbatim"
                );
                warnings.push(format!(
                    "hash slot count mismatch: program has {}, oracle returned {}; oracle output used verbatim",
                    original_slots, canonical_slots
                ));
            }
            text = patch.into_text();
            hash_patched = true;

            if let Err(e) = tokio::fs::write(&program_file, text.as_bytes()).await {
                return ValidationResult::builder(text)
                    .hash_patched(true)
                    .error(format!("scratch file error: {}", e))
                    .build();
            }
        }

        let mut builder = ValidationResult::builder(text).hash_patched(hash_patched);
        for warning in warnings {
            builder = builder.warning(warning);
        }

        if let Err(e) = self
            .bounded("assemble", self.oracle.assemble(&program_file, &binary_file))
            .await
        {
            return builder
                .error(format!("assembly failed: {}", e.diagnostic()))
                .build();
        }
        builder = builder.assembled(true);

        builder = match self.bounded("verify", self.oracle.verify(&binary_file)).await {
            Ok(()) => builder.verified(true),
            Err(e) => builder.error(format!("verification failed: {}", e.diagnostic())),
        };

        let vectors = witnesses.filter(|w| !w.is_empty());
        if let Some(vectors) = vectors {
            if binary_file.exists() {
                builder = self
                    .run_witnesses(builder, scratch.path(), &binary_file, vectors)
                    .await;
            }
        }

        if let Err(e) = tokio::fs::remove_file(&binary_file).await {
            debug!(error = %e, "binary artifact already gone");
        }
        builder.build()
    }

    async fn run_witnesses(
        &self,
        builder: ValidationResultBuilder,
        scratch: &Path,
        binary_file: &Path,
        vectors: &[Witness],
    ) -> ValidationResultBuilder {
        let total = vectors.len();
        let witness_file = scratch.join(WITNESS_FILE);

        let run = match write_vectors(&witness_file, vectors).await {
            Ok(()) => {
                self.bounded(
                    "witness",
                    self.oracle.run_witnesses(binary_file, &witness_file),
                )
                .await
            }
            Err(e) => Err(e),
        };

        let run = match run {
            Ok(run) => run,
            Err(e) => {
                return builder
                    .witnesses(total, 0)
                    .error(format!("witness run failed: {}", e.diagnostic()));
            }
        };

        let tally = WitnessTally::from_run(total, &run);
        let mut builder = builder.witnesses(tally.total, tally.ok);
        if !run.all_passed {
            builder = builder.error(format!("witnesses failed: {}", run.diagnostic));
        }
        if let Some(anomaly) = tally.anomaly {
            warn!(total, ok = tally.ok, "{}", anomaly);
            builder = builder.warning(anomaly);
        }
        builder
    }

    async fn bounded<T, F>(&self, command: &str, call: F) -> OracleResult<T>
    where
        F: Future<Output = OracleResult<T>>,
    {
        debug!(command, "oracle call");
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(OracleError::Timeout {
                command: command.to_string(),
                secs: self.timeout.as_secs(),
            }),
        }
    }
}

async fn write_vectors(path: &Path, vectors: &[Witness]) -> OracleResult<()> {
    let encoded = serde_json::to_vec(vectors)?;
    tokio::fs::write(path, encoded).await?;
    Ok(())
}
