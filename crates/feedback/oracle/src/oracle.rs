use crate::error::OracleResult;
use async_trait::async_trait;
use std::path::Path;

/// Raw outcome of a witness run.
///
/// A failing run is not an error: the tool exits nonzero when any vector
/// fails and prints whatever per-vector output it managed to produce.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WitnessRun {
    /// Tool exited 0: every vector passed.
    pub all_passed: bool,
    /// Standard output, scanned for per-vector pass markers.
    pub stdout: String,
    /// Diagnostic text (stderr, or stdout when stderr is empty).
    pub diagnostic: String,
}

impl WitnessRun {
    pub fn passed(stdout: impl Into<String>) -> Self {
        Self {
            all_passed: true,
            stdout: stdout.into(),
            diagnostic: String::new(),
        }
    }

    pub fn failed(stdout: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            all_passed: false,
            stdout: stdout.into(),
            diagnostic: diagnostic.into(),
        }
    }
}

/// Capability interface over the external NoLang toolchain.
///
/// Every call takes file paths because that is what the real tool consumes;
/// the caller owns the files and their lifetime.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// `hash <program-file>`: one canonical `HASH` line per `FUNC` block.
    async fn compute_hashes(&self, program_file: &Path) -> OracleResult<String>;

    /// `assemble <program-file> -o <binary-file>`.
    async fn assemble(&self, program_file: &Path, binary_file: &Path) -> OracleResult<()>;

    /// `verify <binary-file>`.
    async fn verify(&self, binary_file: &Path) -> OracleResult<()>;

    /// `witness <binary-file> <witness-file>`.
    async fn run_witnesses(&self, binary_file: &Path, witness_file: &Path)
        -> OracleResult<WitnessRun>;

    /// Name for logging.
    fn name(&self) -> &str {
        "oracle"
    }
}
