//! Scripted oracle for tests (no processes are spawned).

use crate::error::{OracleError, OracleResult};
use crate::hash::HASH_PLACEHOLDER;
use crate::oracle::{Oracle, WitnessRun};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::Path;
use std::time::Duration;

/// Simulated toolchain.
///
/// - `hash` emits one canonical line per `FUNC` line, unless overridden.
/// - `assemble` copies the program text into the binary file and fails when
///   the text contains a configured pattern, stalling first on a configured
///   slow pattern.
/// - `verify` fails when a placeholder hash survived or a configured pattern
///   is present.
/// - `witness` returns the first scripted run whose pattern matches, else a
///   clean pass.
pub struct SimulatedOracle {
    hash_failure: Option<String>,
    hash_output: Option<String>,
    assembly_errors: Vec<(String, String)>,
    verify_errors: Vec<(String, String)>,
    witness_runs: Vec<(String, WitnessRun)>,
    delay: Option<Duration>,
    stalls: Vec<(String, Duration)>,
    calls: Mutex<Vec<String>>,
}

impl SimulatedOracle {
    pub fn new() -> Self {
        Self {
            hash_failure: None,
            hash_output: None,
            assembly_errors: Vec::new(),
            verify_errors: Vec::new(),
            witness_runs: Vec::new(),
            delay: None,
            stalls: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make every `hash` call fail with this diagnostic.
    pub fn with_hash_failure(mut self, diagnostic: impl Into<String>) -> Self {
        self.hash_failure = Some(diagnostic.into());
        self
    }

    /// Return this text from `hash` instead of deriving lines from `FUNC`s.
    pub fn with_hash_output(mut self, output: impl Into<String>) -> Self {
        self.hash_output = Some(output.into());
        self
    }

    /// Fail `assemble` for programs containing `pattern`.
    pub fn with_assembly_error(
        mut self,
        pattern: impl Into<String>,
        diagnostic: impl Into<String>,
    ) -> Self {
        self.assembly_errors.push((pattern.into(), diagnostic.into()));
        self
    }

    /// Fail `verify` for programs containing `pattern`.
    pub fn with_verify_error(
        mut self,
        pattern: impl Into<String>,
        diagnostic: impl Into<String>,
    ) -> Self {
        self.verify_errors.push((pattern.into(), diagnostic.into()));
        self
    }

    /// Script the witness run for programs containing `pattern`.
    pub fn with_witness_run(mut self, pattern: impl Into<String>, run: WitnessRun) -> Self {
        self.witness_runs.push((pattern.into(), run));
        self
    }

    /// Sleep before answering every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sleep in `assemble` for programs containing `pattern`.
    pub fn with_stall(mut self, pattern: impl Into<String>, delay: Duration) -> Self {
        self.stalls.push((pattern.into(), delay));
        self
    }

    /// Subcommands invoked so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, subcommand: &str) -> usize {
        self.calls.lock().iter().filter(|c| *c == subcommand).count()
    }

    async fn enter(&self, subcommand: &str) {
        self.calls.lock().push(subcommand.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn canonical_hashes(program: &str) -> String {
        program
            .lines()
            .filter(|line| line.trim_start().starts_with("FUNC"))
            .enumerate()
            .map(|(i, _)| {
                let seed = i as u32 + 1;
                format!(
                    "HASH 0x{:04x} 0x{:04x} 0x{:04x}\n",
                    (seed * 0x1f3d) & 0xffff,
                    (seed * 0x0a5b) & 0xffff,
                    (seed * 0x7c01) & 0xffff
                )
            })
            .collect()
    }
}

impl Default for SimulatedOracle {
    fn default() -> Self {
        Self::new()
    }
}

fn failed(command: &str, diagnostic: &str) -> OracleError {
    OracleError::Failed {
        command: command.to_string(),
        status: "exit status: 1".to_string(),
        diagnostic: diagnostic.to_string(),
    }
}

fn first_match<'a, T>(rules: &'a [(String, T)], text: &str) -> Option<&'a T> {
    rules
        .iter()
        .find(|(pattern, _)| text.contains(pattern.as_str()))
        .map(|(_, value)| value)
}

#[async_trait]
impl Oracle for SimulatedOracle {
    async fn compute_hashes(&self, program_file: &Path) -> OracleResult<String> {
        self.enter("hash").await;
        if let Some(diagnostic) = &self.hash_failure {
            return Err(failed("hash", diagnostic));
        }
        if let Some(output) = &self.hash_output {
            return Ok(output.clone());
        }
        let program = tokio::fs::read_to_string(program_file).await?;
        Ok(Self::canonical_hashes(&program))
    }

    async fn assemble(&self, program_file: &Path, binary_file: &Path) -> OracleResult<()> {
        self.enter("assemble").await;
        let program = tokio::fs::read_to_string(program_file).await?;
        if let Some(stall) = first_match(&self.stalls, &program) {
            tokio::time::sleep(*stall).await;
        }
        if let Some(diagnostic) = first_match(&self.assembly_errors, &program) {
            return Err(failed("assemble", diagnostic));
        }
        tokio::fs::write(binary_file, program.as_bytes()).await?;
        Ok(())
    }

    async fn verify(&self, binary_file: &Path) -> OracleResult<()> {
        self.enter("verify").await;
        let program = tokio::fs::read_to_string(binary_file).await?;
        if program.contains(HASH_PLACEHOLDER) {
            return Err(failed("verify", "hash mismatch: placeholder hash in function"));
        }
        if let Some(diagnostic) = first_match(&self.verify_errors, &program) {
            return Err(failed("verify", diagnostic));
        }
        Ok(())
    }

    async fn run_witnesses(
        &self,
        binary_file: &Path,
        witness_file: &Path,
    ) -> OracleResult<WitnessRun> {
        self.enter("witness").await;
        let program = tokio::fs::read_to_string(binary_file).await?;
        // The vectors file must exist and be a JSON array, as the real tool expects.
        let vectors = tokio::fs::read(witness_file).await?;
        let vectors: Vec<serde_json::Value> = serde_json::from_slice(&vectors)?;
        if let Some(run) = first_match(&self.witness_runs, &program) {
            return Ok(run.clone());
        }
        let stdout: String = (0..vectors.len())
            .map(|i| format!("witness {}: PASS\n", i))
            .collect();
        Ok(WitnessRun::passed(stdout))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_emits_one_line_per_func() {
        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("p.nol");
        std::fs::write(&program, "FUNC 1 2\nRET\nENDFUNC\nFUNC 0 1\nRET\nENDFUNC\nHALT\n")
            .unwrap();

        let oracle = SimulatedOracle::new();
        let output = oracle.compute_hashes(&program).await.unwrap();
        assert_eq!(output.lines().count(), 2);
        assert!(output.lines().all(|l| l != HASH_PLACEHOLDER));
        assert_eq!(oracle.calls(), vec!["hash"]);
    }

    #[tokio::test]
    async fn assembly_error_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("p.nol");
        std::fs::write(&program, "BOGUS\nHALT\n").unwrap();

        let oracle = SimulatedOracle::new().with_assembly_error("BOGUS", "unknown opcode BOGUS");
        let err = oracle
            .assemble(&program, &dir.path().join("p.nolb"))
            .await
            .unwrap_err();
        assert_eq!(err.diagnostic(), "unknown opcode BOGUS");
    }

    #[tokio::test]
    async fn verify_rejects_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("p.nolb");
        std::fs::write(&binary, format!("FUNC 0 1\n{}\nENDFUNC\n", HASH_PLACEHOLDER)).unwrap();

        let oracle = SimulatedOracle::new();
        assert!(oracle.verify(&binary).await.is_err());
    }

    #[tokio::test]
    async fn scripted_witness_run() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("p.nolb");
        let vectors = dir.path().join("w.json");
        std::fs::write(&binary, "ADD\nHALT\n").unwrap();
        std::fs::write(&vectors, "[{}, {}]").unwrap();

        let oracle = SimulatedOracle::new()
            .with_witness_run("ADD", WitnessRun::failed("PASS\nFAIL\n", "1 failed"));
        let run = oracle.run_witnesses(&binary, &vectors).await.unwrap();
        assert!(!run.all_passed);
        assert_eq!(oracle.call_count("witness"), 1);
    }
}
