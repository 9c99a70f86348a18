//! Oracle backed by the real `nolang` binary.

use crate::config::OracleConfig;
use crate::error::{OracleError, OracleResult};
use crate::oracle::{Oracle, WitnessRun};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Spawns the configured `nolang` binary for each call.
///
/// Children are killed when their future is dropped, so a caller-side
/// timeout or an aborted batch never leaves a tool process behind.
#[derive(Debug, Clone)]
pub struct ProcessOracle {
    binary: PathBuf,
}

impl ProcessOracle {
    pub fn new(config: &OracleConfig) -> Self {
        Self {
            binary: config.binary.clone(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    async fn run<I, S>(&self, subcommand: &str, args: I) -> OracleResult<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        Command::new(&self.binary)
            .arg(subcommand)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| OracleError::Spawn {
                binary: self.binary.clone(),
                source,
            })
    }

    fn check(subcommand: &str, output: Output) -> OracleResult<Output> {
        if output.status.success() {
            return Ok(output);
        }
        Err(OracleError::Failed {
            command: subcommand.to_string(),
            status: output.status.to_string(),
            diagnostic: diagnostic(&output),
        })
    }
}

/// stderr, or stdout when stderr is empty, trimmed.
fn diagnostic(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

#[async_trait]
impl Oracle for ProcessOracle {
    #[instrument(skip(self), fields(binary = %self.binary.display()))]
    async fn compute_hashes(&self, program_file: &Path) -> OracleResult<String> {
        let output = Self::check("hash", self.run("hash", [program_file]).await?)?;
        debug!(bytes = output.stdout.len(), "hash output received");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    #[instrument(skip(self), fields(binary = %self.binary.display()))]
    async fn assemble(&self, program_file: &Path, binary_file: &Path) -> OracleResult<()> {
        let args: [&OsStr; 3] = [
            program_file.as_os_str(),
            OsStr::new("-o"),
            binary_file.as_os_str(),
        ];
        Self::check("assemble", self.run("assemble", args).await?)?;
        if !binary_file.exists() {
            return Err(OracleError::Failed {
                command: "assemble".into(),
                status: "exit status: 0".into(),
                diagnostic: format!("no binary written to {}", binary_file.display()),
            });
        }
        Ok(())
    }

    #[instrument(skip(self), fields(binary = %self.binary.display()))]
    async fn verify(&self, binary_file: &Path) -> OracleResult<()> {
        Self::check("verify", self.run("verify", [binary_file]).await?)?;
        Ok(())
    }

    #[instrument(skip(self), fields(binary = %self.binary.display()))]
    async fn run_witnesses(
        &self,
        binary_file: &Path,
        witness_file: &Path,
    ) -> OracleResult<WitnessRun> {
        let output = self.run("witness", [binary_file, witness_file]).await?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(WitnessRun::passed(stdout));
        }
        let diagnostic = diagnostic(&output);
        debug!(status = %output.status, "witness run reported failures");
        Ok(WitnessRun::failed(stdout, diagnostic))
    }

    fn name(&self) -> &str {
        "process"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_spawn_error() {
        let oracle = ProcessOracle::new(&OracleConfig::new(
            "/nonexistent/definitely-not-nolang",
        ));
        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("p.nol");
        std::fs::write(&program, "HALT\n").unwrap();

        let err = oracle.compute_hashes(&program).await.unwrap_err();
        assert!(matches!(err, OracleError::Spawn { .. }));
        assert!(err.diagnostic().contains("definitely-not-nolang"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_carries_diagnostic() {
        // `false` ignores its arguments and exits 1 without output.
        let oracle = ProcessOracle::new(&OracleConfig::new("false"));
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("p.nolb");
        let err = oracle.verify(&binary).await.unwrap_err();
        assert!(matches!(err, OracleError::Failed { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn zero_exit_without_binary_is_assembly_failure() {
        // `true` succeeds but writes nothing.
        let oracle = ProcessOracle::new(&OracleConfig::new("true"));
        let dir = tempfile::tempdir().unwrap();
        let err = oracle
            .assemble(&dir.path().join("p.nol"), &dir.path().join("p.nolb"))
            .await
            .unwrap_err();
        assert!(err.diagnostic().contains("no binary written"));
    }
}
