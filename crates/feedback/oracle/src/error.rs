use std::path::PathBuf;

/// Errors from a single oracle invocation.
///
/// None of these are fatal to a validation run: the validator turns each one
/// into a stage-scoped error string on the result.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("cannot run oracle binary {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` timed out after {secs}s")]
    Timeout { command: String, secs: u64 },
    #[error("`{command}` exited with {status}: {diagnostic}")]
    Failed {
        command: String,
        status: String,
        diagnostic: String,
    },
    #[error("scratch file error: {0}")]
    Scratch(#[from] std::io::Error),
    #[error("cannot encode witness vectors: {0}")]
    WitnessEncoding(#[from] serde_json::Error),
}

impl OracleError {
    /// Text recorded on a `ValidationResult` for this failure.
    ///
    /// For a failed tool run this is the tool's own diagnostic, not the
    /// wrapper message.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Failed { diagnostic, .. } => diagnostic.clone(),
            other => other.to_string(),
        }
    }
}

/// Result alias for oracle calls.
pub type OracleResult<T> = Result<T, OracleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_diagnostic_is_tool_output() {
        let e = OracleError::Failed {
            command: "assemble".into(),
            status: "exit status: 1".into(),
            diagnostic: "error: unknown opcode FOO".into(),
        };
        assert_eq!(e.diagnostic(), "error: unknown opcode FOO");
        assert!(format!("{}", e).contains("assemble"));
    }

    #[test]
    fn timeout_display() {
        let e = OracleError::Timeout {
            command: "verify".into(),
            secs: 30,
        };
        assert_eq!(e.diagnostic(), "`verify` timed out after 30s");
    }
}
