use nolang_feedback_store::StoreError;

/// Errors that end a CLI run.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("cannot read program {path}: {source}")]
    Program {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Usage(String),
}

pub type CliResult<T> = Result<T, CliError>;
