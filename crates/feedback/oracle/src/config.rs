//! Oracle client configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the oracle binary lives and how long each call may take.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Path (or bare name resolved via `PATH`) of the `nolang` binary.
    #[serde(default = "default_binary")]
    pub binary: PathBuf,

    /// Per-subcommand timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_binary() -> PathBuf {
    PathBuf::from("nolang")
}

fn default_timeout_secs() -> u64 {
    30
}

impl OracleConfig {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Locate a built `nolang` binary under a project root.
    ///
    /// Prefers the release build, then the debug build, then whatever `PATH`
    /// resolves. Returns `None` when nothing is found.
    pub fn discover(project_root: &Path) -> Option<Self> {
        let candidates = [
            project_root.join("target").join("release").join("nolang"),
            project_root.join("target").join("debug").join("nolang"),
        ];
        if let Some(found) = candidates.into_iter().find(|p| p.is_file()) {
            return Some(Self::new(found));
        }
        search_path("nolang").map(Self::new)
    }
}

fn search_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
