//! Single-document pretty JSON files (metric sets, reports).

use crate::error::{StoreError, StoreResult};
use crate::jsonl::ensure_parent;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use tracing::debug;

pub async fn write_json<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    ensure_parent(path).await?;
    let mut json = serde_json::to_vec_pretty(value).map_err(|e| StoreError::json(path, e))?;
    json.push(b'\n');
    tokio::fs::write(path, json)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    debug!(file = %path.display(), "json written");
    Ok(())
}

/// Read a required JSON document.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    if !path.exists() {
        return Err(StoreError::MissingInput(path.to_path_buf()));
    }
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| StoreError::json(path, e))
}
