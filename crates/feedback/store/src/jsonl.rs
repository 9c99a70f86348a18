//! JSON Lines files: one record per line.

use crate::error::{StoreError, StoreResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tracing::{debug, warn};

/// Records read from one or more files, with the lines that were skipped.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadReport<T> {
    pub records: Vec<T>,
    /// Non-blank lines seen.
    pub lines: usize,
    /// Lines that failed to parse.
    pub skipped: usize,
}

impl<T> Default for LoadReport<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            lines: 0,
            skipped: 0,
        }
    }
}

impl<T> LoadReport<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn merge(&mut self, other: LoadReport<T>) {
        self.records.extend(other.records);
        self.lines += other.lines;
        self.skipped += other.skipped;
    }
}

/// Read every record of a required JSONL file.
///
/// A missing file is [`StoreError::MissingInput`]. Blank lines are ignored;
/// malformed or non-UTF-8 lines are skipped with a warning naming file and
/// line.
pub async fn read_records<T: DeserializeOwned>(path: &Path) -> StoreResult<LoadReport<T>> {
    if !path.exists() {
        return Err(StoreError::MissingInput(path.to_path_buf()));
    }

    let file = File::open(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut report = LoadReport::default();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .await
            .map_err(|e| StoreError::io(path, e))?;
        if read == 0 {
            break;
        }
        line_no += 1;
        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                report.lines += 1;
                report.skipped += 1;
                warn!(file = %path.display(), line = line_no, error = %e, "skipping undecodable record");
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        report.lines += 1;
        match serde_json::from_str::<T>(line) {
            Ok(record) => report.records.push(record),
            Err(e) => {
                warn!(file = %path.display(), line = line_no, error = %e, "skipping malformed record");
                report.skipped += 1;
            }
        }
    }

    debug!(
        file = %path.display(),
        records = report.records.len(),
        skipped = report.skipped,
        "records loaded"
    );
    Ok(report)
}

/// Like [`read_records`], but an absent file yields `None`.
pub async fn read_records_if_exists<T: DeserializeOwned>(
    path: &Path,
) -> StoreResult<Option<LoadReport<T>>> {
    match read_records(path).await {
        Ok(report) => Ok(Some(report)),
        Err(StoreError::MissingInput(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Files in `dir` with the given extension, sorted by name.
pub async fn list_files(dir: &Path, extension: &str) -> StoreResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(StoreError::MissingInput(dir.to_path_buf()));
    }
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| StoreError::io(dir, e))?;
    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| StoreError::io(dir, e))?
    {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Read every record from the files in `dir` with the given extension, in
/// file-name order.
pub async fn read_dir_records<T: DeserializeOwned>(
    dir: &Path,
    extension: &str,
) -> StoreResult<LoadReport<T>> {
    let mut report = LoadReport::default();
    for file in list_files(dir, extension).await? {
        report.merge(read_records(&file).await?);
    }
    Ok(report)
}

/// Write records as JSON Lines, replacing the file and creating parent
/// directories. Returns the number of records written.
pub async fn write_records<T: Serialize>(path: &Path, records: &[T]) -> StoreResult<usize> {
    ensure_parent(path).await?;
    let file = File::create(path)
        .await
        .map_err(|e| StoreError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    for record in records {
        let json = serde_json::to_string(record).map_err(|e| StoreError::json(path, e))?;
        writer
            .write_all(json.as_bytes())
            .await
            .map_err(|e| StoreError::io(path, e))?;
        writer
            .write_all(b"\n")
            .await
            .map_err(|e| StoreError::io(path, e))?;
    }
    writer.flush().await.map_err(|e| StoreError::io(path, e))?;

    debug!(file = %path.display(), records = records.len(), "records written");
    Ok(records.len())
}

pub(crate) async fn ensure_parent(path: &Path) -> StoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }
    Ok(())
}
