// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};
use crate::extractors::Record;
use crate::utils::error::StorageError;

/// Where a run's output goes. Every save replaces the previous file.
pub const DEFAULT_OUTPUT_PATH: &str = "data/violations.json";

pub struct StorageManager {
    output_path: PathBuf,
}

impl StorageManager {
    /// Creates the output's parent directory if it doesn't exist yet.
    pub fn new<P: AsRef<Path>>(output_path: P) -> Result<Self, StorageError> {
        let output_path = output_path.as_ref().to_path_buf();

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(StorageError::IoError)?;
            }
        }

        Ok(Self { output_path })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Writes the record as indented JSON, replacing any earlier run.
    /// The JSON goes to a sibling temp file first, so a failed write leaves the
    /// previous output untouched.
    pub fn save_record(&self, record: &Record) -> Result<PathBuf, StorageError> {
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let tmp_path = self.sibling_path("tmp");
        fs::write(&tmp_path, json + "\n").map_err(StorageError::IoError)?;
        if let Err(e) = fs::rename(&tmp_path, &self.output_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(StorageError::IoError(e));
        }

        tracing::info!("Saved record to {}", self.output_path.display());
        Ok(self.output_path.clone())
    }

    /// Saves the page exactly as downloaded, next to the output file.
    pub fn save_raw_page(&self, html: &str) -> Result<PathBuf, StorageError> {
        let path = self.sibling_path("raw.html");
        fs::write(&path, html).map_err(StorageError::IoError)?;
        tracing::info!("Saved raw page to {}", path.display());
        Ok(path)
    }

    /// `data/violations.json` -> `data/violations.<suffix>`
    pub fn sibling_path(&self, suffix: &str) -> PathBuf {
        let stem = self
            .output_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "output".to_string());
        self.output_path.with_file_name(format!("{}.{}", stem, suffix))
    }
}
