use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::core::error::{Error, Result};
use crate::storage::wal::SyncMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage_path: PathBuf,
    pub stop_words_path: Option<PathBuf>,

    // BM25
    pub k1: f32,                 // Term frequency saturation
    pub b: f32,                  // Length normalization strength
    pub default_page_size: usize,

    // Mutation pipeline
    pub max_batch_docs: usize,     // Per-call cap for add/delete
    pub max_workers: usize,        // Fan-out bound for analysis and lookups
    pub remove_batch_limit: usize, // Key deletes per atomic sub-batch on index removal

    // Disk store
    pub sync_mode: SyncMode,
    pub compaction_threshold_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_path: PathBuf::from("./data"),
            stop_words_path: None,

            k1: 1.4,
            b: 0.75,
            default_page_size: 10,

            max_batch_docs: 1000,
            max_workers: 5,
            remove_batch_limit: 20_000,

            sync_mode: SyncMode::Batch,
            compaction_threshold_bytes: 64 * 1024 * 1024, // 64MB of WAL before checkpoint
        }
    }
}

impl Config {
    pub fn with_storage_path(path: impl Into<PathBuf>) -> Self {
        Config {
            storage_path: path.into(),
            ..Config::default()
        }
    }

    /// Load a JSON config; unspecified fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let data = fs::read(path)?;
        let config = serde_json::from_slice(&data)?;
        Ok(config)
    }

    /// Directory holding the key-value store files
    pub fn db_path(&self) -> PathBuf {
        self.storage_path.join("db")
    }

    /// Explicit stop-word file, else `stop_word.txt` beside the store
    pub fn stop_words_file(&self) -> PathBuf {
        self.stop_words_path
            .clone()
            .unwrap_or_else(|| self.storage_path.join("stop_word.txt"))
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.k1.is_finite() && self.k1 >= 0.0) {
            return Err(Error::configuration(format!("k1 must be a non-negative number, got {}", self.k1)));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Error::configuration(format!("b must be within [0, 1], got {}", self.b)));
        }
        if self.default_page_size == 0 {
            return Err(Error::configuration("default_page_size must be positive"));
        }
        if self.max_batch_docs == 0 || self.max_workers == 0 || self.remove_batch_limit == 0 {
            return Err(Error::configuration(
                "max_batch_docs, max_workers and remove_batch_limit must be positive",
            ));
        }
        Ok(())
    }
}
