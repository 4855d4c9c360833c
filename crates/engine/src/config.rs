//! Store configuration via TOML
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration. The defaults give fsync-per-append durability and manual
//! checkpointing.

use serde::{Deserialize, Serialize};
use std::path::Path;
use vecmini_core::{DistanceMetric, VectorError, VectorResult};

/// Configuration for a [`VectorStore`](crate::VectorStore).
///
/// # Example
///
/// ```toml
/// # fsync the WAL after every append (default: true)
/// sync_wal = true
///
/// # Checkpoint automatically after this many WAL appends.
/// # Omit for manual checkpointing only.
/// checkpoint_every = 1000
///
/// # Default metric for searches: "cosine", "euclidean" or "manhattan"
/// metric = "cosine"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// fsync the WAL after every append
    pub sync_wal: bool,
    /// Run a checkpoint once this many WAL appends have accumulated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkpoint_every: Option<u64>,
    /// Metric used by searches that do not name one
    pub metric: DistanceMetric,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            sync_wal: true,
            checkpoint_every: None,
            metric: DistanceMetric::Cosine,
        }
    }
}

impl StoreConfig {
    /// Config for tests: no fsync, manual checkpoints
    pub fn for_testing() -> Self {
        StoreConfig {
            sync_wal: false,
            ..Default::default()
        }
    }

    /// Set WAL fsync behaviour
    pub fn with_sync_wal(mut self, sync: bool) -> Self {
        self.sync_wal = sync;
        self
    }

    /// Checkpoint automatically after `appends` WAL appends
    pub fn with_checkpoint_every(mut self, appends: u64) -> Self {
        self.checkpoint_every = Some(appends);
        self
    }

    /// Set the default search metric
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> VectorResult<()> {
        if self.checkpoint_every == Some(0) {
            return Err(VectorError::config("checkpoint_every must be greater than 0"));
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> VectorResult<Self> {
        let config: StoreConfig = toml::from_str(content)
            .map_err(|e| VectorError::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> VectorResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            VectorError::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> VectorResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| VectorError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)
            .map_err(|e| VectorError::io(format!("write config {}", path.display()), e))
    }
}
