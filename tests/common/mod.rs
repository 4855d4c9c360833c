//! Shared test utilities for the integration suites.
//!
//! Import via `mod common;` from any test's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::fs::{self, OpenOptions};
use std::io::{Seek, SeekFrom, Write as IoWrite};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub use vecmini::{
    DistanceMetric, StoreConfig, TextEmbedder, VectorId, VectorMatch, VectorRecord, VectorStore,
};

/// Database file name used by every test store
pub const DB_FILE: &str = "vectors.vdb";

// ============================================================================
// TestStore - store wrapper that can be closed and reopened
// ============================================================================

/// A store living in its own temp directory.
pub struct TestStore {
    pub store: Option<VectorStore>,
    pub dir: TempDir,
    pub config: StoreConfig,
}

impl TestStore {
    /// Store with fsync disabled.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::for_testing())
    }

    /// Store with fsync on every WAL append.
    pub fn new_strict() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let store = VectorStore::open_with_config(dir.path().join(DB_FILE), config.clone())
            .expect("Failed to open test store");
        TestStore {
            store: Some(store),
            dir,
            config,
        }
    }

    pub fn store(&self) -> &VectorStore {
        self.store.as_ref().expect("store is closed")
    }

    /// Drop the store without a checkpoint, like a process exit.
    pub fn close(&mut self) {
        self.store = None;
    }

    /// Close and open again from the same files.
    pub fn reopen(&mut self) {
        self.close();
        let store = VectorStore::open_with_config(self.db_path(), self.config.clone())
            .expect("Failed to reopen store");
        self.store = Some(store);
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join(DB_FILE)
    }

    pub fn wal_path(&self) -> PathBuf {
        self.dir.path().join("vectors.wal")
    }

    pub fn save(&self, id: &str, values: &[f64]) {
        self.store()
            .save(record(id, values))
            .expect("save failed");
    }
}

// ============================================================================
// Helpers
// ============================================================================

pub fn record(id: &str, values: &[f64]) -> VectorRecord {
    VectorRecord::new(id, values.to_vec()).expect("valid record")
}

pub fn ids(matches: &[VectorMatch]) -> Vec<String> {
    matches.iter().map(|m| m.id().to_string()).collect()
}

/// Overwrite bytes at `offset`.
pub fn corrupt_file_at_offset(path: &Path, offset: u64, bytes: &[u8]) {
    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .expect("Failed to open file for corruption");
    file.seek(SeekFrom::Start(offset))
        .expect("Failed to seek in file");
    file.write_all(bytes)
        .expect("Failed to write corruption bytes");
}

pub fn truncate_file(path: &Path, new_size: u64) {
    let file = OpenOptions::new()
        .write(true)
        .open(path)
        .expect("Failed to open file for truncation");
    file.set_len(new_size).expect("Failed to truncate file");
}

/// Append raw bytes, simulating a write cut short by a crash.
pub fn append_raw(path: &Path, bytes: &[u8]) {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .expect("Failed to open file for append");
    file.write_all(bytes).expect("Failed to append bytes");
}

/// Get file size (0 if not found).
pub fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
