//! Whole-dataset snapshot file
//!
//! The snapshot is the durable baseline: every mutating store operation
//! rewrites it in full. That write amplification is accepted for the small
//! datasets this store targets; incremental persistence is out of scope.
//!
//! # Format
//!
//! ```text
//! magic    4 bytes  "VMSN"
//! version  u32 LE
//! crc32    u32 LE   over the body
//! length   u64 LE   body length in bytes
//! body     MessagePack array of records, sorted by id
//! ```
//!
//! # Crash Safety
//!
//! 1. Write header and body to `<snapshot>.tmp`
//! 2. fsync the temporary file
//! 3. Atomic rename over the snapshot path
//! 4. fsync the parent directory
//!
//! A reader therefore sees either the previous snapshot or the new one,
//! never a partial file.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use vecmini_core::{VectorError, VectorId, VectorRecord, VectorResult};

use crate::paths::temp_path_for;

/// Magic bytes at the start of every snapshot file
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"VMSN";

/// Current snapshot format version
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Size of the fixed header preceding the body
pub const SNAPSHOT_HEADER_SIZE: usize = 4 + 4 + 4 + 8;

/// Information about a written snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    /// Number of records written
    pub records: usize,
    /// Total file size in bytes
    pub bytes: u64,
    /// CRC32 of the body
    pub crc: u32,
}

/// Reads and rewrites the snapshot file of one database
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a snapshot store for `path`; nothing is touched on disk
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SnapshotStore { path: path.into() }
    }

    /// Path of the snapshot file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if a snapshot file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Replace the snapshot with `records` using the crash-safe write pattern
    ///
    /// Creates parent directories if needed. If two records share an id the
    /// later one wins when the file is read back.
    ///
    /// # Errors
    ///
    /// `Io` on any file-system failure. The previous snapshot, if any, is
    /// left in place.
    pub fn write(&self, records: &[VectorRecord]) -> VectorResult<SnapshotInfo> {
        let mut sorted: Vec<&VectorRecord> = records.iter().collect();
        sorted.sort_by(|a, b| a.id().cmp(b.id()));

        let body =
            rmp_serde::to_vec(&sorted).map_err(|e| VectorError::serialization(e.to_string()))?;
        let crc = crc32fast::hash(&body);

        let mut bytes = Vec::with_capacity(SNAPSHOT_HEADER_SIZE + body.len());
        bytes.extend_from_slice(&SNAPSHOT_MAGIC);
        bytes.extend_from_slice(&SNAPSHOT_FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&crc.to_le_bytes());
        bytes.extend_from_slice(&(body.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&body);

        let parent = self.parent_dir();
        if let Some(dir) = parent {
            std::fs::create_dir_all(dir).map_err(|e| self.io_error("create directory", e))?;
        }

        // Step 1: Write to temporary file
        let temp_path = temp_path_for(&self.path);
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&temp_path)
            .map_err(|e| self.io_error("create temp", e))?;
        file.write_all(&bytes).map_err(|e| self.io_error("write temp", e))?;

        // Step 2: fsync the file
        file.sync_all().map_err(|e| self.io_error("fsync temp", e))?;
        drop(file);

        // Step 3: Atomic rename
        std::fs::rename(&temp_path, &self.path).map_err(|e| self.io_error("rename", e))?;

        // Step 4: fsync parent directory (not supported on every platform)
        let dir = parent.unwrap_or_else(|| Path::new("."));
        if let Err(e) = File::open(dir).and_then(|d| d.sync_all()) {
            debug!(path = %dir.display(), error = %e, "Snapshot directory fsync skipped");
        }

        debug!(path = %self.path.display(), records = sorted.len(), bytes = bytes.len(), "Snapshot written");

        Ok(SnapshotInfo {
            records: sorted.len(),
            bytes: bytes.len() as u64,
            crc,
        })
    }

    /// Load the snapshot, treating any failure as "no prior data"
    ///
    /// A missing file is silently empty. An unreadable or corrupt file is
    /// logged as a warning and also yields an empty map, so the database can
    /// still start.
    pub fn read(&self) -> HashMap<VectorId, VectorRecord> {
        match self.try_read() {
            Ok(Some(map)) => map,
            Ok(None) => HashMap::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not load existing snapshot, starting empty");
                HashMap::new()
            }
        }
    }

    /// Load the snapshot, reporting failures
    ///
    /// Returns `Ok(None)` if no snapshot file exists.
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, `Corruption` if the header, length or
    /// checksum is wrong, `Serialization` if the body cannot be decoded.
    pub fn try_read(&self) -> VectorResult<Option<HashMap<VectorId, VectorRecord>>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error("read", e)),
        };

        let body = parse_envelope(&bytes)?;
        let records: Vec<VectorRecord> =
            rmp_serde::from_slice(body).map_err(|e| VectorError::serialization(e.to_string()))?;

        let mut map = HashMap::with_capacity(records.len());
        for record in records {
            map.insert(record.id().clone(), record);
        }
        Ok(Some(map))
    }

    /// Remove a temporary file left behind by a crash during `write`
    ///
    /// Returns true if a file was removed.
    pub fn cleanup_temp_file(&self) -> VectorResult<bool> {
        let temp_path = temp_path_for(&self.path);
        match std::fs::remove_file(&temp_path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(self.io_error("remove temp", e)),
        }
    }

    fn parent_dir(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    fn io_error(&self, op: &str, e: io::Error) -> VectorError {
        VectorError::io(format!("snapshot {} {}", op, self.path.display()), e)
    }
}

fn parse_envelope(bytes: &[u8]) -> VectorResult<&[u8]> {
    if bytes.len() < SNAPSHOT_HEADER_SIZE {
        return Err(VectorError::corruption(format!(
            "snapshot too short: {} bytes",
            bytes.len()
        )));
    }
    if bytes[0..4] != SNAPSHOT_MAGIC {
        return Err(VectorError::corruption("bad snapshot magic"));
    }

    let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    if version != SNAPSHOT_FORMAT_VERSION {
        return Err(VectorError::corruption(format!(
            "unsupported snapshot version {}",
            version
        )));
    }

    let crc = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&bytes[12..20]);
    let len = u64::from_le_bytes(len_bytes);

    let body = &bytes[SNAPSHOT_HEADER_SIZE..];
    if body.len() as u64 != len {
        return Err(VectorError::corruption(format!(
            "snapshot body length {} does not match header {}",
            body.len(),
            len
        )));
    }
    let actual = crc32fast::hash(body);
    if actual != crc {
        return Err(VectorError::corruption(format!(
            "snapshot CRC mismatch: expected {:08x}, got {:08x}",
            crc, actual
        )));
    }
    Ok(body)
}
