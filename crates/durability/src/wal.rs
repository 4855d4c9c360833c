//! Write-ahead log
//!
//! Every mutation is journaled here before it reaches the in-memory index or
//! the snapshot, so a crash between those steps is recovered on the next open.
//!
//! ## File Format
//!
//! Newline-delimited JSON, one entry per line, in commit order:
//!
//! ```text
//! {"id":"doc1","values":[1.0,2.0,3.0]}
//! {"id":"doc1","deleted":true}
//! ```
//!
//! Line framing makes recovery a forward scan: a line torn by a crash fails
//! to parse and is skipped, and every complete line before and after it is
//! still recovered.
//!
//! ## Lifecycle
//!
//! The log is never truncated by an individual write. It is removed only by
//! `truncate()`, which the store calls at checkpoints and after a startup
//! recovery has been folded into a fresh snapshot.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::warn;
use vecmini_core::{VectorError, VectorId, VectorRecord, VectorResult};

/// A single journaled operation
#[derive(Debug, Clone, PartialEq)]
pub enum WalEntry {
    /// Insert or overwrite of a record
    Insert(VectorRecord),
    /// Removal of an id
    Delete(VectorId),
}

/// On-disk line shape
///
/// Inserts carry `values`; deletes carry `deleted: true` and no values.
#[derive(Serialize, Deserialize)]
struct WalLine {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "is_false")]
    deleted: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl WalEntry {
    /// The id this entry applies to
    pub fn id(&self) -> &VectorId {
        match self {
            WalEntry::Insert(record) => record.id(),
            WalEntry::Delete(id) => id,
        }
    }

    /// Encode as one JSON line, without the trailing newline
    pub fn encode_line(&self) -> VectorResult<String> {
        let line = match self {
            WalEntry::Insert(record) => WalLine {
                id: record.id().as_str().to_string(),
                values: Some(record.to_vec()),
                deleted: false,
            },
            WalEntry::Delete(id) => WalLine {
                id: id.as_str().to_string(),
                values: None,
                deleted: true,
            },
        };
        serde_json::to_string(&line).map_err(|e| VectorError::serialization(e.to_string()))
    }

    /// Decode one line (surrounding whitespace is ignored)
    pub fn decode_line(line: &str) -> VectorResult<Self> {
        let parsed: WalLine = serde_json::from_str(line.trim())
            .map_err(|e| VectorError::serialization(e.to_string()))?;
        match (parsed.deleted, parsed.values) {
            (false, Some(values)) => Ok(WalEntry::Insert(VectorRecord::new(parsed.id, values)?)),
            (true, None) => Ok(WalEntry::Delete(VectorId::new(parsed.id)?)),
            (false, None) => Err(VectorError::serialization("Missing values field")),
            (true, Some(_)) => Err(VectorError::serialization(
                "Delete entry must not carry values",
            )),
        }
    }
}

/// Counters from one replay pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplayStats {
    /// Insert lines parsed
    pub inserts: usize,
    /// Delete lines parsed
    pub tombstones: usize,
    /// Lines skipped because they did not parse
    pub malformed: usize,
}

impl ReplayStats {
    /// Total lines that parsed
    pub fn entries(&self) -> usize {
        self.inserts + self.tombstones
    }
}

/// Append-only journal backed by a single file
///
/// The file is created lazily by the first append. All methods take `&self`;
/// callers that interleave appends from several threads must serialize them
/// (the vector store does so with its writer lock).
#[derive(Debug, Clone)]
pub struct WriteAheadLog {
    path: PathBuf,
    sync: bool,
}

impl WriteAheadLog {
    /// Create a WAL handle for `path` that fsyncs every append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        WriteAheadLog {
            path: path.into(),
            sync: true,
        }
    }

    /// Enable or disable the fsync after each append
    ///
    /// Disabling it trades crash durability for speed; only tests and
    /// benchmarks should do so.
    pub fn with_sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Journal an insert
    pub fn append(&self, record: &VectorRecord) -> VectorResult<()> {
        self.append_entry(&WalEntry::Insert(record.clone()))
    }

    /// Journal a delete
    pub fn append_delete(&self, id: &VectorId) -> VectorResult<()> {
        self.append_entry(&WalEntry::Delete(id.clone()))
    }

    /// Encode `entry` as one line, append it, and force it to stable storage
    ///
    /// If a previous crash left a torn final line without its newline, a
    /// newline is written first so the new entry starts on its own line.
    pub fn append_entry(&self, entry: &WalEntry) -> VectorResult<()> {
        let line = entry.encode_line()?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| self.io_error("create directory", e))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error("open", e))?;

        let mut buf = Vec::with_capacity(line.len() + 2);
        if ends_without_newline(&mut file).map_err(|e| self.io_error("inspect tail", e))? {
            buf.push(b'\n');
        }
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');

        file.write_all(&buf).map_err(|e| self.io_error("append", e))?;
        if self.sync {
            file.sync_data().map_err(|e| self.io_error("fsync", e))?;
        }
        Ok(())
    }

    /// Read every record the log still holds, in journal order
    pub fn replay(&self) -> VectorResult<Vec<VectorRecord>> {
        self.replay_with_stats().map(|(records, _)| records)
    }

    /// Replay the log and report what was read
    ///
    /// Lines that fail to parse are skipped with a warning. A delete removes
    /// the earlier inserts of the same id from the result, so the returned
    /// records are the inserts that are still live, in journal order. A
    /// missing file replays as empty.
    ///
    /// # Errors
    ///
    /// `Io` only if the file exists but cannot be read.
    pub fn replay_with_stats(&self) -> VectorResult<(Vec<VectorRecord>, ReplayStats)> {
        let mut stats = ReplayStats::default();
        let mut records: Vec<VectorRecord> = Vec::new();

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok((records, stats)),
            Err(e) => return Err(self.io_error("open", e)),
        };
        let mut reader = BufReader::new(file);
        let mut raw = Vec::new();
        let mut line_no = 0usize;

        loop {
            raw.clear();
            let n = reader
                .read_until(b'\n', &mut raw)
                .map_err(|e| self.io_error("read", e))?;
            if n == 0 {
                break;
            }
            line_no += 1;

            let text = match std::str::from_utf8(&raw) {
                Ok(t) => t.trim(),
                Err(e) => {
                    stats.malformed += 1;
                    warn!(path = %self.path.display(), line = line_no, error = %e, "Skipping malformed WAL entry");
                    continue;
                }
            };
            if text.is_empty() {
                continue;
            }

            match WalEntry::decode_line(text) {
                Ok(WalEntry::Insert(record)) => {
                    stats.inserts += 1;
                    records.push(record);
                }
                Ok(WalEntry::Delete(id)) => {
                    stats.tombstones += 1;
                    records.retain(|r| r.id() != &id);
                }
                Err(e) => {
                    stats.malformed += 1;
                    warn!(path = %self.path.display(), line = line_no, error = %e, "Skipping malformed WAL entry");
                }
            }
        }

        Ok((records, stats))
    }

    /// Delete the log file; a no-op if it does not exist
    pub fn truncate(&self) -> VectorResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error("truncate", e)),
        }
    }

    /// True iff the log file exists and is non-empty
    pub fn has_entries(&self) -> bool {
        self.size_bytes() > 0
    }

    /// Current size of the log file in bytes (0 if absent)
    pub fn size_bytes(&self) -> u64 {
        std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    fn io_error(&self, op: &str, e: io::Error) -> VectorError {
        VectorError::io(format!("WAL {} {}", op, self.path.display()), e)
    }
}

fn ends_without_newline(file: &mut File) -> io::Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}
