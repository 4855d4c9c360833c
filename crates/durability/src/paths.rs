//! Database file layout
//!
//! A logical database is two co-located files named after the database file:
//!
//! ```text
//! data/
//! ├── vecs.vecdb   # snapshot (the path the caller opens)
//! └── vecs.wal     # write-ahead log, same stem with the extension replaced
//! ```
//!
//! Snapshot rewrites go through a transient `vecs.vecdb.tmp` sibling.

use std::path::{Path, PathBuf};
use vecmini_core::{VectorError, VectorResult};

/// Extension of the write-ahead log file
pub const WAL_EXTENSION: &str = "wal";

/// Suffix appended to the snapshot file name while it is being rewritten
pub const TEMP_SUFFIX: &str = ".tmp";

/// Paths of the files backing one logical database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabasePaths {
    snapshot: PathBuf,
    wal: PathBuf,
}

impl DatabasePaths {
    /// Derive all paths from the database (snapshot) file path
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the path is empty, has no file name, or would make
    /// the snapshot and WAL the same file.
    pub fn from_database_file(path: impl AsRef<Path>) -> VectorResult<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(VectorError::invalid_input("File path cannot be empty"));
        }
        if path.file_name().is_none() {
            return Err(VectorError::invalid_input(format!(
                "File path has no file name: {}",
                path.display()
            )));
        }
        if path.extension().is_some_and(|ext| ext == WAL_EXTENSION) {
            return Err(VectorError::invalid_input(format!(
                "Database file cannot use the .{} extension: {}",
                WAL_EXTENSION,
                path.display()
            )));
        }

        Ok(DatabasePaths {
            snapshot: path.to_path_buf(),
            wal: path.with_extension(WAL_EXTENSION),
        })
    }

    /// The snapshot file (the database file itself)
    pub fn snapshot(&self) -> &Path {
        &self.snapshot
    }

    /// The write-ahead log file
    pub fn wal(&self) -> &Path {
        &self.wal
    }

    /// Temporary file used while rewriting the snapshot
    pub fn snapshot_temp(&self) -> PathBuf {
        temp_path_for(&self.snapshot)
    }
}

pub(crate) fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(TEMP_SUFFIX);
    PathBuf::from(name)
}
