//! Durability layer for vecmini
//!
//! This crate handles everything that touches disk:
//!
//! - WAL: newline-delimited JSON journal of inserts and deletes, fsynced per append
//! - Snapshot: whole-dataset file written with the write-fsync-rename pattern
//! - Paths: derivation of the WAL file from the database file name

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod paths;
pub mod snapshot;
pub mod wal;

pub use paths::DatabasePaths;
pub use snapshot::{
    SnapshotInfo, SnapshotStore, SNAPSHOT_FORMAT_VERSION, SNAPSHOT_HEADER_SIZE, SNAPSHOT_MAGIC,
};
pub use wal::{ReplayStats, WalEntry, WriteAheadLog};
