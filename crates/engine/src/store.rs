//! Durable vector store
//!
//! `VectorStore` composes the write-ahead log, the snapshot file and the
//! in-memory index into one repository for a single logical database.
//!
//! ## Write path
//!
//! ```text
//! save(record) → WAL append (fsync) → MemoryIndex::put → snapshot rewrite
//! ```
//!
//! Every mutation holds the writer lock for the whole sequence, so two
//! concurrent saves can never interleave their WAL appends and snapshot
//! rewrites. Reads only take the index's read lock.
//!
//! ## Recovery
//!
//! `open` loads the snapshot, then replays the WAL. A replayed record whose
//! id was already in the snapshot is skipped; otherwise later WAL entries
//! win over earlier ones. If replay produced anything the merged state is
//! checkpointed (snapshot rewrite + WAL truncate). Recovery never fails on
//! bad data: unreadable files are logged and treated as empty.
//!
//! The WAL is not truncated after individual saves. It grows until
//! [`VectorStore::checkpoint`] runs, `checkpoint_every` appends have been
//! made, or the next open recovers it.

use crate::config::StoreConfig;
use crate::index::MemoryIndex;
use crate::query::SimilarityQuery;
use crate::similarity::{SimilarityEngine, VectorMatch};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};
use vecmini_core::{DistanceMetric, VectorId, VectorRecord, VectorResult};
use vecmini_durability::{DatabasePaths, ReplayStats, SnapshotStore, WriteAheadLog};

/// What happened while opening the store
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryStats {
    /// Records loaded from the snapshot file
    pub snapshot_records: usize,
    /// Counters from the WAL replay
    pub wal: ReplayStats,
    /// Replayed records applied to the index
    pub merged: usize,
    /// Replayed records skipped because the snapshot already had the id
    pub skipped_present: usize,
    /// Whether recovery ended with a successful checkpoint
    pub checkpointed: bool,
}

/// State owned by whoever holds the writer lock
#[derive(Debug, Default)]
struct WriterState {
    appends_since_checkpoint: u64,
}

/// Single-node durable vector repository
#[derive(Debug)]
pub struct VectorStore {
    paths: DatabasePaths,
    config: StoreConfig,
    wal: WriteAheadLog,
    snapshots: SnapshotStore,
    index: MemoryIndex,
    writer: Mutex<WriterState>,
    recovery: RecoveryStats,
}

impl VectorStore {
    /// Open (or create) the database at `path` with default settings
    ///
    /// The WAL lives next to it with the extension replaced by `wal`.
    pub fn open(path: impl AsRef<Path>) -> VectorResult<Self> {
        Self::open_with_config(path, StoreConfig::default())
    }

    /// Open (or create) the database at `path`
    ///
    /// # Errors
    ///
    /// `Config` if `config` is invalid, `InvalidInput` if the path cannot
    /// name a database file. Unreadable snapshot or WAL contents are not
    /// errors; they are logged and treated as empty.
    pub fn open_with_config(path: impl AsRef<Path>, config: StoreConfig) -> VectorResult<Self> {
        config.validate()?;
        let paths = DatabasePaths::from_database_file(path)?;

        let wal = WriteAheadLog::new(paths.wal()).with_sync(config.sync_wal);
        let snapshots = SnapshotStore::new(paths.snapshot());

        match snapshots.cleanup_temp_file() {
            Ok(true) => {
                info!(path = %paths.snapshot_temp().display(), "Removed leftover snapshot temp file")
            }
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Failed to remove leftover snapshot temp file"),
        }

        let mut store = VectorStore {
            paths,
            config,
            wal,
            snapshots,
            index: MemoryIndex::new(),
            writer: Mutex::new(WriterState::default()),
            recovery: RecoveryStats::default(),
        };
        store.recovery = store.recover();
        Ok(store)
    }

    /// Load the snapshot, merge the WAL over it, and checkpoint
    ///
    /// The checkpoint runs when replay saw any insert (merged or skipped)
    /// and also when it saw only tombstones. A log holding nothing but
    /// deletes yields no records to merge, yet it must still be folded into
    /// the snapshot and cleared or it would never shrink.
    fn recover(&self) -> RecoveryStats {
        let mut stats = RecoveryStats::default();

        let snapshot = self.snapshots.read();
        stats.snapshot_records = snapshot.len();
        let snapshot_ids: HashSet<VectorId> = snapshot.keys().cloned().collect();
        self.index.extend(snapshot.into_values());

        let recovered = match self.wal.replay_with_stats() {
            Ok((records, wal_stats)) => {
                stats.wal = wal_stats;
                records
            }
            Err(e) => {
                warn!(
                    path = %self.wal.path().display(),
                    error = %e,
                    "Failed to replay WAL, starting from snapshot only"
                );
                Vec::new()
            }
        };

        for record in recovered {
            if snapshot_ids.contains(record.id()) {
                stats.skipped_present += 1;
                continue;
            }
            self.index.put(record);
            stats.merged += 1;
        }

        if stats.merged + stats.skipped_present > 0 || stats.wal.tombstones > 0 {
            match self.write_snapshot().and_then(|_| self.wal.truncate()) {
                Ok(()) => stats.checkpointed = true,
                Err(e) => warn!(error = %e, "Post-recovery checkpoint failed, WAL kept"),
            }
        }

        if stats.wal.entries() + stats.wal.malformed == 0 {
            debug!(records = self.index.len(), "Vector store opened, nothing to replay");
            return stats;
        }
        info!(
            snapshot_records = stats.snapshot_records,
            wal_inserts = stats.wal.inserts,
            wal_tombstones = stats.wal.tombstones,
            wal_malformed = stats.wal.malformed,
            merged = stats.merged,
            skipped_present = stats.skipped_present,
            records = self.index.len(),
            "Vector store recovered"
        );
        stats
    }

    /// Insert or replace a record
    ///
    /// The record is journaled before it becomes visible. If the snapshot
    /// rewrite fails afterwards the record stays in the index and the error
    /// is returned; the WAL entry recovers it on the next open.
    ///
    /// # Errors
    ///
    /// `Io` if the WAL append or the snapshot rewrite fails. A failed WAL
    /// append leaves the store untouched.
    pub fn save(&self, record: VectorRecord) -> VectorResult<()> {
        let mut writer = self.writer.lock();

        self.wal.append(&record)?;
        writer.appends_since_checkpoint += 1;

        let id = record.id().clone();
        self.index.put(record);
        self.write_snapshot()?;

        debug!(id = %id, "Saved vector");
        self.maybe_truncate_wal(&mut writer);
        Ok(())
    }

    /// Remove a record, returning whether it existed
    ///
    /// An absent id is a no-op: nothing is written. Otherwise a tombstone is
    /// journaled, the record leaves the index and the snapshot is rewritten.
    /// If the rewrite fails the record is put back and the error returned.
    pub fn delete(&self, id: &str) -> VectorResult<bool> {
        let mut writer = self.writer.lock();

        let Some(existing) = self.index.get(id) else {
            return Ok(false);
        };

        self.wal.append_delete(existing.id())?;
        writer.appends_since_checkpoint += 1;

        let removed = self.index.remove(id);
        if let Err(e) = self.write_snapshot() {
            if let Some(record) = removed {
                self.index.put(record);
            }
            return Err(e);
        }

        debug!(id = %id, "Deleted vector");
        self.maybe_truncate_wal(&mut writer);
        Ok(true)
    }

    /// Write the full snapshot and truncate the WAL
    pub fn checkpoint(&self) -> VectorResult<()> {
        let mut writer = self.writer.lock();
        self.checkpoint_locked(&mut writer)
    }

    fn checkpoint_locked(&self, writer: &mut WriterState) -> VectorResult<()> {
        self.write_snapshot()?;
        self.wal.truncate()?;
        debug!(
            records = self.index.len(),
            appends = writer.appends_since_checkpoint,
            "Checkpoint complete"
        );
        writer.appends_since_checkpoint = 0;
        Ok(())
    }

    /// The snapshot is already current here, so only the WAL needs clearing
    fn maybe_truncate_wal(&self, writer: &mut WriterState) {
        let Some(every) = self.config.checkpoint_every else {
            return;
        };
        if writer.appends_since_checkpoint < every {
            return;
        }
        match self.wal.truncate() {
            Ok(()) => {
                debug!(appends = writer.appends_since_checkpoint, "Automatic checkpoint");
                writer.appends_since_checkpoint = 0;
            }
            Err(e) => warn!(error = %e, "Automatic checkpoint failed, WAL kept"),
        }
    }

    fn write_snapshot(&self) -> VectorResult<()> {
        self.snapshots.write(&self.index.all()).map(|_| ())
    }

    /// Look up a record by id
    pub fn get(&self, id: &str) -> Option<VectorRecord> {
        self.index.get(id)
    }

    /// True if `id` is stored
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains(id)
    }

    /// Number of stored records
    pub fn count(&self) -> usize {
        self.index.len()
    }

    /// True if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Every stored id, sorted
    pub fn all_ids(&self) -> Vec<VectorId> {
        self.index.ids()
    }

    /// Copy of every stored record, in no particular order
    pub fn all_records(&self) -> Vec<VectorRecord> {
        self.index.all()
    }

    /// Rank every stored record against `query` with the configured metric
    ///
    /// `limit == 0` means no limit; `min_score == 0.0` means no threshold.
    pub fn search(
        &self,
        query: &[f64],
        limit: usize,
        min_score: f64,
    ) -> VectorResult<Vec<VectorMatch>> {
        self.search_with(self.config.metric, query, limit, min_score)
    }

    /// Like [`search`](Self::search) with an explicit metric
    pub fn search_with(
        &self,
        metric: DistanceMetric,
        query: &[f64],
        limit: usize,
        min_score: f64,
    ) -> VectorResult<Vec<VectorMatch>> {
        SimilarityEngine::new(metric).rank(query, self.index.all(), limit, min_score)
    }

    /// Start a fluent similarity query
    pub fn query(&self) -> SimilarityQuery<'_> {
        SimilarityQuery::new(self)
    }

    /// Files backing this store
    pub fn paths(&self) -> &DatabasePaths {
        &self.paths
    }

    /// Settings the store was opened with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Outcome of the recovery run at open
    pub fn recovery_stats(&self) -> RecoveryStats {
        self.recovery
    }

    /// Current WAL size in bytes (0 when absent)
    pub fn wal_size_bytes(&self) -> u64 {
        self.wal.size_bytes()
    }

    /// True if the WAL holds entries not yet checkpointed
    pub fn has_pending_wal(&self) -> bool {
        self.wal.has_entries()
    }
}
