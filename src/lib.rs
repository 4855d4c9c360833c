//! vecmini - a small durable vector store
//!
//! vecmini keeps a set of id → vector records on a single node. Every write
//! is journaled to a write-ahead log before it becomes visible, and the
//! whole dataset is rewritten to a snapshot file after each mutation.
//! Opening a store replays the log over the snapshot, so a crash between
//! the journal and the snapshot loses nothing.
//!
//! # Quick Start
//!
//! ```ignore
//! use vecmini::{VectorRecord, VectorStore};
//!
//! let store = VectorStore::open("data/vectors.vdb")?;
//! store.save(VectorRecord::new("doc1", vec![1.0, 0.0, 0.0])?)?;
//!
//! let top = store.search(&[1.0, 0.0, 0.0], 3, 0.0)?;
//! for m in &top {
//!     println!("{} {:.4}", m.id(), m.score);
//! }
//! ```
//!
//! # Architecture
//!
//! - `vecmini-core`: records, ids, similarity metrics, errors
//! - `vecmini-durability`: WAL and snapshot files
//! - `vecmini-engine`: in-memory index, store orchestration, ranking

pub use vecmini_core::{
    compute_similarity, cosine_similarity, euclidean_similarity, manhattan_similarity,
    DistanceMetric, VectorError, VectorId, VectorRecord, VectorResult,
};
pub use vecmini_durability::{DatabasePaths, ReplayStats, SnapshotStore, WalEntry, WriteAheadLog};
pub use vecmini_engine::{
    MemoryIndex, QueryStats, RecoveryStats, SimilarityEngine, SimilarityQuery, StoreConfig,
    TextEmbedder, VectorMatch, VectorStore, DEFAULT_QUERY_LIMIT,
};
