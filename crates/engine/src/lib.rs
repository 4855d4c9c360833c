//! Vector store engine for vecmini
//!
//! This crate sits on top of the durability layer:
//! - MemoryIndex: concurrent in-memory id → record map
//! - VectorStore: WAL + snapshot + index orchestration with startup recovery
//! - SimilarityEngine: brute-force ranking with limit and threshold rules
//! - SimilarityQuery: fluent builder over a store
//! - TextEmbedder: bag-of-words text → vector adapter
//!
//! The store is the only component that knows about write ordering
//! (journal first, then memory, then snapshot) and about recovery.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod embed;
pub mod index;
pub mod query;
pub mod similarity;
pub mod store;

pub use config::StoreConfig;
pub use embed::{TextEmbedder, QUERY_ID};
pub use index::MemoryIndex;
pub use query::{SimilarityQuery, DEFAULT_QUERY_LIMIT};
pub use similarity::{validate_min_score, QueryStats, SimilarityEngine, VectorMatch};
pub use store::{RecoveryStats, VectorStore};
