//! Core types for vecmini
//!
//! This crate defines the foundational types used throughout the system:
//! - VectorId: Non-empty identifier of a stored vector
//! - VectorRecord: Immutable id + values pair
//! - DistanceMetric: Similarity metrics (Cosine, Euclidean, Manhattan)
//! - VectorError: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod distance;
pub mod error;
pub mod types;

pub use distance::{
    compute_similarity, cosine_similarity, euclidean_similarity, manhattan_similarity,
    DistanceMetric,
};
pub use error::{VectorError, VectorResult};
pub use types::{VectorId, VectorRecord};
