//! Distance metrics and similarity kernels.
//!
//! All scores are normalized to "higher = more similar". Distances are mapped
//! into `(0, 1]` with `1 / (1 + d)`, so identical vectors score `1.0`.
//! No implicit normalization of vectors: they are used as-is.

use crate::error::{VectorError, VectorResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Similarity metric used to rank candidates against a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Cosine similarity: dot(a,b) / (||a|| * ||b||)
    /// Range: [-1, 1]
    #[default]
    Cosine,

    /// Euclidean similarity: 1 / (1 + l2_distance)
    /// Range: (0, 1]
    Euclidean,

    /// Manhattan similarity: 1 / (1 + l1_distance)
    /// Range: (0, 1]
    Manhattan,
}

impl DistanceMetric {
    /// All supported metrics
    pub const ALL: [DistanceMetric; 3] = [
        DistanceMetric::Cosine,
        DistanceMetric::Euclidean,
        DistanceMetric::Manhattan,
    ];

    /// Human-readable name for display
    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Manhattan => "manhattan",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cosine" => Some(DistanceMetric::Cosine),
            "euclidean" | "l2" => Some(DistanceMetric::Euclidean),
            "manhattan" | "l1" => Some(DistanceMetric::Manhattan),
            _ => None,
        }
    }

    /// Score `b` against `a` with this metric
    pub fn similarity(&self, a: &[f64], b: &[f64]) -> VectorResult<f64> {
        compute_similarity(a, b, *self)
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceMetric {
    type Err = VectorError;

    fn from_str(s: &str) -> VectorResult<Self> {
        DistanceMetric::parse(s)
            .ok_or_else(|| VectorError::invalid_input(format!("Unknown distance metric: {}", s)))
    }
}

/// Compute similarity score between two vectors
///
/// # Errors
///
/// `DimensionMismatch` if the slices differ in length.
pub fn compute_similarity(a: &[f64], b: &[f64], metric: DistanceMetric) -> VectorResult<f64> {
    match metric {
        DistanceMetric::Cosine => cosine_similarity(a, b),
        DistanceMetric::Euclidean => euclidean_similarity(a, b),
        DistanceMetric::Manhattan => manhattan_similarity(a, b),
    }
}

/// Cosine similarity: dot(a,b) / (||a|| * ||b||)
///
/// Returns 0.0 if either vector has zero norm. Each vector is divided by its
/// largest magnitude first, so values near `f64::MAX` cannot overflow the
/// squared norms.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> VectorResult<f64> {
    check_dimensions(a, b)?;
    let scale_a = max_abs(a);
    let scale_b = max_abs(b);
    if scale_a == 0.0 || scale_b == 0.0 {
        return Ok(0.0);
    }

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (x, y) in a.iter().zip(b.iter()) {
        let x = x / scale_a;
        let y = y / scale_b;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    // Rounding can push |cos| a hair past 1
    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0))
}

/// Euclidean similarity: 1 / (1 + l2_distance)
pub fn euclidean_similarity(a: &[f64], b: &[f64]) -> VectorResult<f64> {
    check_dimensions(a, b)?;
    let dist = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt();
    Ok(1.0 / (1.0 + dist))
}

/// Manhattan similarity: 1 / (1 + l1_distance)
pub fn manhattan_similarity(a: &[f64], b: &[f64]) -> VectorResult<f64> {
    check_dimensions(a, b)?;
    let dist: f64 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum();
    Ok(1.0 / (1.0 + dist))
}

fn check_dimensions(a: &[f64], b: &[f64]) -> VectorResult<()> {
    if a.len() != b.len() {
        return Err(VectorError::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }
    Ok(())
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0, |m: f64, x| m.max(x.abs()))
}
