//! Brute-force similarity ranking
//!
//! Linear scan over every candidate. For each query:
//! 1. Score every candidate with the configured metric
//! 2. Drop candidates the metric cannot compare (dimension mismatch)
//! 3. Sort by (score desc, id asc)
//! 4. Apply the `min_score` threshold, then the `limit`
//!
//! A mismatched candidate is excluded rather than failing the query, so one
//! differently-dimensioned record cannot break search over a mixed collection.

use std::borrow::Borrow;
use tracing::debug;
use vecmini_core::{DistanceMetric, VectorError, VectorId, VectorRecord, VectorResult};

/// A candidate and its score against the query
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    /// The matching record
    pub record: VectorRecord,
    /// Similarity score (higher = more similar)
    pub score: f64,
}

impl VectorMatch {
    /// Id of the matching record
    pub fn id(&self) -> &VectorId {
        self.record.id()
    }
}

/// Size of the candidate set and the metric a query would run with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryStats {
    /// Number of candidates that would be scanned
    pub candidates: usize,
    /// Metric used for scoring
    pub metric: DistanceMetric,
}

/// Ranks candidate records against a query vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimilarityEngine {
    metric: DistanceMetric,
}

impl SimilarityEngine {
    /// Create an engine scoring with `metric`
    pub fn new(metric: DistanceMetric) -> Self {
        SimilarityEngine { metric }
    }

    /// The engine's metric
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Rank `candidates` against `query`
    ///
    /// - `limit == 0` returns every match; otherwise at most `limit`.
    /// - `min_score` must lie in `[0.0, 1.0]`. `0.0` disables the threshold,
    ///   so negative cosine scores are kept; any higher value keeps only
    ///   scores `>= min_score`.
    ///
    /// Ties are broken by ascending id, so the output is reproducible.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the query is empty or holds a NaN or infinite
    /// value, or if `min_score` is out of range.
    pub fn rank<I>(
        &self,
        query: &[f64],
        candidates: I,
        limit: usize,
        min_score: f64,
    ) -> VectorResult<Vec<VectorMatch>>
    where
        I: IntoIterator,
        I::Item: Borrow<VectorRecord>,
    {
        if query.is_empty() {
            return Err(VectorError::invalid_input("Query vector cannot be empty"));
        }
        if let Some(pos) = query.iter().position(|v| !v.is_finite()) {
            return Err(VectorError::invalid_input(format!(
                "Query values must be finite (index {} is {})",
                pos, query[pos]
            )));
        }
        validate_min_score(min_score)?;

        let mut matches: Vec<VectorMatch> = Vec::new();
        for candidate in candidates {
            let record: &VectorRecord = candidate.borrow();
            match self.metric.similarity(query, record.values()) {
                // `+ 0.0` folds -0.0 into 0.0 so equal scores compare equal below
                Ok(score) if score.is_finite() => matches.push(VectorMatch {
                    record: record.clone(),
                    score: score + 0.0,
                }),
                Ok(score) => {
                    debug!(id = %record.id(), score, "Excluding candidate with non-finite score");
                }
                Err(e) => {
                    debug!(id = %record.id(), error = %e, "Excluding candidate from ranking");
                }
            }
        }

        matches.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.id().cmp(b.id()))
        });

        if min_score > 0.0 {
            matches.retain(|m| m.score >= min_score);
        }
        if limit > 0 {
            matches.truncate(limit);
        }

        Ok(matches)
    }

    /// Describe a query over `candidates` without running it
    pub fn stats(&self, candidates: usize) -> QueryStats {
        QueryStats {
            candidates,
            metric: self.metric,
        }
    }
}

/// Check that a threshold lies in `[0.0, 1.0]`
pub fn validate_min_score(min_score: f64) -> VectorResult<()> {
    if !(0.0..=1.0).contains(&min_score) {
        return Err(VectorError::invalid_input(format!(
            "Minimum similarity must be between 0.0 and 1.0, got {}",
            min_score
        )));
    }
    Ok(())
}
