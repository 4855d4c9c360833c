//! Fluent similarity queries
//!
//! ```ignore
//! let top = store
//!     .query()
//!     .similar_to(&[1.0, 0.0, 0.0])
//!     .limit(5)
//!     .min_score(0.5)
//!     .execute()?;
//! ```
//!
//! Arguments are validated when the query runs, not when they are set.

use crate::similarity::{SimilarityEngine, VectorMatch};
use crate::store::VectorStore;
use vecmini_core::{DistanceMetric, VectorError, VectorRecord, VectorResult};

/// Results returned when no limit is set
pub const DEFAULT_QUERY_LIMIT: usize = 10;

/// Builder for one similarity search over a [`VectorStore`]
#[derive(Debug, Clone)]
pub struct SimilarityQuery<'a> {
    store: &'a VectorStore,
    query: Option<Vec<f64>>,
    limit: usize,
    min_score: f64,
    metric: DistanceMetric,
}

impl<'a> SimilarityQuery<'a> {
    /// Start a query using the store's configured metric
    pub fn new(store: &'a VectorStore) -> Self {
        SimilarityQuery {
            store,
            query: None,
            limit: DEFAULT_QUERY_LIMIT,
            min_score: 0.0,
            metric: store.config().metric,
        }
    }

    /// Vector to compare against
    pub fn similar_to(mut self, values: &[f64]) -> Self {
        self.query = Some(values.to_vec());
        self
    }

    /// Use a stored or embedded record's values as the query
    pub fn similar_to_record(self, record: &VectorRecord) -> Self {
        self.similar_to(record.values())
    }

    /// Maximum results; 0 means unlimited
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Minimum score in `[0.0, 1.0]`
    pub fn min_score(mut self, min_score: f64) -> Self {
        self.min_score = min_score;
        self
    }

    /// Override the metric for this query
    pub fn metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Run the query
    ///
    /// # Errors
    ///
    /// `InvalidInput` if no query vector was set, the query vector is empty,
    /// or the threshold is out of range.
    pub fn execute(&self) -> VectorResult<Vec<VectorMatch>> {
        let query = self.query.as_deref().ok_or_else(|| {
            VectorError::invalid_input("Query vector must be specified using similar_to()")
        })?;
        SimilarityEngine::new(self.metric).rank(
            query,
            self.store.all_records(),
            self.limit,
            self.min_score,
        )
    }

    /// Run the query and keep only the records
    pub fn execute_records(&self) -> VectorResult<Vec<VectorRecord>> {
        Ok(self.execute()?.into_iter().map(|m| m.record).collect())
    }
}
