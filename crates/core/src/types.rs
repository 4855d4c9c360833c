//! Identity and payload types for stored vectors
//!
//! `VectorRecord` owns its values behind an `Arc<[f64]>`: clones are cheap and
//! share the same immutable buffer, and nothing hands out a mutable view of it.

use crate::error::{VectorError, VectorResult};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Identifier of a vector, unique within one store
///
/// Never empty or whitespace-only. Ordering is plain string ordering, which
/// is what ranking uses to break score ties.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VectorId(String);

impl VectorId {
    /// Create a new VectorId
    ///
    /// Returns an error if the id is empty or only whitespace.
    pub fn new(id: impl Into<String>) -> VectorResult<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(VectorError::invalid_input("Vector ID cannot be empty"));
        }
        Ok(VectorId(id))
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VectorId {
    type Error = VectorError;

    fn try_from(value: String) -> VectorResult<Self> {
        VectorId::new(value)
    }
}

impl TryFrom<&str> for VectorId {
    type Error = VectorError;

    fn try_from(value: &str) -> VectorResult<Self> {
        VectorId::new(value)
    }
}

impl From<VectorId> for String {
    fn from(id: VectorId) -> Self {
        id.0
    }
}

impl Borrow<str> for VectorId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for VectorId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored vector: id plus an immutable, non-empty sequence of finite values
///
/// The store does not enforce a common dimension across records; comparing
/// records of different length fails at comparison time instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordRepr", into = "RecordRepr")]
pub struct VectorRecord {
    id: VectorId,
    values: Arc<[f64]>,
}

/// Wire shape shared by the WAL line format and the snapshot body
#[derive(Serialize, Deserialize)]
struct RecordRepr {
    id: String,
    values: Vec<f64>,
}

impl VectorRecord {
    /// Create a record from a raw id and values
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the id is empty, the values are empty, or any value
    /// is NaN or infinite.
    pub fn new(id: impl Into<String>, values: impl Into<Vec<f64>>) -> VectorResult<Self> {
        VectorRecord::with_id(VectorId::new(id)?, values)
    }

    /// Create a record from an already validated id
    pub fn with_id(id: VectorId, values: impl Into<Vec<f64>>) -> VectorResult<Self> {
        let values = values.into();
        if values.is_empty() {
            return Err(VectorError::invalid_input("Vector values cannot be empty"));
        }
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(VectorError::invalid_input(format!(
                "Vector values must be finite (index {} is {})",
                pos, values[pos]
            )));
        }
        Ok(VectorRecord {
            id,
            values: values.into(),
        })
    }

    /// The record's id
    pub fn id(&self) -> &VectorId {
        &self.id
    }

    /// The values, borrowed read-only
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// An owned copy of the values
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.to_vec()
    }

    /// Number of values
    pub fn dimension(&self) -> usize {
        self.values.len()
    }
}

impl TryFrom<RecordRepr> for VectorRecord {
    type Error = VectorError;

    fn try_from(repr: RecordRepr) -> VectorResult<Self> {
        VectorRecord::new(repr.id, repr.values)
    }
}

impl From<VectorRecord> for RecordRepr {
    fn from(record: VectorRecord) -> Self {
        RecordRepr {
            id: record.id.into(),
            values: record.values.to_vec(),
        }
    }
}
