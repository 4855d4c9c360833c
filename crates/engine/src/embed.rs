//! Bag-of-words text embedder
//!
//! Turns short text into a fixed-dimension vector so text can be stored and
//! searched like any other record. Each distinct word gets a vocabulary
//! index on first sight; its word vector is drawn from a Gaussian generator
//! seeded by that index, so the same word always maps to the same vector
//! for a given embedder. A document vector is the term-frequency weighted
//! sum of its word vectors, L2-normalized.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use vecmini_core::{VectorError, VectorRecord, VectorResult};

/// Id given to embedded query vectors
pub const QUERY_ID: &str = "query";

/// Deterministic bag-of-words embedder with a growing vocabulary
#[derive(Debug, Clone)]
pub struct TextEmbedder {
    dimension: usize,
    vocabulary: HashMap<String, u64>,
}

impl TextEmbedder {
    /// Create an embedder producing `dimension`-sized vectors
    ///
    /// # Errors
    ///
    /// `InvalidInput` if `dimension` is 0.
    pub fn new(dimension: usize) -> VectorResult<Self> {
        if dimension == 0 {
            return Err(VectorError::invalid_input(
                "Vector dimension must be positive",
            ));
        }
        Ok(TextEmbedder {
            dimension,
            vocabulary: HashMap::new(),
        })
    }

    /// Output dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Number of distinct words seen so far
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Whether `word` has been assigned a vocabulary index
    pub fn knows(&self, word: &str) -> bool {
        self.vocabulary.contains_key(word)
    }

    /// Embed `text` into a record with the given id
    ///
    /// Text with no words yields an all-zero vector.
    pub fn embed(&mut self, text: &str, id: &str) -> VectorResult<VectorRecord> {
        let words = tokenize(text);
        let mut embedding = vec![0.0; self.dimension];

        if !words.is_empty() {
            let total = words.len() as f64;
            for (word, count) in count_words(&words) {
                let weight = count as f64 / total;
                let word_vector = self.word_vector(word);
                for (slot, w) in embedding.iter_mut().zip(word_vector) {
                    *slot += weight * w;
                }
            }
            normalize(&mut embedding);
        }

        VectorRecord::new(id, embedding)
    }

    /// Embed query text under the fixed id `"query"`
    pub fn embed_query(&mut self, text: &str) -> VectorResult<VectorRecord> {
        self.embed(text, QUERY_ID)
    }

    fn word_vector(&mut self, word: &str) -> Vec<f64> {
        let next = self.vocabulary.len() as u64;
        let index = *self.vocabulary.entry(word.to_string()).or_insert(next);
        let mut rng = StdRng::seed_from_u64(index);
        (0..self.dimension).map(|_| gaussian(&mut rng)).collect()
    }
}

/// Lower-case, drop everything but ASCII letters and whitespace, split
fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().map(str::to_string).collect()
}

/// Word counts in first-appearance order, so vocabulary indices are stable
fn count_words(words: &[String]) -> Vec<(&str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for word in words {
        match positions.get(word.as_str()) {
            Some(&pos) => counts[pos].1 += 1,
            None => {
                positions.insert(word.as_str(), counts.len());
                counts.push((word.as_str(), 1));
            }
        }
    }
    counts
}

fn normalize(values: &mut [f64]) {
    let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm > 0.0 {
        for v in values.iter_mut() {
            *v /= norm;
        }
    }
}

/// Standard normal sample (Box-Muller)
fn gaussian(rng: &mut StdRng) -> f64 {
    // gen::<f64>() is in [0, 1); shift to (0, 1] so ln never sees 0
    let u1 = 1.0 - rng.gen::<f64>();
    let u2 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}
