//! Source records and ratings for the reputation system

use serde::{Deserialize, Serialize};

/// A source's reputation state: the multinomial posterior over k quality
/// levels plus its point estimate.
///
/// Invariant: `probabilities` and `ratings` both have length k and
/// `probabilities` sums to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Identifier of the source
    #[serde(rename = "sourceId")]
    pub source_id: String,
    /// Reputation point estimate in [0, 1]
    pub reputation: f64,
    /// Multinomial probability scores, length k, summing to 1
    pub probabilities: Vec<f64>,
    /// Accumulated ratings per level, length k, non-negative
    pub ratings: Vec<f64>,
}

impl SourceRecord {
    /// Record for a source never seen before: uniform probabilities, zero
    /// ratings, and the supplied point estimate of the uniform prior.
    pub fn with_uniform_prior(source_id: impl Into<String>, k: usize, reputation: f64) -> Self {
        Self {
            source_id: source_id.into(),
            reputation,
            probabilities: vec![1.0 / k as f64; k],
            ratings: vec![0.0; k],
        }
    }

    /// Number of quality levels this record carries
    pub fn level_count(&self) -> usize {
        self.probabilities.len()
    }
}

/// A one-hot rating over k quality levels, derived from one consolidated
/// fact confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    /// The source being rated
    pub source_id: String,
    /// One-hot vector of length k
    pub levels: Vec<f64>,
}

impl Rating {
    /// Map a fact confidence in [0, 1] to the one-hot rating whose hot
    /// index is `min(k - 1, floor(confidence * k))`.
    pub fn from_confidence(source_id: impl Into<String>, confidence: f64, k: usize) -> Self {
        let index = ((confidence * k as f64).floor() as usize).min(k - 1);
        let mut levels = vec![0.0; k];
        levels[index] = 1.0;
        Self {
            source_id: source_id.into(),
            levels,
        }
    }
}
