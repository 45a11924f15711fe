//! Concord Reputation
//!
//! Long-horizon source reputation over `k` discrete quality levels, kept as
//! a multinomial-Dirichlet posterior. Each consolidation run produces
//! one-hot ratings that are folded into the posterior; the point estimate of
//! the posterior seeds trustworthiness for the next run.
//!
//! The engine operates in one of two modes:
//!
//! - **Stateful**: records live in a [`ReputationStore`]; unseen sources are
//!   created lazily with the uniform prior.
//! - **Stateless**: the caller supplies every record for the request and is
//!   the system of record; updates mutate the request-scoped map in place
//!   and the final records travel back in the response.

#![warn(missing_docs)]

mod error;

pub use error::ReputationError;

use concord_domain::{Rating, ReputationStore, SourceRecord};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// Request-scoped source records, keyed by source id.
///
/// Insertion order is the response order; re-inserting moves an entry to
/// the end, which is exactly the latest-wins merge the response wants.
pub type SourceMap = IndexMap<String, SourceRecord>;

/// The reputation engine.
///
/// Holds the model parameters and the store handle; all per-request state
/// is passed in by the caller.
pub struct Reputation {
    k: usize,
    c: f64,
    lf: f64,
    /// A-priori base rate, uniform 1/k
    a: Vec<f64>,
    /// Level values i/(k-1)
    pv: Vec<f64>,
    stateful: bool,
    store: Arc<dyn ReputationStore>,
}

impl Reputation {
    /// Create an engine with the a-priori constant at its default `C = k`.
    pub fn new(
        k: usize,
        lf: f64,
        stateful: bool,
        store: Arc<dyn ReputationStore>,
    ) -> Result<Self, ReputationError> {
        Self::with_prior_constant(k, k as f64, lf, stateful, store)
    }

    /// Create an engine with an explicit a-priori constant.
    pub fn with_prior_constant(
        k: usize,
        c: f64,
        lf: f64,
        stateful: bool,
        store: Arc<dyn ReputationStore>,
    ) -> Result<Self, ReputationError> {
        if k < 2 {
            return Err(ReputationError::InvalidParameter {
                name: "k",
                value: k as f64,
            });
        }
        if !(lf > 0.0 && lf <= 1.0) {
            return Err(ReputationError::InvalidParameter { name: "lf", value: lf });
        }
        if c <= 0.0 {
            return Err(ReputationError::InvalidParameter { name: "c", value: c });
        }
        let a = vec![1.0 / k as f64; k];
        let pv = (0..k).map(|i| i as f64 / (k - 1) as f64).collect();
        Ok(Self {
            k,
            c,
            lf,
            a,
            pv,
            stateful,
            store,
        })
    }

    /// Number of quality levels
    pub fn k(&self) -> usize {
        self.k
    }

    /// Whether the engine persists records across requests
    pub fn stateful(&self) -> bool {
        self.stateful
    }

    /// Multinomial probability scores for a ratings vector:
    /// `S_i = (R_i + C·a_i) / (C + ΣR)`.
    fn score(&self, ratings: &[f64]) -> Vec<f64> {
        let accumulated: f64 = ratings.iter().sum();
        let denominator = self.c + accumulated;
        ratings
            .iter()
            .zip(&self.a)
            .map(|(r, a)| (r + self.c * a) / denominator)
            .collect()
    }

    /// Point estimate of a probability vector: its dot product with the
    /// level values, hence in [0, 1].
    fn point_estimate(&self, probabilities: &[f64]) -> f64 {
        probabilities.iter().zip(&self.pv).map(|(s, p)| s * p).sum()
    }

    /// Reputation of a source never rated: the point estimate of the
    /// uniform prior, which is 1/2.
    pub fn default_reputation(&self) -> f64 {
        self.point_estimate(&self.a)
    }

    /// Reputation for a source, used to seed trustworthiness.
    ///
    /// Stateful mode finds-or-creates the record with defaults; stateless
    /// mode looks the source up in the caller-supplied map.
    pub fn get_reputation(
        &self,
        source_id: &str,
        sources: Option<&SourceMap>,
    ) -> Result<f64, ReputationError> {
        if self.stateful {
            let defaults =
                SourceRecord::with_uniform_prior(source_id, self.k, self.default_reputation());
            let record = self.store.find_or_create(defaults)?;
            return Ok(record.reputation);
        }
        let sources = sources.ok_or(ReputationError::MissingSources)?;
        sources
            .get(source_id)
            .map(|record| record.reputation)
            .ok_or_else(|| ReputationError::UnknownSource(source_id.to_string()))
    }

    /// Fold one rating into a source's posterior.
    ///
    /// Applies longevity aging (`R ← lf·R` when `lf < 1`), adds the rating,
    /// recomputes the probability scores and point estimate, and persists
    /// the record (stateful) or updates the supplied map entry in place
    /// (stateless). Returns the updated record in stateless mode.
    pub fn update_reputation(
        &self,
        rating: &Rating,
        sources: Option<&mut SourceMap>,
    ) -> Result<Option<SourceRecord>, ReputationError> {
        if rating.levels.len() != self.k {
            return Err(ReputationError::InvalidRating {
                expected: self.k,
                actual: rating.levels.len(),
            });
        }
        if self.stateful {
            let mut record = self
                .store
                .get(&rating.source_id)?
                .ok_or_else(|| ReputationError::UnknownSource(rating.source_id.clone()))?;
            self.fold(&mut record, rating);
            self.store.put(&record)?;
            return Ok(None);
        }
        let sources = sources.ok_or(ReputationError::MissingSources)?;
        let record = sources
            .get_mut(&rating.source_id)
            .ok_or_else(|| ReputationError::UnknownSource(rating.source_id.clone()))?;
        self.fold(record, rating);
        Ok(Some(record.clone()))
    }

    fn fold(&self, record: &mut SourceRecord, rating: &Rating) {
        if self.lf < 1.0 {
            for r in record.ratings.iter_mut() {
                *r *= self.lf;
            }
        }
        for (r, level) in record.ratings.iter_mut().zip(&rating.levels) {
            *r += level;
        }
        record.probabilities = self.score(&record.ratings);
        record.reputation = self.point_estimate(&record.probabilities);
        debug!(
            source_id = %record.source_id,
            reputation = record.reputation,
            "reputation updated"
        );
    }

    /// Read a source's stored record. Stateful only; fails if absent.
    pub fn get_source(&self, source_id: &str) -> Result<SourceRecord, ReputationError> {
        self.store
            .get(source_id)?
            .ok_or_else(|| ReputationError::UnknownSource(source_id.to_string()))
    }

    /// Drop all stored reputation data. A no-op success in stateless mode.
    pub fn clear_reputation(&self) -> Result<(), ReputationError> {
        if self.stateful {
            self.store.clear()?;
        }
        Ok(())
    }
}
