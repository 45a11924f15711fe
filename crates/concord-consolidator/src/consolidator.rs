//! Per-object consolidation pipeline

use crate::error::ConsolidateError;
use crate::response::{round3, ConsolidatedClaim, ConsolidatedObject};
use concord_domain::{
    ClaimKind, ConsolidationRow, NormalizedClaim, Rating, ReputationStore, SourceRecord,
};
use concord_reputation::{Reputation, ReputationError, SourceMap};
use concord_truthfinder::{clamp_trust, TruthFinder};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, warn};

/// Iteration budget used on the request path.
const DEFAULT_MAX_ITERATIONS: usize = 1;
const DEFAULT_THRESHOLD: f64 = 1e-4;

/// Consolidates one object's claims: builds the table, runs the engine,
/// folds the resulting ratings back into reputation, and assembles the
/// response element.
pub struct Consolidator {
    truthfinder: TruthFinder,
    reputation: Reputation,
    max_iterations: usize,
    threshold: f64,
    stateful: bool,
}

impl Consolidator {
    /// Create a consolidator from the engine parameters.
    ///
    /// `k` and `lf` parameterize reputation, `dampening` and `influence`
    /// the TruthFinder engine. The iteration budget defaults to a single
    /// iteration with a 1e-4 convergence threshold.
    pub fn new(
        k: usize,
        lf: f64,
        dampening: f64,
        influence: f64,
        stateful: bool,
        store: Arc<dyn ReputationStore>,
    ) -> Result<Self, ConsolidateError> {
        Ok(Self {
            truthfinder: TruthFinder::new(dampening, influence)?,
            reputation: Reputation::new(k, lf, stateful, store)?,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            threshold: DEFAULT_THRESHOLD,
            stateful,
        })
    }

    /// Override the iteration budget.
    pub fn with_iteration_budget(mut self, max_iterations: usize, threshold: f64) -> Self {
        self.max_iterations = max_iterations;
        self.threshold = threshold;
        self
    }

    /// Run the pipeline for one object.
    ///
    /// `name` and `kind` come from the claim envelope; `claims` are the
    /// normalized rows. In stateless mode `sources` carries the
    /// request-scoped records and is mutated in place; in stateful mode it
    /// is ignored. Returns the response element and the updated record of
    /// every source the object referenced.
    pub fn consolidate(
        &self,
        name: &str,
        kind: ClaimKind,
        claims: Vec<NormalizedClaim>,
        mut sources: Option<&mut SourceMap>,
    ) -> Result<(ConsolidatedObject, Vec<SourceRecord>), ConsolidateError> {
        validate_input(name, &claims)?;
        if !self.stateful {
            let map = sources.as_deref().ok_or_else(|| {
                ConsolidateError::InvalidSource(
                    "stateless consolidation requires source records".to_string(),
                )
            })?;
            self.validate_sources(&claims, map)?;
        }

        let mut rows = Vec::with_capacity(claims.len());
        for claim in claims {
            let reputation = self
                .reputation
                .get_reputation(&claim.source_id, sources.as_deref())?;
            rows.push(ConsolidationRow::seeded(claim, clamp_trust(reputation)));
        }

        debug!(object = name, rows = rows.len(), "running consolidation");
        self.truthfinder
            .run(&mut rows, self.max_iterations, self.threshold);

        // One rating per row, folded in row order. A wrong-length rating is
        // skipped, not fatal.
        let k = self.reputation.k();
        for row in &rows {
            let rating = Rating::from_confidence(row.source.clone(), row.fact_confidence, k);
            debug!(
                source_id = %row.source,
                confidence = row.fact_confidence,
                "derived rating"
            );
            match self
                .reputation
                .update_reputation(&rating, sources.as_deref_mut())
            {
                Ok(_) => {}
                Err(ReputationError::InvalidRating { expected, actual }) => {
                    warn!(
                        source_id = %row.source,
                        expected,
                        actual,
                        "skipping rating with wrong level count"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        let updated = self.updated_sources(&rows, sources.as_deref())?;
        Ok((build_response(name, kind, &rows), updated))
    }

    /// Stateless source validation: well-formed vectors and no claim whose
    /// source is missing from the supplied records.
    fn validate_sources(
        &self,
        claims: &[NormalizedClaim],
        sources: &SourceMap,
    ) -> Result<(), ConsolidateError> {
        let k = self.reputation.k();
        for record in sources.values() {
            if record.probabilities.len() != k || record.ratings.len() != k {
                return Err(ConsolidateError::InvalidSource(format!(
                    "source {}: vector length does not match k = {}",
                    record.source_id, k
                )));
            }
            if !record.reputation.is_finite() || !(0.0..=1.0).contains(&record.reputation) {
                return Err(ConsolidateError::InvalidSource(format!(
                    "source {}: reputation {} is out of range",
                    record.source_id, record.reputation
                )));
            }
        }
        for claim in claims {
            if !sources.contains_key(&claim.source_id) {
                return Err(ConsolidateError::InvalidSource(format!(
                    "missing source: {}",
                    claim.source_id
                )));
            }
        }
        Ok(())
    }

    /// Latest record for every source the object referenced, in row order.
    fn updated_sources(
        &self,
        rows: &[ConsolidationRow],
        sources: Option<&SourceMap>,
    ) -> Result<Vec<SourceRecord>, ConsolidateError> {
        let mut seen: IndexMap<String, SourceRecord> = IndexMap::new();
        for row in rows {
            if seen.contains_key(&row.source) {
                continue;
            }
            let record = if self.stateful {
                self.reputation.get_source(&row.source)?
            } else {
                sources
                    .and_then(|map| map.get(&row.source))
                    .cloned()
                    .ok_or_else(|| {
                        ConsolidateError::InvalidSource(format!("missing source: {}", row.source))
                    })?
            };
            seen.insert(row.source.clone(), record);
        }
        Ok(seen.into_values().collect())
    }

    /// Drop all persisted reputation data.
    pub fn clear_reputation(&self) -> Result<(), ConsolidateError> {
        self.reputation.clear_reputation()?;
        Ok(())
    }
}

fn validate_input(name: &str, claims: &[NormalizedClaim]) -> Result<(), ConsolidateError> {
    if claims.is_empty() {
        return Err(ConsolidateError::InvalidInput(format!(
            "object {}: no claims to consolidate",
            name
        )));
    }
    for claim in claims {
        if claim.source_id.is_empty() {
            return Err(ConsolidateError::InvalidInput(format!(
                "object {}: sourceId must not be empty",
                name
            )));
        }
        if claim.object.is_empty() {
            return Err(ConsolidateError::InvalidInput(format!(
                "object {}: row object name must not be empty",
                name
            )));
        }
    }
    Ok(())
}

/// Build the response element for one object.
///
/// Address objects collapse into one claim with the winning value per
/// field; everything else ranks the rows by confidence.
fn build_response(name: &str, kind: ClaimKind, rows: &[ConsolidationRow]) -> ConsolidatedObject {
    if kind.is_address() {
        let prefix = format!("{}-", name);
        let mut groups: IndexMap<&str, Vec<&ConsolidationRow>> = IndexMap::new();
        for row in rows {
            groups.entry(row.object.as_str()).or_default().push(row);
        }

        let mut fact = IndexMap::new();
        let mut total = 0.0;
        for (object, group) in &groups {
            let mut top = group[0];
            for row in &group[1..] {
                if row.fact_confidence > top.fact_confidence {
                    top = row;
                }
            }
            let field = object.strip_prefix(&prefix).unwrap_or(object);
            fact.insert(field.to_string(), top.fact.to_string());
            total += top.fact_confidence;
        }
        let confidence = round3(total / groups.len() as f64);

        ConsolidatedObject {
            name: "address".to_string(),
            claims: vec![ConsolidatedClaim::Address { fact, confidence }],
        }
    } else {
        let mut ranked: Vec<&ConsolidationRow> = rows.iter().collect();
        ranked.sort_by(|a, b| {
            b.fact_confidence
                .partial_cmp(&a.fact_confidence)
                .unwrap_or(Ordering::Equal)
        });
        let claims = ranked
            .iter()
            .map(|row| ConsolidatedClaim::Value {
                fact: row.fact.clone(),
                confidence: round3(row.fact_confidence),
                source_id: row.source.clone(),
            })
            .collect();
        ConsolidatedObject {
            name: name.to_string(),
            claims,
        }
    }
}
