//! Concord TruthFinder
//!
//! Iterative joint estimation of fact confidence and source trustworthiness
//! over a per-object claim table, after Yin et al.'s TruthFinder.
//!
//! One iteration runs four steps:
//!
//! 1. Each row's confidence becomes the sum of `-ln(1 - t)` over the rows
//!    claiming the same fact within the same object.
//! 2. Confidences are adjusted by the implication-weighted confidences of
//!    the other distinct facts of the object.
//! 3. A dampened sigmoid squashes confidences back into (0, 1).
//! 4. Each source's trustworthiness becomes the mean confidence of its rows.
//!
//! The loop exits early once the per-source trustworthiness vector stops
//! moving (cosine-similarity change below the threshold).

#![warn(missing_docs)]

mod error;

pub use error::TruthFinderError;

use concord_domain::implication::implication;
use concord_domain::ConsolidationRow;
use tracing::debug;

/// Trustworthiness is kept strictly inside (0, 1) so `-ln(1 - t)` stays
/// finite.
const TRUST_EPSILON: f64 = 1e-9;

/// Clamp a trustworthiness value into the open unit interval.
pub fn clamp_trust(t: f64) -> f64 {
    t.clamp(TRUST_EPSILON, 1.0 - TRUST_EPSILON)
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// The TruthFinder engine.
///
/// Holds the two hyperparameters; the table itself is owned by the caller
/// and mutated in place by [`TruthFinder::run`].
#[derive(Debug, Clone)]
pub struct TruthFinder {
    dampening_factor: f64,
    influence_related: f64,
}

impl TruthFinder {
    /// Create an engine with the given dampening factor `ρ ∈ (0, 1)` and
    /// related-fact influence `γ ∈ [0, 1]`.
    pub fn new(dampening_factor: f64, influence_related: f64) -> Result<Self, TruthFinderError> {
        if !(dampening_factor > 0.0 && dampening_factor < 1.0) {
            return Err(TruthFinderError::InvalidParameter {
                name: "dampening_factor",
                value: dampening_factor,
            });
        }
        if !(0.0..=1.0).contains(&influence_related) {
            return Err(TruthFinderError::InvalidParameter {
                name: "influence_related",
                value: influence_related,
            });
        }
        Ok(Self {
            dampening_factor,
            influence_related,
        })
    }

    /// Run the algorithm over the table.
    ///
    /// Fact confidences are reset to zero, then up to `max_iterations`
    /// iterations run, stopping early when the change in the per-source
    /// trustworthiness vector falls below `threshold`.
    pub fn run(&self, rows: &mut [ConsolidationRow], max_iterations: usize, threshold: f64) {
        for row in rows.iter_mut() {
            row.fact_confidence = 0.0;
        }
        for iteration in 0..max_iterations {
            let before = source_trust_vector(rows);
            self.iterate(rows);
            let after = source_trust_vector(rows);
            if let Some(change) = trust_change(&before, &after) {
                debug!(iteration, change, "trustworthiness change");
                if change < threshold {
                    return;
                }
            }
        }
    }

    /// One full iteration: confidence update per object group, then the
    /// table-wide trustworthiness update.
    fn iterate(&self, rows: &mut [ConsolidationRow]) {
        for indices in object_groups(rows) {
            self.confidence_from_trust(rows, &indices);
            self.adjust_for_related_facts(rows, &indices);
            self.squash(rows, &indices);
        }
        update_source_trustworthiness(rows);
    }

    /// Step 1: provisional confidence is the summed trustworthiness score
    /// of every row claiming the same fact (the row itself included).
    fn confidence_from_trust(&self, rows: &mut [ConsolidationRow], indices: &[usize]) {
        let scores: Vec<f64> = indices
            .iter()
            .map(|&i| {
                indices
                    .iter()
                    .filter(|&&j| rows[j].fact == rows[i].fact)
                    .map(|&j| -(1.0 - clamp_trust(rows[j].trustworthiness)).ln())
                    .sum()
            })
            .collect();
        for (&i, score) in indices.iter().zip(scores) {
            rows[i].fact_confidence = score;
        }
    }

    /// Step 2: add the implication-weighted confidences of the object's
    /// other distinct facts. All adjusted values are snapshotted before
    /// write-back so iteration order is immaterial.
    fn adjust_for_related_facts(&self, rows: &mut [ConsolidationRow], indices: &[usize]) {
        // One representative row per distinct fact; after step 1 equal
        // facts carry equal confidence.
        let mut representatives: Vec<usize> = Vec::new();
        for &i in indices {
            if !representatives.iter().any(|&r| rows[r].fact == rows[i].fact) {
                representatives.push(i);
            }
        }

        let adjusted: Vec<f64> = indices
            .iter()
            .map(|&i| {
                let related: f64 = representatives
                    .iter()
                    .filter(|&&r| rows[r].fact != rows[i].fact)
                    .map(|&r| {
                        rows[r].fact_confidence
                            * implication(rows[i].datatype, &rows[r].fact, &rows[i].fact)
                    })
                    .sum();
                rows[i].fact_confidence + self.influence_related * related
            })
            .collect();
        for (&i, value) in indices.iter().zip(adjusted) {
            rows[i].fact_confidence = value;
        }
    }

    /// Step 3: squash into (0, 1) with the dampened sigmoid.
    fn squash(&self, rows: &mut [ConsolidationRow], indices: &[usize]) {
        for &i in indices {
            rows[i].fact_confidence = sigmoid(self.dampening_factor * rows[i].fact_confidence);
        }
    }
}

/// Step 4: each source's trustworthiness becomes the arithmetic mean of the
/// confidences of its rows, across the whole table.
fn update_source_trustworthiness(rows: &mut [ConsolidationRow]) {
    for source in distinct_sources(rows) {
        let confidences: Vec<f64> = rows
            .iter()
            .filter(|r| r.source == source)
            .map(|r| r.fact_confidence)
            .collect();
        let mean = confidences.iter().sum::<f64>() / confidences.len() as f64;
        for row in rows.iter_mut().filter(|r| r.source == source) {
            row.trustworthiness = mean;
        }
    }
}

/// Index lists of the table's object groups, in first-appearance order.
fn object_groups(rows: &[ConsolidationRow]) -> Vec<Vec<usize>> {
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        match groups.iter_mut().find(|(object, _)| *object == row.object) {
            Some((_, indices)) => indices.push(i),
            None => groups.push((row.object.clone(), vec![i])),
        }
    }
    groups.into_iter().map(|(_, indices)| indices).collect()
}

fn distinct_sources(rows: &[ConsolidationRow]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for row in rows {
        if !sources.iter().any(|s| *s == row.source) {
            sources.push(row.source.clone());
        }
    }
    sources
}

/// Per-source trustworthiness in first-appearance order.
fn source_trust_vector(rows: &[ConsolidationRow]) -> Vec<f64> {
    distinct_sources(rows)
        .iter()
        .map(|source| {
            rows.iter()
                .find(|r| r.source == *source)
                .map(|r| r.trustworthiness)
                .unwrap_or(0.0)
        })
        .collect()
}

/// Change between two trustworthiness vectors, measured as one minus their
/// cosine similarity. Returns `None` for zero-norm vectors.
fn trust_change(before: &[f64], after: &[f64]) -> Option<f64> {
    let dot: f64 = before.iter().zip(after).map(|(a, b)| a * b).sum();
    let norm_before: f64 = before.iter().map(|v| v * v).sum::<f64>().sqrt();
    let norm_after: f64 = after.iter().map(|v| v * v).sum::<f64>().sqrt();
    if norm_before == 0.0 || norm_after == 0.0 {
        return None;
    }
    Some(1.0 - dot / (norm_before * norm_after))
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_domain::{Datatype, Fact};

    fn row(source: &str, fact: Fact, object: &str, datatype: Datatype, trust: f64) -> ConsolidationRow {
        ConsolidationRow {
            source: source.to_string(),
            fact,
            object: object.to_string(),
            datatype,
            trustworthiness: trust,
            fact_confidence: 0.0,
        }
    }

    #[test]
    fn test_rejects_out_of_range_parameters() {
        assert!(TruthFinder::new(0.0, 0.5).is_err());
        assert!(TruthFinder::new(1.0, 0.5).is_err());
        assert!(TruthFinder::new(0.5, -0.1).is_err());
        assert!(TruthFinder::new(0.5, 1.1).is_err());
        assert!(TruthFinder::new(0.1, 0.8).is_ok());
    }

    #[test]
    fn test_single_source_equal_facts_share_confidence() {
        let engine = TruthFinder::new(0.1, 0.8).unwrap();
        let mut rows = vec![
            row("S1", Fact::Number(100.0), "price", Datatype::Continuous, 0.5),
            row("S1", Fact::Number(100.0), "price", Datatype::Continuous, 0.5),
        ];
        engine.run(&mut rows, 1, 1e-4);

        assert_eq!(rows[0].fact_confidence, rows[1].fact_confidence);
        // Two rows each contribute -ln(0.5); sigmoid(0.1 * 2 * ln 2)
        let expected = sigmoid(0.1 * 2.0 * std::f64::consts::LN_2);
        assert!((rows[0].fact_confidence - expected).abs() < 1e-12);
        // Single source: trustworthiness equals the mean confidence
        assert!((rows[0].trustworthiness - expected).abs() < 1e-12);
    }

    #[test]
    fn test_more_trusted_source_wins_categorical_dispute() {
        let engine = TruthFinder::new(0.1, 0.8).unwrap();
        let mut rows = vec![
            row("S1", Fact::Text("red".to_string()), "color", Datatype::Categorical, 0.9),
            row("S2", Fact::Text("blue".to_string()), "color", Datatype::Categorical, 0.1),
        ];
        engine.run(&mut rows, 1, 1e-4);

        assert!(rows[0].fact_confidence > rows[1].fact_confidence);
        assert!(rows[0].fact_confidence > 0.5);
        assert!(rows[1].fact_confidence < 0.5);
    }

    #[test]
    fn test_address_fields_are_independent_groups() {
        let engine = TruthFinder::new(0.1, 0.8).unwrap();
        // Disagreement in hq-street must not leak into hq-city
        let mut rows = vec![
            row("S1", Fact::Text("1 A".to_string()), "hq-street", Datatype::String, 0.5),
            row("S2", Fact::Text("9 Z".to_string()), "hq-street", Datatype::String, 0.5),
            row("S1", Fact::Text("X".to_string()), "hq-city", Datatype::String, 0.5),
        ];
        let mut lone = vec![row(
            "S1",
            Fact::Text("X".to_string()),
            "hq-city",
            Datatype::String,
            0.5,
        )];
        engine.run(&mut rows, 1, 1e-4);
        engine.run(&mut lone, 1, 1e-4);

        assert!((rows[2].fact_confidence - lone[0].fact_confidence).abs() < 1e-12);
    }

    #[test]
    fn test_iteration_count_is_respected() {
        let engine = TruthFinder::new(0.3, 0.5).unwrap();
        let build = || {
            vec![
                row("S1", Fact::Text("a".to_string()), "o", Datatype::Categorical, 0.7),
                row("S2", Fact::Text("b".to_string()), "o", Datatype::Categorical, 0.4),
            ]
        };
        let mut one = build();
        let mut two = build();
        engine.run(&mut one, 1, 0.0);
        engine.run(&mut two, 2, 0.0);

        // A second iteration re-derives confidence from updated trust
        assert!((one[0].fact_confidence - two[0].fact_confidence).abs() > 1e-9);
    }

    #[test]
    fn test_convergence_stops_iteration() {
        let engine = TruthFinder::new(0.1, 0.8).unwrap();
        let build = || vec![row("S1", Fact::Number(5.0), "n", Datatype::Continuous, 0.5)];
        // With a generous threshold the loop exits after the first pass,
        // so 1 and 100 max iterations agree.
        let mut capped = build();
        let mut generous = build();
        engine.run(&mut capped, 1, 0.5);
        engine.run(&mut generous, 100, 0.5);

        assert!((capped[0].fact_confidence - generous[0].fact_confidence).abs() < 1e-12);
    }

    #[test]
    fn test_extreme_trust_is_clamped() {
        let engine = TruthFinder::new(0.1, 0.8).unwrap();
        let mut rows = vec![
            row("S1", Fact::Number(1.0), "n", Datatype::Continuous, 1.0),
            row("S2", Fact::Number(1.0), "n", Datatype::Continuous, 0.0),
        ];
        engine.run(&mut rows, 1, 1e-4);

        for r in &rows {
            assert!(r.fact_confidence.is_finite());
            assert!(r.fact_confidence > 0.0 && r.fact_confidence < 1.0);
        }
    }
}
