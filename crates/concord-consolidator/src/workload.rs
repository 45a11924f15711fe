//! Request-level orchestration

use crate::consolidator::Consolidator;
use crate::error::ConsolidateError;
use crate::normalizer::normalize_object;
use crate::response::Response;
use concord_domain::{ObjectClaims, ReputationStore, SourceRecord};
use concord_reputation::SourceMap;
use rand::seq::SliceRandom;
use rand::thread_rng;
use std::sync::Arc;
use tracing::info;

/// Drives a whole consolidation request: normalizes the supplied sources,
/// shuffles the objects, consolidates each in turn, and merges the updated
/// source records into the response envelope.
pub struct WorkloadManager {
    consolidator: Consolidator,
    stateful: bool,
}

impl WorkloadManager {
    /// Create a workload manager from the engine parameters.
    pub fn new(
        k: usize,
        lf: f64,
        dampening: f64,
        influence: f64,
        stateful: bool,
        store: Arc<dyn ReputationStore>,
    ) -> Result<Self, ConsolidateError> {
        Ok(Self {
            consolidator: Consolidator::new(k, lf, dampening, influence, stateful, store)?,
            stateful,
        })
    }

    /// Run the consolidation process for a payload.
    ///
    /// Objects are consolidated sequentially in a randomly permuted order:
    /// reputation updates are path-dependent when the longevity factor is
    /// below 1, and shuffling removes the systematic bias a fixed order
    /// would introduce. Any per-object failure aborts the whole request.
    pub fn run(
        &self,
        mut objects: Vec<ObjectClaims>,
        sources: Option<Vec<SourceRecord>>,
    ) -> Result<Response, ConsolidateError> {
        info!(objects = objects.len(), "executing workload");

        let mut source_map: Option<SourceMap> = if self.stateful {
            None
        } else {
            let supplied = sources.ok_or_else(|| {
                ConsolidateError::InvalidInput(
                    "stateless mode requires source information".to_string(),
                )
            })?;
            Some(
                supplied
                    .into_iter()
                    .map(|record| (record.source_id.clone(), record))
                    .collect(),
            )
        };

        objects.shuffle(&mut thread_rng());

        let mut consolidated = Vec::with_capacity(objects.len());
        let mut merged: SourceMap = SourceMap::new();
        for object in objects {
            let claims = normalize_object(&object)?;
            let (result, updated) = self.consolidator.consolidate(
                &object.name,
                object.datatype,
                claims,
                source_map.as_mut(),
            )?;
            consolidated.push(result);
            // Latest record wins and moves to the end of the list
            for record in updated {
                merged.shift_remove(&record.source_id);
                merged.insert(record.source_id.clone(), record);
            }
        }

        info!(objects = consolidated.len(), "workload executed");
        Ok(Response {
            timestamp: chrono::Local::now().to_rfc3339(),
            objects: consolidated,
            sources: merged.into_values().collect(),
        })
    }

    /// Drop all persisted reputation data.
    pub fn clear_reputation(&self) -> Result<(), ConsolidateError> {
        self.consolidator.clear_reputation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ConsolidatedClaim;
    use concord_domain::{ClaimFact, ClaimInput, ClaimKind, Fact};
    use concord_store::MemoryStore;

    fn manager(stateful: bool) -> WorkloadManager {
        WorkloadManager::new(10, 1.0, 0.1, 0.8, stateful, Arc::new(MemoryStore::new())).unwrap()
    }

    fn object(name: &str, datatype: ClaimKind, claims: Vec<(&str, ClaimFact)>) -> ObjectClaims {
        ObjectClaims {
            name: name.to_string(),
            datatype,
            claims: claims
                .into_iter()
                .map(|(source_id, fact)| ClaimInput {
                    source_id: source_id.to_string(),
                    fact,
                })
                .collect(),
        }
    }

    fn record(id: &str, reputation: f64) -> SourceRecord {
        SourceRecord::with_uniform_prior(id, 10, reputation)
    }

    #[test]
    fn test_stateless_requires_sources() {
        let manager = manager(false);
        let objects = vec![object(
            "price",
            ClaimKind::Continuous,
            vec![("S1", ClaimFact::Scalar(Fact::Number(1.0)))],
        )];

        let result = manager.run(objects, None);
        assert!(matches!(result, Err(ConsolidateError::InvalidInput(_))));
    }

    #[test]
    fn test_response_envelope_shape() {
        let manager = manager(false);
        let objects = vec![object(
            "price",
            ClaimKind::Continuous,
            vec![
                ("S1", ClaimFact::Scalar(Fact::Number(100.0))),
                ("S2", ClaimFact::Scalar(Fact::Number(90.0))),
            ],
        )];
        let sources = vec![record("S1", 0.8), record("S2", 0.3)];

        let response = manager.run(objects, Some(sources)).unwrap();
        assert_eq!(response.objects.len(), 1);
        assert_eq!(response.sources.len(), 2);
        assert!(!response.timestamp.is_empty());

        // The better-reputed source's fact ranks first
        match &response.objects[0].claims[0] {
            ConsolidatedClaim::Value { fact, .. } => assert_eq!(*fact, Fact::Number(100.0)),
            other => panic!("unexpected claim shape: {:?}", other),
        }
    }

    #[test]
    fn test_source_merge_keeps_latest_entry_only() {
        let manager = manager(false);
        // Same source claims in both objects; its record must appear once
        let objects = vec![
            object(
                "price",
                ClaimKind::Continuous,
                vec![("S1", ClaimFact::Scalar(Fact::Number(1.0)))],
            ),
            object(
                "weight",
                ClaimKind::Continuous,
                vec![("S1", ClaimFact::Scalar(Fact::Number(2.0)))],
            ),
        ];
        let sources = vec![record("S1", 0.5)];

        let response = manager.run(objects, Some(sources)).unwrap();
        assert_eq!(response.sources.len(), 1);
        // Both objects rated S1, so both ratings are in the final record
        assert_eq!(response.sources[0].ratings.iter().sum::<f64>(), 2.0);
    }

    #[test]
    fn test_stateful_run_without_sources() {
        let manager = manager(true);
        let objects = vec![object(
            "color",
            ClaimKind::Categorical,
            vec![
                ("S1", ClaimFact::Scalar(Fact::Text("red".to_string()))),
                ("S2", ClaimFact::Scalar(Fact::Text("blue".to_string()))),
            ],
        )];

        let response = manager.run(objects, None).unwrap();
        assert_eq!(response.objects.len(), 1);
        assert_eq!(response.sources.len(), 2);
    }

    #[test]
    fn test_per_object_failure_aborts_request() {
        let manager = manager(false);
        let objects = vec![
            object(
                "price",
                ClaimKind::Continuous,
                vec![("S1", ClaimFact::Scalar(Fact::Number(1.0)))],
            ),
            // Text fact on a continuous object is invalid input
            object(
                "bad",
                ClaimKind::Continuous,
                vec![("S1", ClaimFact::Scalar(Fact::Text("oops".to_string())))],
            ),
        ];
        let sources = vec![record("S1", 0.5)];

        assert!(manager.run(objects, Some(sources)).is_err());
    }
}
