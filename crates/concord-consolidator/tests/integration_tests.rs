//! End-to-end consolidation scenarios driven through the workload manager.

use concord_consolidator::{ConsolidatedClaim, WorkloadManager};
use concord_domain::{ObjectClaims, SourceRecord};
use concord_store::MemoryStore;
use std::sync::Arc;

fn stateless_manager(k: usize, lf: f64) -> WorkloadManager {
    WorkloadManager::new(k, lf, 0.1, 0.8, false, Arc::new(MemoryStore::new())).unwrap()
}

fn stateful_manager(k: usize, lf: f64, store: Arc<MemoryStore>) -> WorkloadManager {
    WorkloadManager::new(k, lf, 0.1, 0.8, true, store).unwrap()
}

fn parse_objects(json: &str) -> Vec<ObjectClaims> {
    serde_json::from_str(json).unwrap()
}

fn uniform_source(id: &str, k: usize, reputation: f64) -> SourceRecord {
    SourceRecord::with_uniform_prior(id, k, reputation)
}

#[test]
fn single_source_continuous_two_claims() {
    let manager = stateless_manager(10, 1.0);
    let objects = parse_objects(
        r#"[{
            "name": "price",
            "datatype": "continuous",
            "claims": [
                {"sourceId": "S1", "fact": 100},
                {"sourceId": "S1", "fact": 100}
            ]
        }]"#,
    );
    let sources = vec![uniform_source("S1", 10, 0.5)];

    let response = manager.run(objects, Some(sources)).unwrap();
    let object = &response.objects[0];
    assert_eq!(object.name, "price");
    assert_eq!(object.claims.len(), 2);

    let confidences: Vec<f64> = object
        .claims
        .iter()
        .map(|claim| match claim {
            ConsolidatedClaim::Value {
                fact,
                confidence,
                source_id,
            } => {
                assert_eq!(source_id, "S1");
                assert_eq!(serde_json::to_value(fact).unwrap(), 100.0);
                *confidence
            }
            other => panic!("unexpected claim shape: {:?}", other),
        })
        .collect();
    assert_eq!(confidences[0], confidences[1]);
}

#[test]
fn disagreeing_categorical_sources_rank_by_reputation() {
    let manager = stateless_manager(10, 1.0);
    let objects = parse_objects(
        r#"[{
            "name": "color",
            "datatype": "categorical",
            "claims": [
                {"sourceId": "S1", "fact": "red"},
                {"sourceId": "S2", "fact": "blue"}
            ]
        }]"#,
    );
    let sources = vec![
        uniform_source("S1", 10, 0.9),
        uniform_source("S2", 10, 0.1),
    ];

    let response = manager.run(objects, Some(sources)).unwrap();
    let claims = &response.objects[0].claims;

    let fact_of = |claim: &ConsolidatedClaim| match claim {
        ConsolidatedClaim::Value { fact, .. } => serde_json::to_value(fact).unwrap(),
        other => panic!("unexpected claim shape: {:?}", other),
    };
    assert_eq!(fact_of(&claims[0]), "red");
    assert_eq!(fact_of(&claims[1]), "blue");
}

#[test]
fn address_object_collapses_to_field_map() {
    let manager = stateless_manager(10, 1.0);
    let objects = parse_objects(
        r#"[{
            "name": "hq",
            "datatype": "address",
            "claims": [
                {"sourceId": "S1", "fact": {"street": "1 A", "city": "X", "country": null}}
            ]
        }]"#,
    );
    let sources = vec![uniform_source("S1", 10, 0.5)];

    let response = manager.run(objects, Some(sources)).unwrap();
    let object = &response.objects[0];
    assert_eq!(object.name, "address");
    assert_eq!(object.claims.len(), 1);

    match &object.claims[0] {
        ConsolidatedClaim::Address { fact, confidence } => {
            assert_eq!(fact.len(), 2);
            assert_eq!(fact.get("street").map(String::as_str), Some("1 A"));
            assert_eq!(fact.get("city").map(String::as_str), Some("X"));
            assert!(*confidence > 0.0 && *confidence < 1.0);
        }
        other => panic!("unexpected claim shape: {:?}", other),
    }
}

#[test]
fn stateless_mode_requires_sources() {
    let manager = stateless_manager(10, 1.0);
    let objects = parse_objects(
        r#"[{
            "name": "price",
            "datatype": "continuous",
            "claims": [{"sourceId": "S1", "fact": 1}]
        }]"#,
    );

    let error = manager.run(objects, None).unwrap_err();
    assert!(error.to_string().contains("source information"));
}

#[test]
fn longevity_decay_compounds_across_objects() {
    // lf = 0.5: a source rated in two objects sees its first rating aged
    // once before the second is added, so the total lands between 1 and 2.
    let manager = stateless_manager(4, 0.5);
    let objects = parse_objects(
        r#"[
            {"name": "a", "datatype": "continuous",
             "claims": [{"sourceId": "S1", "fact": 1}]},
            {"name": "b", "datatype": "continuous",
             "claims": [{"sourceId": "S1", "fact": 2}]}
        ]"#,
    );
    let sources = vec![uniform_source("S1", 4, 0.5)];

    let response = manager.run(objects, Some(sources)).unwrap();
    let total: f64 = response.sources[0].ratings.iter().sum();
    assert!((total - 1.5).abs() < 1e-12);
}

#[test]
fn clear_then_reseed_returns_default_reputation() {
    let store = Arc::new(MemoryStore::new());
    let manager = stateful_manager(10, 1.0, store.clone());
    let objects = parse_objects(
        r#"[{
            "name": "price",
            "datatype": "continuous",
            "claims": [{"sourceId": "S1", "fact": 1}]
        }]"#,
    );

    manager.run(objects.clone(), None).unwrap();
    manager.run(objects.clone(), None).unwrap();
    assert_eq!(store.len(), 1);

    manager.clear_reputation().unwrap();
    assert!(store.is_empty());

    // A fresh run recreates the record from the uniform prior; only the
    // new run's single rating is accumulated
    let response = manager.run(objects, None).unwrap();
    let record = &response.sources[0];
    assert_eq!(record.ratings.iter().sum::<f64>(), 1.0);
}

#[test]
fn response_serializes_to_wire_shape() {
    let manager = stateless_manager(10, 1.0);
    let objects = parse_objects(
        r#"[{
            "name": "size",
            "datatype": "list-string",
            "claims": [{"sourceId": "S1", "fact": ["small", "large"]}]
        }]"#,
    );
    let sources = vec![uniform_source("S1", 10, 0.5)];

    let response = manager.run(objects, Some(sources)).unwrap();
    let json = serde_json::to_value(&response).unwrap();

    assert!(json["timestamp"].is_string());
    assert_eq!(json["objects"][0]["name"], "size");
    assert_eq!(json["objects"][0]["claims"].as_array().unwrap().len(), 2);
    assert!(json["objects"][0]["claims"][0]["sourceId"].is_string());
    assert!(json["objects"][0]["claims"][0]["confidence"].is_number());
    assert_eq!(json["sources"][0]["sourceId"], "S1");
    assert_eq!(json["sources"][0]["probabilities"].as_array().unwrap().len(), 10);
    assert_eq!(json["sources"][0]["ratings"].as_array().unwrap().len(), 10);
}

#[test]
fn boolean_claims_consolidate_by_equality() {
    let manager = stateless_manager(10, 1.0);
    let objects = parse_objects(
        r#"[{
            "name": "inStock",
            "datatype": "boolean",
            "claims": [
                {"sourceId": "S1", "fact": true},
                {"sourceId": "S2", "fact": true},
                {"sourceId": "S3", "fact": false}
            ]
        }]"#,
    );
    let sources = vec![
        uniform_source("S1", 10, 0.5),
        uniform_source("S2", 10, 0.5),
        uniform_source("S3", 10, 0.5),
    ];

    let response = manager.run(objects, Some(sources)).unwrap();
    match &response.objects[0].claims[0] {
        ConsolidatedClaim::Value { fact, .. } => {
            // Two agreeing sources outweigh one dissenter
            assert_eq!(serde_json::to_value(fact).unwrap(), true);
        }
        other => panic!("unexpected claim shape: {:?}", other),
    }
}
