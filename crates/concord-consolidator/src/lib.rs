//! Concord Consolidator
//!
//! Orchestration of the consolidation pipeline. For each object this crate
//! normalizes the supplied claims into flat rows, seeds them with source
//! reputation, runs the TruthFinder engine, derives per-row ratings, folds
//! them back into reputation, and assembles the response element. The
//! request-level [`WorkloadManager`] drives the per-object
//! [`Consolidator`] over a whole payload.

#![warn(missing_docs)]

pub mod consolidator;
pub mod error;
pub mod normalizer;
pub mod response;
pub mod workload;

pub use consolidator::Consolidator;
pub use error::ConsolidateError;
pub use normalizer::normalize_object;
pub use response::{ConsolidatedClaim, ConsolidatedObject, Response};
pub use workload::WorkloadManager;
