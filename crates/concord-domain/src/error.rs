//! Error types shared across the domain seams

use thiserror::Error;

/// Errors surfaced by `ReputationStore` implementations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested source has no record
    #[error("source not found: {0}")]
    NotFound(String),

    /// The backing store failed
    #[error("store backend error: {0}")]
    Backend(String),
}
