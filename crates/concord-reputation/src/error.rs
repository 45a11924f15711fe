//! Error types for the reputation engine

use concord_domain::StoreError;
use thiserror::Error;

/// Errors that can occur operating on reputation state
#[derive(Debug, Error)]
pub enum ReputationError {
    /// A model parameter is outside its accepted interval
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// A rating vector does not match the configured level count
    #[error("invalid rating: expected {expected} levels, got {actual}")]
    InvalidRating {
        /// Configured k
        expected: usize,
        /// Supplied vector length
        actual: usize,
    },

    /// A referenced source has no record
    #[error("unknown source: {0}")]
    UnknownSource(String),

    /// Stateless operation called without the caller-supplied sources
    #[error("stateless operation requires source records")]
    MissingSources,

    /// The backing store failed
    #[error(transparent)]
    Store(#[from] StoreError),
}
