//! Error types for the consolidation pipeline

use concord_reputation::ReputationError;
use concord_truthfinder::TruthFinderError;
use thiserror::Error;

/// Errors that can occur consolidating a request
#[derive(Debug, Error)]
pub enum ConsolidateError {
    /// Malformed claim payload: wrong shape, missing field, wrong value type
    #[error("invalid input format: {0}")]
    InvalidInput(String),

    /// Malformed or incomplete caller-supplied sources (stateless mode)
    #[error("invalid source format: {0}")]
    InvalidSource(String),

    /// Engine hyperparameters out of range
    #[error(transparent)]
    Engine(#[from] TruthFinderError),

    /// Reputation model or store failure
    #[error(transparent)]
    Reputation(#[from] ReputationError),
}

impl ConsolidateError {
    /// Whether this error is the caller's fault (a 400-class failure)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ConsolidateError::InvalidInput(_) | ConsolidateError::InvalidSource(_)
        )
    }
}
