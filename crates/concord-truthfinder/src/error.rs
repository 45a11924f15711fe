//! Error types for the TruthFinder engine

use thiserror::Error;

/// Errors that can occur constructing or running the engine
#[derive(Debug, Error)]
pub enum TruthFinderError {
    /// A hyperparameter is outside its accepted interval
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },
}
