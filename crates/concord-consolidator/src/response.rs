//! Consolidation response shapes

use concord_domain::{Fact, SourceRecord};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One consolidated claim in a response.
///
/// Plain objects rank every surviving row; address objects collapse into a
/// single claim carrying the winning value per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConsolidatedClaim {
    /// A ranked fact with the source that supplied it
    Value {
        /// The fact, coerced to its natural JSON scalar
        fact: Fact,
        /// Confidence score, rounded to 3 decimals
        confidence: f64,
        /// Source that supplied the fact
        #[serde(rename = "sourceId")]
        source_id: String,
    },
    /// The winning value per address field
    Address {
        /// Field name to winning value
        fact: IndexMap<String, String>,
        /// Mean of the per-field top confidences, rounded to 3 decimals
        confidence: f64,
    },
}

/// The consolidated view of one object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedObject {
    /// Object name; the literal `"address"` for address objects
    pub name: String,
    /// Consolidated claims, most confident first
    pub claims: Vec<ConsolidatedClaim>,
}

/// The full response to a consolidation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Request timestamp, RFC 3339 local time
    pub timestamp: String,
    /// One element per consolidated object
    pub objects: Vec<ConsolidatedObject>,
    /// Updated source records, latest state per source
    pub sources: Vec<SourceRecord>,
}

/// Round a confidence to 3 decimals for presentation.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
