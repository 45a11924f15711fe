//! Claim envelopes and consolidation rows

use crate::fact::{ClaimKind, Datatype, Fact};
use serde::{Deserialize, Serialize};

/// A postal address supplied as a compound fact.
///
/// Every field is optional; null fields are skipped during normalization.
/// Field names follow the wire casing so they round-trip through responses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    /// Street line
    #[serde(default)]
    pub street: Option<String>,
    /// Suburb
    #[serde(default)]
    pub suburb: Option<String>,
    /// Province
    #[serde(default)]
    pub province: Option<String>,
    /// City
    #[serde(default)]
    pub city: Option<String>,
    /// District
    #[serde(default)]
    pub district: Option<String>,
    /// State
    #[serde(default)]
    pub state: Option<String>,
    /// Postal code
    #[serde(default, rename = "postalCode")]
    pub postal_code: Option<String>,
    /// Country
    #[serde(default)]
    pub country: Option<String>,
}

impl Address {
    /// Iterate the fields in declaration order as (wire name, value) pairs
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> {
        [
            ("street", self.street.as_deref()),
            ("suburb", self.suburb.as_deref()),
            ("province", self.province.as_deref()),
            ("city", self.city.as_deref()),
            ("district", self.district.as_deref()),
            ("state", self.state.as_deref()),
            ("postalCode", self.postal_code.as_deref()),
            ("country", self.country.as_deref()),
        ]
        .into_iter()
    }

    /// Number of non-null fields
    pub fn populated_count(&self) -> usize {
        self.fields().filter(|(_, v)| v.is_some()).count()
    }
}

/// The fact payload of one claim, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimFact {
    /// A scalar fact (number, string, or boolean)
    Scalar(Fact),
    /// A list of string elements, one row each
    List(Vec<String>),
    /// An address record, one string row per non-null field
    Address(Address),
}

/// One claim as supplied by a caller: a source asserting a fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimInput {
    /// Identifier of the source making the claim
    #[serde(rename = "sourceId")]
    pub source_id: String,
    /// The fact being supplied
    pub fact: ClaimFact,
}

/// All claims about one named object, as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectClaims {
    /// Name of the object being consolidated
    pub name: String,
    /// Declared datatype of the claims
    pub datatype: ClaimKind,
    /// The claims themselves
    pub claims: Vec<ClaimInput>,
}

/// A flat claim row produced by normalization.
///
/// List and address payloads are exploded before this point, so the fact is
/// always a scalar and the datatype one of the four base datatypes.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedClaim {
    /// Identifier of the source making the claim
    pub source_id: String,
    /// Object name; address fields carry a `"{name}-{field}"` suffix
    pub object: String,
    /// The scalar fact
    pub fact: Fact,
    /// Row-level datatype
    pub datatype: Datatype,
}

/// One row of the per-object consolidation table.
///
/// Trustworthiness is seeded from the source's reputation and re-estimated
/// each iteration; fact confidence starts at zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsolidationRow {
    /// Source identifier
    pub source: String,
    /// The claimed fact
    pub fact: Fact,
    /// Object name the fact refers to
    pub object: String,
    /// Row-level datatype
    pub datatype: Datatype,
    /// Current trustworthiness estimate for the source, in (0, 1)
    pub trustworthiness: f64,
    /// Current confidence estimate for the fact
    pub fact_confidence: f64,
}

impl ConsolidationRow {
    /// Build a row from a normalized claim with seeded trustworthiness
    pub fn seeded(claim: NormalizedClaim, trustworthiness: f64) -> Self {
        Self {
            source: claim.source_id,
            fact: claim.fact,
            object: claim.object,
            datatype: claim.datatype,
            trustworthiness,
            fact_confidence: 0.0,
        }
    }
}
