//! Fact values and the datatype taxonomy

use serde::{Deserialize, Serialize};
use std::fmt;

/// A fact claimed about an object.
///
/// Facts are tagged scalars; list- and address-valued inputs are exploded
/// into multiple scalar facts before consolidation. Within one object's rows
/// facts are compared by value equality, which is what groups agreeing
/// claims together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Fact {
    /// Boolean fact
    Flag(bool),
    /// Numeric fact (integers and floats share one representation)
    Number(f64),
    /// Textual fact
    Text(String),
}

impl Fact {
    /// Numeric value, if this fact is a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Fact::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text value, if this fact is a string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Fact::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean value, if this fact is a flag
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Fact::Flag(b) => Some(*b),
            _ => None,
        }
    }

    /// Human-readable name of the variant, used in validation errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            Fact::Flag(_) => "boolean",
            Fact::Number(_) => "number",
            Fact::Text(_) => "string",
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fact::Flag(b) => write!(f, "{}", b),
            Fact::Number(n) => write!(f, "{}", n),
            Fact::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Row-level datatype of a consolidation row.
///
/// List and address inputs are gone by the time rows exist; only the four
/// base datatypes reach the consolidation algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    /// Numeric values compared by distance
    Continuous,
    /// Free-form text compared by string similarity
    String,
    /// Discrete labels compared by equality
    Categorical,
    /// Booleans, compared by equality
    Boolean,
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Datatype::Continuous => "continuous",
            Datatype::String => "string",
            Datatype::Categorical => "categorical",
            Datatype::Boolean => "boolean",
        };
        write!(f, "{}", name)
    }
}

/// Envelope-level datatype of an object's claims.
///
/// This is what callers declare per object; the normalizer reduces the
/// compound kinds to base-datatype rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClaimKind {
    /// Scalar numeric claims
    Continuous,
    /// Scalar string claims
    String,
    /// Scalar categorical claims
    Categorical,
    /// Scalar boolean claims
    Boolean,
    /// One string claim per list element
    ListString,
    /// One categorical claim per list element
    ListCategorical,
    /// One string claim per non-null address field
    Address,
}

impl ClaimKind {
    /// Whether this kind produces the address-shaped response
    pub fn is_address(&self) -> bool {
        matches!(self, ClaimKind::Address)
    }
}
