//! Claim normalization
//!
//! Flattens the heterogeneous claim payloads callers supply (scalars,
//! string lists, address records) into uniform rows of the four base
//! datatypes. List facts become one row per element; address facts become
//! one string row per non-null field, with the field name appended to the
//! object name.

use crate::error::ConsolidateError;
use concord_domain::{ClaimFact, ClaimKind, Datatype, Fact, NormalizedClaim, ObjectClaims};

/// Expand one object's claims into flat rows.
///
/// The declared datatype dictates the accepted fact shape; a claim whose
/// fact does not match is rejected as invalid input.
pub fn normalize_object(object: &ObjectClaims) -> Result<Vec<NormalizedClaim>, ConsolidateError> {
    if object.name.is_empty() {
        return Err(ConsolidateError::InvalidInput(
            "object name must not be empty".to_string(),
        ));
    }
    let mut rows = Vec::new();
    for claim in &object.claims {
        if claim.source_id.is_empty() {
            return Err(ConsolidateError::InvalidInput(format!(
                "object {}: sourceId must not be empty",
                object.name
            )));
        }
        match (object.datatype, &claim.fact) {
            (ClaimKind::Address, ClaimFact::Address(address)) => {
                for (field, value) in address.fields() {
                    if let Some(value) = value {
                        rows.push(NormalizedClaim {
                            source_id: claim.source_id.clone(),
                            object: format!("{}-{}", object.name, field),
                            fact: Fact::Text(value.to_string()),
                            datatype: Datatype::String,
                        });
                    }
                }
            }
            (ClaimKind::ListString, ClaimFact::List(elements)) => {
                for element in elements {
                    rows.push(NormalizedClaim {
                        source_id: claim.source_id.clone(),
                        object: object.name.clone(),
                        fact: Fact::Text(element.clone()),
                        datatype: Datatype::String,
                    });
                }
            }
            (ClaimKind::ListCategorical, ClaimFact::List(elements)) => {
                for element in elements {
                    rows.push(NormalizedClaim {
                        source_id: claim.source_id.clone(),
                        object: object.name.clone(),
                        fact: Fact::Text(element.clone()),
                        datatype: Datatype::Categorical,
                    });
                }
            }
            (kind, ClaimFact::Scalar(fact)) => {
                let datatype = scalar_datatype(kind, fact, &object.name, &claim.source_id)?;
                rows.push(NormalizedClaim {
                    source_id: claim.source_id.clone(),
                    object: object.name.clone(),
                    fact: fact.clone(),
                    datatype,
                });
            }
            (kind, _) => {
                return Err(ConsolidateError::InvalidInput(format!(
                    "object {}: claim by {} has a fact shape incompatible with datatype {:?}",
                    object.name, claim.source_id, kind
                )));
            }
        }
    }
    Ok(rows)
}

/// Row datatype for a scalar claim, checking the fact's variant against the
/// declared kind. Categorical accepts any scalar; the other kinds are
/// strict.
fn scalar_datatype(
    kind: ClaimKind,
    fact: &Fact,
    object: &str,
    source_id: &str,
) -> Result<Datatype, ConsolidateError> {
    let mismatch = |expected: &str| {
        ConsolidateError::InvalidInput(format!(
            "object {}: claim by {} expected a {} fact, got {}",
            object,
            source_id,
            expected,
            fact.kind_name()
        ))
    };
    match kind {
        ClaimKind::Continuous => match fact {
            Fact::Number(_) => Ok(Datatype::Continuous),
            _ => Err(mismatch("number")),
        },
        ClaimKind::String => match fact {
            Fact::Text(_) => Ok(Datatype::String),
            _ => Err(mismatch("string")),
        },
        ClaimKind::Boolean => match fact {
            Fact::Flag(_) => Ok(Datatype::Boolean),
            _ => Err(mismatch("boolean")),
        },
        ClaimKind::Categorical => Ok(Datatype::Categorical),
        // Compound kinds never reach here with a scalar fact
        ClaimKind::ListString | ClaimKind::ListCategorical | ClaimKind::Address => Err(
            ConsolidateError::InvalidInput(format!(
                "object {}: claim by {} supplied a scalar fact for a compound datatype",
                object, source_id
            )),
        ),
    }
}
