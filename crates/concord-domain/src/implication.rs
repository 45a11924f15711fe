//! Implication functions between competing facts
//!
//! Given a reference fact `f1` and an alternative `f2`, the implication is
//! the signed degree, in [-1, 1], to which `f2` being correct supports `f1`
//! being correct. Each base datatype has its own function; boolean facts use
//! the categorical one.

use crate::fact::{Datatype, Fact};

/// Implication between continuous facts.
///
/// Normalizes the one-dimensional distance between the values against their
/// maximum. Identical values yield +1; values a full maximum apart yield -1.
/// Both-zero is treated as identical.
pub fn continuous_implication(f1: f64, f2: f64) -> f64 {
    let max_value = f1.max(f2);
    if max_value == 0.0 {
        return 1.0;
    }
    let distance = (f1 - f2).abs();
    (1.0 - 2.0 * distance / max_value).clamp(-1.0, 1.0)
}

/// Implication between categorical facts: +1 on equality, -1 otherwise.
pub fn categorical_implication(f1: &Fact, f2: &Fact) -> f64 {
    if f1 == f2 {
        1.0
    } else {
        -1.0
    }
}

/// Implication between string facts: Jaro-Winkler similarity rescaled from
/// [0, 1] to [-1, 1].
pub fn string_implication(f1: &str, f2: &str) -> f64 {
    2.0 * strsim::jaro_winkler(f1, f2) - 1.0
}

/// Dispatch the implication for a row's datatype.
///
/// Facts whose variant does not match the datatype contribute nothing to
/// the related-fact adjustment, so the mismatch arms return 0.
pub fn implication(datatype: Datatype, f1: &Fact, f2: &Fact) -> f64 {
    match datatype {
        Datatype::Continuous => match (f1.as_number(), f2.as_number()) {
            (Some(a), Some(b)) => continuous_implication(a, b),
            _ => 0.0,
        },
        Datatype::String => match (f1.as_text(), f2.as_text()) {
            (Some(a), Some(b)) => string_implication(a, b),
            _ => 0.0,
        },
        Datatype::Categorical | Datatype::Boolean => categorical_implication(f1, f2),
    }
}
