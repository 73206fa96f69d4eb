//! Expression → [`Triple`] extraction and hypergraph detection.

use crate::types::{Arg, Expression, Terms, Triple};

/// Convert one parsed expression into a triple.
///
/// An expression with no nested arguments needs at least two atoms: the first
/// is the subject and the rest form the object. An expression with at least
/// one nested argument is a hypergraph fact (see [`extract_hypergraph`]).
/// Returns `None` when a flat expression has fewer than two atoms.
pub fn extract_triple(expr: &Expression) -> Option<Triple> {
    if expr.has_nested() {
        return Some(extract_hypergraph(expr));
    }

    let mut values: Vec<String> = expr.atoms().map(str::to_string).collect();
    if values.len() < 2 {
        return None;
    }
    let subject = values.remove(0);

    Some(Triple {
        predicate: expr.predicate.clone(),
        subject: Terms::One(subject),
        object: Terms::from_vec(values),
        is_hypergraph: false,
        source: None,
    })
}

/// Flatten a hypergraph fact.
///
/// The outer expression's atoms become the subjects. Each nested argument
/// contributes its predicate followed by its own atoms to the objects. Only
/// one level is un-nested: expressions nested inside a nested argument are
/// not expanded.
pub fn extract_hypergraph(expr: &Expression) -> Triple {
    let subjects: Vec<String> = expr.atoms().map(str::to_string).collect();

    let mut objects = Vec::new();
    for arg in &expr.args {
        if let Arg::Nested(inner) = arg {
            objects.push(inner.predicate.clone());
            objects.extend(inner.atoms().map(str::to_string));
        }
    }

    Triple {
        predicate: expr.predicate.clone(),
        subject: Terms::from_vec(subjects),
        object: Terms::from_vec(objects),
        is_hypergraph: true,
        source: None,
    }
}

// --- tests -------------------------------------------------------------------
