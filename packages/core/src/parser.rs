//! Tokenizer, recursive-descent expression parser, and the document pipeline.
//!
//! [`parse_expression`] handles one line. [`parse_document`] runs the whole
//! text → triples → graph flow and collects per-line diagnostics along the way.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::extract::extract_triple;
use crate::graph::GraphTransformer;
use crate::types::{Arg, Expression, GraphData, Triple};
use crate::validation::{is_ignorable, validate_text, Diagnostic, DiagnosticKind};

/// Reasons a line cannot be parsed as a single expression.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line is empty")]
    Empty,

    #[error("expression must start with '(' and end with ')'")]
    NotEnclosed,

    #[error("expression is not a single balanced (...) group")]
    UnbalancedOuter,

    #[error("expression needs a predicate and at least one argument, found {0} token(s)")]
    TooFewTokens(usize),
}

/// Parse one line into an [`Expression`].
///
/// The trimmed line must be exactly one balanced `( ... )` group. Its interior
/// is split on whitespace at nesting depth 0; the first token is the predicate.
/// Any later token that is itself a parenthesised group is parsed recursively.
/// A nested group that fails to parse is dropped from the argument list.
pub fn parse_expression(line: &str) -> Result<Expression, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::Empty);
    }

    let interior = outer_interior(line)?;
    let tokens = tokenize(interior);
    if tokens.len() < 2 {
        return Err(ParseError::TooFewTokens(tokens.len()));
    }

    let predicate = tokens[0].to_string();
    let mut args = Vec::with_capacity(tokens.len() - 1);
    for token in &tokens[1..] {
        if token.starts_with('(') {
            match parse_expression(token) {
                Ok(nested) => args.push(Arg::Nested(nested)),
                Err(e) => tracing::trace!(token = %token, error = %e, "dropping malformed nested argument"),
            }
        } else {
            args.push(Arg::Atom(token.to_string()));
        }
    }

    Ok(Expression { predicate, args })
}

/// The text between the outer parentheses, provided the first `(` is closed
/// by the final `)`.
fn outer_interior(line: &str) -> Result<&str, ParseError> {
    if !line.starts_with('(') || !line.ends_with(')') {
        return Err(ParseError::NotEnclosed);
    }

    let last = line.len() - 1;
    let mut depth: i64 = 0;
    for (i, c) in line.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 && i != last {
                    return Err(ParseError::UnbalancedOuter);
                }
                if depth < 0 {
                    return Err(ParseError::UnbalancedOuter);
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ParseError::UnbalancedOuter);
    }

    Ok(&line[1..last])
}

/// Split on whitespace at depth 0, keeping each parenthesised group whole.
fn tokenize(interior: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;

    for (i, c) in interior.char_indices() {
        if c.is_whitespace() && depth == 0 {
            if let Some(s) = start.take() {
                tokens.push(&interior[s..i]);
            }
            continue;
        }
        if start.is_none() {
            start = Some(i);
        }
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push(&interior[s..]);
    }

    tokens
}

// --- document pipeline -------------------------------------------------------

/// Everything produced from one document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParseResult {
    #[serde(flatten)]
    pub graph: GraphData,
    pub triples: Vec<Triple>,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

impl ParseResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a whole document into triples and a graph.
///
/// Lines with structural errors are reported and skipped; every other line is
/// parsed independently, so one bad line never hides the rest of the graph.
pub fn parse_document(text: &str) -> ParseResult {
    let report = validate_text(text);
    let failed: HashSet<usize> = report.errors.iter().map(|d| d.line).collect();
    let mut errors = report.errors;

    let mut triples = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        if is_ignorable(raw) || failed.contains(&line_no) {
            continue;
        }
        let line = raw.trim();
        let column = raw.chars().take_while(|c| c.is_whitespace()).count() + 1;
        match parse_expression(line) {
            Ok(expr) => match extract_triple(&expr) {
                Some(mut triple) => {
                    triple.source = Some(line.to_string());
                    triples.push(triple);
                }
                None => errors.push(Diagnostic::error(
                    line_no,
                    column,
                    DiagnosticKind::Malformed,
                    "expression yields no fact: needs a subject and at least one object",
                )),
            },
            Err(e) => {
                errors.push(Diagnostic::error(line_no, column, DiagnosticKind::Malformed, e.to_string()));
            }
        }
    }
    errors.sort_by_key(|d| (d.line, d.column));

    let graph = GraphTransformer::new().transform(&triples);
    tracing::debug!(
        triples = triples.len(),
        errors = errors.len(),
        warnings = report.warnings.len(),
        "parsed document"
    );

    ParseResult {
        graph,
        triples,
        errors,
        warnings: report.warnings,
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(s: &str) -> Arg {
        Arg::Atom(s.into())
    }

    #[test]
    fn flat_expression() {
        let e = parse_expression("(gender Chandler M)").unwrap();
        assert_eq!(e.predicate, "gender");
        assert_eq!(e.args, vec![atom("Chandler"), atom("M")]);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let e = parse_expression("   (likes   Alice\tBob)  ").unwrap();
        assert_eq!(e.args, vec![atom("Alice"), atom("Bob")]);
    }

    #[test]
    fn nested_expression() {
        let e = parse_expression("(believes Alice (likes Bob Carol))").unwrap();
        assert_eq!(e.args.len(), 2);
        match &e.args[1] {
            Arg::Nested(inner) => {
                assert_eq!(inner.predicate, "likes");
                assert_eq!(inner.args, vec![atom("Bob"), atom("Carol")]);
            }
            other => panic!("expected nested, got {other:?}"),
        }
    }

    #[test]
    fn deep_nesting_recurses() {
        let e = parse_expression("(a x (b y (c z (d w v))))").unwrap();
        let Arg::Nested(b) = &e.args[1] else { panic!() };
        let Arg::Nested(c) = &b.args[1] else { panic!() };
        let Arg::Nested(d) = &c.args[1] else { panic!() };
        assert_eq!(d.predicate, "d");
    }

    #[test]
    fn rejects_unenclosed_and_unbalanced() {
        assert_eq!(parse_expression("likes a b"), Err(ParseError::NotEnclosed));
        assert_eq!(parse_expression("(likes a b"), Err(ParseError::NotEnclosed));
        assert_eq!(parse_expression("(a b) (c d)"), Err(ParseError::UnbalancedOuter));
        assert_eq!(parse_expression("(a (b c)"), Err(ParseError::UnbalancedOuter));
        assert_eq!(parse_expression(""), Err(ParseError::Empty));
    }

    #[test]
    fn rejects_too_few_tokens() {
        assert_eq!(parse_expression("(likes)"), Err(ParseError::TooFewTokens(1)));
        assert_eq!(parse_expression("()"), Err(ParseError::TooFewTokens(0)));
    }

    #[test]
    fn malformed_nested_argument_is_dropped() {
        let e = parse_expression("(says Ann (x))").unwrap();
        assert_eq!(e.args, vec![atom("Ann")]);
    }

    #[test]
    fn document_skips_bad_lines_and_keeps_good_ones() {
        let result = parse_document("; family\n(gender Chandler M)\n(gender Monica\n\n(likes Ross Rachel)");
        assert_eq!(result.triples.len(), 2);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].line, 3);
        assert_eq!(result.triples[0].source.as_deref(), Some("(gender Chandler M)"));
    }

    #[test]
    fn document_reports_lines_the_parser_rejects() {
        let result = parse_document("(a b) (c d)");
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, DiagnosticKind::Malformed);
        assert!(result.triples.is_empty());
    }

    #[test]
    fn lines_without_a_fact_are_reported() {
        let result = parse_document("(p (x))\n  (likes Alice)\n(likes Alice Bob)");
        assert_eq!(result.triples.len(), 1);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors.iter().all(|d| d.kind == DiagnosticKind::Malformed));
        assert_eq!((result.errors[0].line, result.errors[0].column), (1, 1));
        assert_eq!((result.errors[1].line, result.errors[1].column), (2, 3));
    }

    #[test]
    fn parse_result_serialises_flat() {
        let result = parse_document("(likes Alice Bob)");
        let json = serde_json::to_value(&result).unwrap();
        assert!(json["nodes"].is_array());
        assert!(json["edges"].is_array());
        assert!(json["errors"].is_array());
        assert_eq!(json["metadata"]["nodeCount"], 2);
    }
}
