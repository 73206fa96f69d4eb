//! Line-oriented structural checks for fact text.
//!
//! Validation is independent of the expression parser: each line is checked
//! on its own, and a failure on one line never affects another. Structural
//! problems are errors; near-miss predicate spellings are warnings and never
//! make a document invalid.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Predicates common enough that a one-edit misspelling is worth flagging.
///
/// No two entries are within edit distance 1 of each other.
pub const COMMON_PREDICATES: &[&str] = &[
    "is-a",
    "has",
    "likes",
    "knows",
    "parent",
    "child",
    "sibling",
    "friend",
    "married",
    "gender",
    "age",
    "lives-in",
    "works-at",
    "member-of",
    "part-of",
    "located-in",
    "believes",
    "wants",
    "causes",
    "implies",
    "similar",
    "instance-of",
    "subclass-of",
    "evaluation",
    "inheritance",
    "implication",
];

/// Whether a diagnostic blocks validity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    NotEnclosed,
    UnmatchedClosing,
    UnmatchedOpening,
    TooFewTokens,
    /// Passed the line checks but could not be parsed as one expression.
    Malformed,
    PredicateSuggestion,
}

/// Messages attached to structural diagnostics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineProblem {
    #[error("expression must be enclosed in parentheses")]
    NotEnclosed,

    #[error("unmatched closing parenthesis")]
    UnmatchedClosing,

    #[error("unmatched opening parenthesis")]
    UnmatchedOpening,

    #[error("expression must have at least a predicate and one argument")]
    TooFewTokens,

    #[error("unknown predicate {found:?}; did you mean {suggestion:?}?")]
    Suggestion { found: String, suggestion: String },
}

impl LineProblem {
    fn kind(&self) -> DiagnosticKind {
        match self {
            LineProblem::NotEnclosed => DiagnosticKind::NotEnclosed,
            LineProblem::UnmatchedClosing => DiagnosticKind::UnmatchedClosing,
            LineProblem::UnmatchedOpening => DiagnosticKind::UnmatchedOpening,
            LineProblem::TooFewTokens => DiagnosticKind::TooFewTokens,
            LineProblem::Suggestion { .. } => DiagnosticKind::PredicateSuggestion,
        }
    }

    fn severity(&self) -> Severity {
        match self {
            LineProblem::Suggestion { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

/// One finding, located by 1-based line and column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub message: String,
    pub severity: Severity,
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    fn from_problem(line: usize, column: usize, problem: LineProblem) -> Self {
        Self {
            line,
            column,
            message: problem.to_string(),
            severity: problem.severity(),
            kind: problem.kind(),
        }
    }

    /// An error that did not come from the line checks themselves.
    pub fn error(line: usize, column: usize, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
            severity: Severity::Error,
            kind,
        }
    }
}

/// Result of validating a whole document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    /// `true` iff `errors` is empty.
    pub is_valid: bool,
}

/// Validate every line of `text`.
///
/// Blank lines and lines whose first non-space character is `;` are skipped.
pub fn validate_text(text: &str) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        for d in validate_line(line, idx + 1) {
            match d.severity {
                Severity::Error => errors.push(d),
                Severity::Warning => warnings.push(d),
            }
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Validate a single line. `line_no` is 1-based and only used for locating
/// diagnostics.
///
/// Checks short-circuit: the first structural error ends checking for the line.
pub fn validate_line(line: &str, line_no: usize) -> Vec<Diagnostic> {
    if is_ignorable(line) {
        return vec![];
    }

    let indent = line.chars().take_while(|c| c.is_whitespace()).count();
    let trimmed = line.trim();
    let at = |offset: usize, problem| Diagnostic::from_problem(line_no, indent + offset + 1, problem);

    if !trimmed.starts_with('(') {
        return vec![at(0, LineProblem::NotEnclosed)];
    }

    let mut open_columns: Vec<usize> = Vec::new();
    for (offset, c) in trimmed.chars().enumerate() {
        match c {
            '(' => open_columns.push(offset),
            ')' => {
                if open_columns.pop().is_none() {
                    return vec![at(offset, LineProblem::UnmatchedClosing)];
                }
            }
            _ => {}
        }
    }
    if let Some(&offset) = open_columns.last() {
        return vec![at(offset, LineProblem::UnmatchedOpening)];
    }

    let interior = trimmed[1..].strip_suffix(')').unwrap_or(&trimmed[1..]);
    let mut parts = interior.split_whitespace();
    let Some(predicate) = parts.next() else {
        return vec![at(0, LineProblem::TooFewTokens)];
    };
    if parts.next().is_none() {
        return vec![at(0, LineProblem::TooFewTokens)];
    }

    match suggest_predicate(predicate) {
        Some(suggestion) => vec![at(
            1,
            LineProblem::Suggestion {
                found: predicate.to_string(),
                suggestion: suggestion.to_string(),
            },
        )],
        None => vec![],
    }
}

/// Blank or comment line.
pub(crate) fn is_ignorable(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with(';')
}

/// The dictionary predicate exactly one edit away from `name`, if any.
///
/// Comparison is case-insensitive. A name that already matches a dictionary
/// entry gets no suggestion.
pub fn suggest_predicate(name: &str) -> Option<&'static str> {
    let folded = name.to_lowercase();
    if COMMON_PREDICATES.iter().any(|p| *p == folded) {
        return None;
    }
    COMMON_PREDICATES
        .iter()
        .copied()
        .find(|p| levenshtein(&folded, p) == 1)
}

/// Classic Levenshtein distance over characters; insert, delete, and
/// substitute each cost 1.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// --- tests -------------------------------------------------------------------
