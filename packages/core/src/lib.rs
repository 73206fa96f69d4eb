//! Turn Metta-style relational facts into a positioned graph.
//!
//! The input is a small symbolic-expression language, one fact per line:
//! `(predicate arg1 arg2 ...)`, where an argument may itself be a nested fact
//! (a "hypergraph" fact). This crate parses and validates that text, converts
//! the facts into a deduplicated node/edge graph, and computes 2-D layouts
//! with animated transitions. Drawing is left to the host.
//!
//! # Crate layout
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`types`] | Data model: [`Triple`], [`GraphNode`], [`GraphEdge`], [`GraphData`] |
//! | [`parser`] | Expression parser and the [`parse_document`] pipeline |
//! | [`validation`] | Per-line structural checks via [`validate_text`] |
//! | [`extract`] | Expression → [`Triple`], including hypergraph detection |
//! | [`graph`] | [`GraphTransformer`]: triples → nodes, edges, hypergraphs |
//! | [`layout`] | [`LayoutEngine`] with force-directed, hierarchical, and circular layouts |
//! | [`render`] | Plain-text summary of a graph |
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use mettagraph::{parse_document, LayoutAlgorithm, LayoutEngine, LayoutOptions};
//!
//! let result = parse_document("(gender Chandler M)\n(believes Alice (likes Bob Carol))");
//! assert!(result.is_valid());
//!
//! let graph = result.graph;
//! let mut engine = LayoutEngine::with_data(graph.nodes, graph.edges);
//! engine.apply_layout(LayoutAlgorithm::ForceDirected, &LayoutOptions::default(), Duration::ZERO);
//! while engine.tick(now()) {}
//! ```

pub mod extract;
pub mod graph;
pub mod layout;
pub mod parser;
pub mod render;
pub mod types;
pub mod validation;

pub use extract::extract_triple;
pub use graph::{node_id, GraphTransformer};
pub use layout::{LayoutAlgorithm, LayoutEngine, LayoutOptions, LayoutState, ScreenTransform};
pub use parser::{parse_document, parse_expression, ParseError, ParseResult};
pub use types::{
    Arg, EdgeType, Expression, GraphData, GraphEdge, GraphNode, HypergraphStructure, NodeType,
    Position, Terms, Triple,
};
pub use validation::{validate_text, Diagnostic, DiagnosticKind, Severity, ValidationReport};
