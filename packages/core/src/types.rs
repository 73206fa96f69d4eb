//! Core data types for mettagraph.
//!
//! This module defines the structures that flow through the pipeline:
//! [`Expression`] (transient parse tree), [`Triple`] (normalised fact),
//! and the graph model handed to the renderer: [`GraphNode`], [`GraphEdge`],
//! [`HypergraphStructure`], and [`GraphData`]. Graph types serialise with
//! camelCase keys so a JavaScript renderer can consume them directly.

use serde::{Deserialize, Serialize};

// --- expressions -------------------------------------------------------------

/// One argument of an [`Expression`]: either a bare atom or a nested fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// A plain token, e.g. `Alice` or `42`.
    Atom(String),
    /// A fully parenthesised sub-expression, e.g. `(likes Bob Carol)`.
    Nested(Expression),
}

impl Arg {
    /// The atom text, or `None` for a nested expression.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Arg::Atom(s) => Some(s),
            Arg::Nested(_) => None,
        }
    }
}

/// A parsed `(predicate arg1 arg2 ...)` form.
///
/// Exists only while a single line is being processed; the extractor turns
/// it into a [`Triple`] and the tree is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub predicate: String,
    pub args: Vec<Arg>,
}

impl Expression {
    /// True if any argument is itself an expression.
    pub fn has_nested(&self) -> bool {
        self.args.iter().any(|a| matches!(a, Arg::Nested(_)))
    }

    /// The atom arguments in order, skipping nested expressions.
    pub fn atoms(&self) -> impl Iterator<Item = &str> {
        self.args.iter().filter_map(Arg::as_atom)
    }
}

// --- triples -----------------------------------------------------------------

/// The subject or object side of a [`Triple`].
///
/// A single value stays a scalar; two or more become a list. Serialises
/// untagged, as either a JSON string or a JSON array of strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Terms {
    One(String),
    Many(Vec<String>),
}

impl Terms {
    /// Build from a list, collapsing a one-element list to [`Terms::One`].
    pub fn from_vec(mut values: Vec<String>) -> Self {
        if values.len() == 1 {
            Terms::One(values.remove(0))
        } else {
            Terms::Many(values)
        }
    }

    /// View every value as a slice, regardless of arity.
    pub fn as_slice(&self) -> &[String] {
        match self {
            Terms::One(s) => std::slice::from_ref(s),
            Terms::Many(v) => v,
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self, Terms::Many(_))
    }
}

/// A normalised fact: one per successfully parsed, non-blank, non-comment line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Triple {
    pub predicate: String,
    pub subject: Terms,
    pub object: Terms,
    pub is_hypergraph: bool,

    /// Trimmed source text of the fact, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

// --- graph -------------------------------------------------------------------

/// A 2-D coordinate in graph (world) space.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Linear interpolation towards `to`; `t = 0` yields `self`, `t = 1` yields `to`.
    pub fn lerp(&self, to: &Position, t: f64) -> Position {
        Position::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }
}

/// The display role of a node.
///
/// Serialises as a lowercase string (e.g. `"entity"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// A named thing mentioned in a fact.
    Entity,
    /// A label that matches the predicate of the fact mentioning it.
    Predicate,
    /// A literal: integer, single-letter gender code, or boolean-like word.
    Value,
    /// A synthetic node standing for a whole hypergraph fact.
    Hypergraph,
}

impl NodeType {
    /// Default fill colour for this node type.
    pub fn default_color(self) -> &'static str {
        match self {
            NodeType::Entity => "#4f86c6",
            NodeType::Predicate => "#3fa34d",
            NodeType::Value => "#e0a030",
            NodeType::Hypergraph => "#8e5ec9",
        }
    }

    /// Default radius for this node type, in pixels at scale 1.
    pub fn default_size(self) -> f64 {
        match self {
            NodeType::Entity => 20.0,
            NodeType::Predicate => 18.0,
            NodeType::Value => 15.0,
            NodeType::Hypergraph => 12.0,
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Entity => write!(f, "entity"),
            NodeType::Predicate => write!(f, "predicate"),
            NodeType::Value => write!(f, "value"),
            NodeType::Hypergraph => write!(f, "hypergraph"),
        }
    }
}

/// Parses a [`NodeType`] from its lowercase string form.
impl std::str::FromStr for NodeType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "entity" => Ok(NodeType::Entity),
            "predicate" => Ok(NodeType::Predicate),
            "value" => Ok(NodeType::Value),
            "hypergraph" => Ok(NodeType::Hypergraph),
            _ => Err(format!(
                "unknown node type {:?}; expected one of: entity, predicate, value, hypergraph",
                s
            )),
        }
    }
}

/// Bookkeeping carried on every node.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    /// Source text of the first fact that mentioned this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_expression: Option<String>,

    /// How many times the label was mentioned across all facts.
    pub occurrences: u32,

    /// `Some(true)` for synthetic nodes that no fact names directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_generated: Option<bool>,
}

/// A positioned node. Its `id` is derived from its label, so the same label
/// always resolves to the same node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    pub label: String,

    #[serde(rename = "type")]
    pub node_type: NodeType,

    pub position: Position,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hypergraph: Option<bool>,

    pub metadata: NodeMetadata,
}

/// The kind of link an edge represents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// A directed subject → object link from a simple fact.
    Relation,
    /// An undirected member → intermediate-node link from a hypergraph fact.
    HypergraphConnection,
}

/// A link between two nodes, labelled with the predicate that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    /// `predicate-source-target`; unique within a [`GraphData`].
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: String,
    pub directed: bool,

    #[serde(rename = "type")]
    pub edge_type: EdgeType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Record of one hypergraph fact and the synthetic node that represents it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HypergraphStructure {
    pub id: String,
    pub predicate: String,
    pub subjects: Vec<String>,
    pub objects: Vec<String>,
    pub intermediate_node_id: String,
}

/// Two directed edges that point at each other with the same label.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BidirectionalPair {
    pub forward: String,
    pub reverse: String,
}

/// Summary counts, recomputed after every transform.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GraphMetadata {
    pub node_count: usize,
    pub edge_count: usize,
    pub hypergraph_count: usize,
    #[serde(default)]
    pub bidirectional_count: usize,
    /// RFC 3339 timestamp of the transform that produced this graph.
    pub last_updated: String,
}

/// The complete output of one transform pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub hypergraphs: Vec<HypergraphStructure>,

    /// Detected reciprocal edge pairs. Both edges of each pair stay in `edges`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bidirectional: Vec<BidirectionalPair>,

    pub metadata: GraphMetadata,
}

impl GraphData {
    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Look up an edge by id.
    pub fn edge(&self, id: &str) -> Option<&GraphEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// --- tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terms_collapse_single_value() {
        assert_eq!(Terms::from_vec(vec!["a".into()]), Terms::One("a".into()));
        assert!(Terms::from_vec(vec!["a".into(), "b".into()]).is_many());
        assert!(Terms::from_vec(vec![]).as_slice().is_empty());
    }

    #[test]
    fn terms_serialise_as_string_or_array() {
        let one = serde_json::to_value(Terms::One("M".into())).unwrap();
        assert_eq!(one, serde_json::json!("M"));
        let many = serde_json::to_value(Terms::Many(vec!["a".into(), "b".into()])).unwrap();
        assert_eq!(many, serde_json::json!(["a", "b"]));
    }

    #[test]
    fn node_serialises_with_camel_case_and_type_key() {
        let node = GraphNode {
            id: "alice".into(),
            label: "Alice".into(),
            node_type: NodeType::Entity,
            position: Position::new(1.0, 2.0),
            color: None,
            size: None,
            is_hypergraph: None,
            metadata: NodeMetadata {
                original_expression: None,
                occurrences: 1,
                is_generated: None,
            },
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "entity");
        assert_eq!(json["metadata"]["occurrences"], 1);
        assert!(json.get("color").is_none());
    }

    #[test]
    fn edge_type_is_snake_case() {
        let json = serde_json::to_value(EdgeType::HypergraphConnection).unwrap();
        assert_eq!(json, serde_json::json!("hypergraph_connection"));
    }

    #[test]
    fn lerp_endpoints() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(10.0, -4.0);
        assert_eq!(a.lerp(&b, 0.0), a);
        assert_eq!(a.lerp(&b, 1.0), b);
        assert_eq!(a.lerp(&b, 0.5), Position::new(5.0, -2.0));
    }

    #[test]
    fn node_type_from_str() {
        assert_eq!("value".parse::<NodeType>(), Ok(NodeType::Value));
        assert!("bogus".parse::<NodeType>().is_err());
    }
}
