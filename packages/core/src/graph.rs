use std::collections::{HashMap, HashSet};
use std::f64::consts::TAU;
use std::sync::LazyLock;

use regex::Regex;

use crate::types::{
    BidirectionalPair, EdgeType, GraphData, GraphEdge, GraphMetadata, GraphNode,
    HypergraphStructure, NodeMetadata, NodeType, Position, Triple,
};

/// Vertical distance between the rows of consecutive simple facts.
const ROW_SPACING: f64 = 100.0;
/// Horizontal distance between neighbouring subjects (or objects) in a row.
const COLUMN_SPACING: f64 = 150.0;
/// Vertical distance between the circles of consecutive hypergraph facts.
const HYPERGRAPH_SPACING: f64 = 150.0;

const RELATION_COLOR: &str = "#8a94a6";
const HYPERGRAPH_EDGE_COLOR: &str = "#b59ad9";

/// Derive a node id from a label: lower-cased, every run of
/// non-alphanumeric characters replaced by a single `-`, ends trimmed.
///
/// Returns an empty string for labels with no alphanumeric characters.
pub fn node_id(label: &str) -> String {
    let mut id = String::with_capacity(label.len());
    let mut pending_hyphen = false;
    for c in label.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_hyphen && !id.is_empty() {
                id.push('-');
            }
            pending_hyphen = false;
            id.push(c);
        } else {
            pending_hyphen = true;
        }
    }
    id
}

/// Structured identity of an edge. The external id is `label-source-target`,
/// but uniqueness is decided on the tuple so a `-` inside a label cannot
/// make two different edges collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EdgeKey {
    label: String,
    source: String,
    target: String,
}

impl EdgeKey {
    fn new(label: &str, source: &str, target: &str) -> Self {
        Self {
            label: label.to_string(),
            source: source.to_string(),
            target: target.to_string(),
        }
    }

    fn id(&self) -> String {
        format!("{}-{}-{}", self.label, self.source, self.target)
    }
}

/// Converts triples into a deduplicated node/edge graph.
///
/// Nodes are keyed by [`node_id`] of their label: a label mentioned by several
/// facts becomes one node whose `occurrences` counts the mentions. Hypergraph
/// facts get a synthetic intermediate node linked to every member.
///
/// Each [`transform`](Self::transform) call is a fresh session: the node set
/// and the hypergraph counter start empty, so identical input always yields
/// identical ids.
#[derive(Debug, Default)]
pub struct GraphTransformer {
    nodes: Vec<GraphNode>,
    node_index: HashMap<String, usize>,
    edges: Vec<GraphEdge>,
    edge_keys: HashSet<EdgeKey>,
    hypergraphs: Vec<HypergraphStructure>,
    hypergraph_counter: usize,
}

impl GraphTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `triples`, processed in order.
    pub fn transform(&mut self, triples: &[Triple]) -> GraphData {
        *self = Self::default();

        for (index, triple) in triples.iter().enumerate() {
            if triple.is_hypergraph {
                self.add_hypergraph(index, triple);
            } else {
                self.add_simple(index, triple);
            }
        }

        let nodes = std::mem::take(&mut self.nodes);
        let edges = dedupe_edges(std::mem::take(&mut self.edges));
        let hypergraphs = std::mem::take(&mut self.hypergraphs);
        let bidirectional = detect_bidirectional(&edges);

        let metadata = GraphMetadata {
            node_count: nodes.len(),
            edge_count: edges.len(),
            hypergraph_count: hypergraphs.len(),
            bidirectional_count: bidirectional.len(),
            last_updated: chrono::Utc::now().to_rfc3339(),
        };
        tracing::debug!(
            nodes = metadata.node_count,
            edges = metadata.edge_count,
            hypergraphs = metadata.hypergraph_count,
            bidirectional = metadata.bidirectional_count,
            "transformed triples"
        );

        GraphData {
            nodes,
            edges,
            hypergraphs,
            bidirectional,
            metadata,
        }
    }

    // Subjects to the left of centre, objects to the right, one row per fact.
    fn add_simple(&mut self, index: usize, triple: &Triple) {
        let y = index as f64 * ROW_SPACING;
        let source = triple.source.as_deref();

        let subjects: Vec<String> = triple
            .subject
            .as_slice()
            .iter()
            .enumerate()
            .filter_map(|(i, label)| {
                let pos = Position::new(-((i + 1) as f64) * COLUMN_SPACING, y);
                self.touch_node(label, &triple.predicate, pos, source)
            })
            .collect();

        let objects: Vec<String> = triple
            .object
            .as_slice()
            .iter()
            .enumerate()
            .filter_map(|(i, label)| {
                let pos = Position::new((i + 1) as f64 * COLUMN_SPACING, y);
                self.touch_node(label, &triple.predicate, pos, source)
            })
            .collect();

        for s in &subjects {
            for o in &objects {
                self.add_edge(EdgeKey::new(&triple.predicate, s, o), EdgeType::Relation);
            }
        }
    }

    // Members on a circle, the intermediate node at its centre.
    fn add_hypergraph(&mut self, index: usize, triple: &Triple) {
        let source = triple.source.as_deref();

        let mut seen = HashSet::new();
        let members: Vec<&String> = triple
            .subject
            .as_slice()
            .iter()
            .chain(triple.object.as_slice())
            .filter(|label| seen.insert(node_id(label)))
            .collect();

        let count = members.len();
        let radius = (count as f64 * 20.0).max(80.0);
        let center = Position::new(0.0, index as f64 * HYPERGRAPH_SPACING);

        let mut member_ids = Vec::with_capacity(count);
        for (k, label) in members.iter().enumerate() {
            let angle = TAU * k as f64 / count as f64;
            let pos = Position::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            );
            if let Some(id) = self.touch_node(label, &triple.predicate, pos, source) {
                member_ids.push(id);
            }
        }

        let intermediate_id = self.add_intermediate_node(triple, center);
        for id in &member_ids {
            self.add_edge(
                EdgeKey::new(&triple.predicate, id, &intermediate_id),
                EdgeType::HypergraphConnection,
            );
        }

        self.hypergraphs.push(HypergraphStructure {
            id: format!("hypergraph-{}", self.hypergraph_counter),
            predicate: triple.predicate.clone(),
            subjects: triple.subject.as_slice().to_vec(),
            objects: triple.object.as_slice().to_vec(),
            intermediate_node_id: intermediate_id,
        });
    }

    fn add_intermediate_node(&mut self, triple: &Triple, position: Position) -> String {
        let label = format!("{} group", triple.predicate);
        let base = match node_id(&label) {
            id if id.is_empty() => "group".to_string(),
            id => id,
        };

        // `#` never appears in a label slug, so no fact label can merge into
        // an intermediate node.
        self.hypergraph_counter += 1;
        let id = format!("{base}#{}", self.hypergraph_counter);

        self.insert_node(GraphNode {
            id: id.clone(),
            label,
            node_type: NodeType::Hypergraph,
            position,
            color: Some(NodeType::Hypergraph.default_color().to_string()),
            size: Some(NodeType::Hypergraph.default_size()),
            is_hypergraph: Some(true),
            metadata: NodeMetadata {
                original_expression: triple.source.clone(),
                occurrences: 1,
                is_generated: Some(true),
            },
        });
        id
    }

    /// Create the node for `label`, or record another mention of it.
    ///
    /// Returns `None` (and adds nothing) when the label has no usable id.
    fn touch_node(
        &mut self,
        label: &str,
        predicate: &str,
        position: Position,
        source: Option<&str>,
    ) -> Option<String> {
        let id = node_id(label);
        if id.is_empty() {
            tracing::trace!(label, "label does not resolve to a node id; dropped");
            return None;
        }

        if let Some(&i) = self.node_index.get(&id) {
            let node = &mut self.nodes[i];
            node.metadata.occurrences += 1;
            if node.color.is_none() {
                node.color = Some(node.node_type.default_color().to_string());
            }
            if node.size.is_none() {
                node.size = Some(node.node_type.default_size());
            }
            return Some(id);
        }

        let node_type = infer_node_type(label, predicate);
        self.insert_node(GraphNode {
            id: id.clone(),
            label: label.to_string(),
            node_type,
            position,
            color: Some(node_type.default_color().to_string()),
            size: Some(node_type.default_size()),
            is_hypergraph: None,
            metadata: NodeMetadata {
                original_expression: source.map(str::to_string),
                occurrences: 1,
                is_generated: None,
            },
        });
        Some(id)
    }

    fn insert_node(&mut self, node: GraphNode) {
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    fn add_edge(&mut self, key: EdgeKey, edge_type: EdgeType) {
        if self.edge_keys.contains(&key) {
            return;
        }
        let (directed, color) = match edge_type {
            EdgeType::Relation => (true, RELATION_COLOR),
            EdgeType::HypergraphConnection => (false, HYPERGRAPH_EDGE_COLOR),
        };
        self.edges.push(GraphEdge {
            id: key.id(),
            source: key.source.clone(),
            target: key.target.clone(),
            label: key.label.clone(),
            directed,
            edge_type,
            color: Some(color.to_string()),
            weight: Some(1.0),
        });
        self.edge_keys.insert(key);
    }
}

/// Infer a node's type the first time its label is seen.
///
/// Checked in order: a capitalised word is an entity; an integer, a lone
/// `M`/`F`, or a boolean-like word is a value; a label equal to the fact's
/// predicate is a predicate; anything else is an entity.
pub fn infer_node_type(label: &str, predicate: &str) -> NodeType {
    if CAPITALIZED_RE.is_match(label) {
        NodeType::Entity
    } else if VALUE_RE.is_match(label) {
        NodeType::Value
    } else if label == predicate {
        NodeType::Predicate
    } else {
        NodeType::Entity
    }
}

/// `^[A-Z][a-z]+$`
static CAPITALIZED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+$").expect("invalid capitalised-word regex"));

/// Integers, `M`/`F`, and boolean-like words.
static VALUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d+|[MF]|(?i:true|false|yes|no))$").expect("invalid value regex")
});

// --- post-pass ---------------------------------------------------------------

// Keep the first edge for each (label, source, target).
fn dedupe_edges(edges: Vec<GraphEdge>) -> Vec<GraphEdge> {
    let mut seen = HashSet::new();
    edges
        .into_iter()
        .filter(|e| seen.insert(EdgeKey::new(&e.label, &e.source, &e.target)))
        .collect()
}

/// Find directed edges whose reverse (same label, endpoints swapped) also
/// exists. Each pair is reported once; neither edge is removed.
pub fn detect_bidirectional(edges: &[GraphEdge]) -> Vec<BidirectionalPair> {
    let by_key: HashMap<(&str, &str, &str), &str> = edges
        .iter()
        .filter(|e| e.directed)
        .map(|e| ((e.source.as_str(), e.target.as_str(), e.label.as_str()), e.id.as_str()))
        .collect();

    edges
        .iter()
        .filter(|e| e.directed && e.source < e.target)
        .filter_map(|e| {
            let reverse = by_key.get(&(e.target.as_str(), e.source.as_str(), e.label.as_str()))?;
            Some(BidirectionalPair {
                forward: e.id.clone(),
                reverse: reverse.to_string(),
            })
        })
        .collect()
}

// --- tests -------------------------------------------------------------------
