//! Human-readable text rendering of a [`GraphData`].
//!
//! The output is stable plain text suitable for terminals and logs. It is a
//! summary, not a serialisation format: use the JSON form of [`GraphData`]
//! when another program needs the graph.

use crate::types::{EdgeType, GraphData, GraphNode, NodeType};

/// Render a graph as a summary grouped by node type.
///
/// ```text
/// Metta Graph  5 nodes, 4 edges, 1 hypergraph
/// ───────────────────────────────────────────
///
/// ENTITIES (4)
///   alice        Alice  ×1
///   ...
///
/// HYPERGRAPHS (1)
///   believes-group#1  believes group  [Alice] → [likes, Bob, Carol]
///
/// EDGES (4)
///   alice ── believes-group#1  (believes)
/// ```
pub fn render_graph(graph: &GraphData) -> String {
    let m = &graph.metadata;
    let header = format!(
        "Metta Graph  {}, {}, {}",
        plural(m.node_count, "node", "nodes"),
        plural(m.edge_count, "edge", "edges"),
        plural(m.hypergraph_count, "hypergraph", "hypergraphs"),
    );
    let rule = "─".repeat(header.chars().count());
    let mut out = format!("{}\n{}\n", header, rule);

    let groups = [
        (NodeType::Entity, "ENTITIES"),
        (NodeType::Predicate, "PREDICATES"),
        (NodeType::Value, "VALUES"),
    ];
    for (node_type, label) in &groups {
        let nodes: Vec<&GraphNode> = graph.nodes.iter().filter(|n| n.node_type == *node_type).collect();
        if nodes.is_empty() {
            continue;
        }
        let width = nodes.iter().map(|n| n.id.len()).max().unwrap_or(0);
        out.push('\n');
        out.push_str(&format!("{} ({})\n", label, nodes.len()));
        for n in nodes {
            out.push_str(&format!(
                "  {:<width$}  {}  ×{}\n",
                n.id, n.label, n.metadata.occurrences
            ));
        }
    }

    if !graph.hypergraphs.is_empty() {
        out.push('\n');
        out.push_str(&format!("HYPERGRAPHS ({})\n", graph.hypergraphs.len()));
        for h in &graph.hypergraphs {
            let label = graph
                .node(&h.intermediate_node_id)
                .map(|n| n.label.as_str())
                .unwrap_or(h.predicate.as_str());
            out.push_str(&format!(
                "  {}  {}  [{}] → [{}]\n",
                h.intermediate_node_id,
                label,
                h.subjects.join(", "),
                h.objects.join(", ")
            ));
        }
    }

    if !graph.edges.is_empty() {
        out.push('\n');
        out.push_str(&format!("EDGES ({})\n", graph.edges.len()));
        for e in &graph.edges {
            let arrow = match (e.edge_type, e.directed) {
                (EdgeType::Relation, true) => "→",
                _ => "──",
            };
            out.push_str(&format!("  {} {} {}  ({})\n", e.source, arrow, e.target, e.label));
        }
    }

    if !graph.bidirectional.is_empty() {
        out.push('\n');
        out.push_str(&format!("BIDIRECTIONAL ({})\n", graph.bidirectional.len()));
        for pair in &graph.bidirectional {
            out.push_str(&format!("  {} ⇄ {}\n", pair.forward, pair.reverse));
        }
    }

    out
}

fn plural(n: usize, one: &str, many: &str) -> String {
    format!("{} {}", n, if n == 1 { one } else { many })
}

// --- tests -------------------------------------------------------------------
