//! Circular layout: nodes grouped by type, one concentric circle per group.

use std::f64::consts::TAU;

use crate::types::{GraphNode, NodeType, Position};

const BASE_RADIUS: f64 = 130.0;
const RING_SPACING: f64 = 100.0;

pub fn layout(nodes: &[GraphNode]) -> Vec<Position> {
    // groups in order of first appearance
    let mut groups: Vec<(NodeType, Vec<usize>)> = Vec::new();
    for (i, node) in nodes.iter().enumerate() {
        match groups.iter_mut().find(|(t, _)| *t == node.node_type) {
            Some((_, members)) => members.push(i),
            None => groups.push((node.node_type, vec![i])),
        }
    }

    let single = groups.len() == 1;
    let mut positions = vec![Position::default(); nodes.len()];
    for (g, (_, members)) in groups.iter().enumerate() {
        let count = members.len();
        let radius = if single {
            (count as f64 * 15.0).max(BASE_RADIUS)
        } else {
            BASE_RADIUS + g as f64 * RING_SPACING
        };
        for (k, &i) in members.iter().enumerate() {
            let angle = TAU * k as f64 / count as f64;
            positions[i] = Position::new(radius * angle.cos(), radius * angle.sin());
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests::{node, typed_node};

    fn radius(p: &Position) -> f64 {
        p.distance(&Position::default())
    }

    #[test]
    fn single_group_uses_one_circle() {
        let nodes: Vec<GraphNode> = (0..4).map(|i| node(&format!("n{i}"), 0.0, 0.0)).collect();
        let out = layout(&nodes);
        for p in &out {
            assert!((radius(p) - 130.0).abs() < 1e-9);
        }
        assert!((out[0].distance(&out[2]) - 260.0).abs() < 1e-9);
    }

    #[test]
    fn large_single_group_grows_radius() {
        let nodes: Vec<GraphNode> = (0..20).map(|i| node(&format!("n{i}"), 0.0, 0.0)).collect();
        let out = layout(&nodes);
        assert!((radius(&out[7]) - 300.0).abs() < 1e-9);
    }

    #[test]
    fn groups_get_concentric_rings() {
        let nodes = vec![
            typed_node("a", NodeType::Entity, 0.0, 0.0),
            typed_node("one", NodeType::Value, 0.0, 0.0),
            typed_node("b", NodeType::Entity, 0.0, 0.0),
            typed_node("g", NodeType::Hypergraph, 0.0, 0.0),
        ];
        let out = layout(&nodes);
        assert!((radius(&out[0]) - 130.0).abs() < 1e-9);
        assert!((radius(&out[2]) - 130.0).abs() < 1e-9);
        assert!((radius(&out[1]) - 230.0).abs() < 1e-9);
        assert!((radius(&out[3]) - 330.0).abs() < 1e-9);
    }
}
