//! Layered layout: breadth-first levels from the roots, one row per level.

use std::collections::{HashMap, VecDeque};

use crate::layout::LayoutOptions;
use crate::types::{GraphEdge, GraphNode, Position};

pub fn layout(nodes: &[GraphNode], edges: &[GraphEdge], options: &LayoutOptions) -> Vec<Position> {
    let levels = assign_levels(nodes, edges);
    let max_level = levels.iter().copied().max().unwrap_or(0);

    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); max_level + 1];
    for (i, &level) in levels.iter().enumerate() {
        rows[level].push(i);
    }

    let mut positions = vec![Position::default(); nodes.len()];
    for (level, row) in rows.iter().enumerate() {
        let y = (level as f64 - max_level as f64 / 2.0) * options.level_height;
        let half_width = (row.len() as f64 - 1.0) / 2.0;
        for (k, &i) in row.iter().enumerate() {
            positions[i] = Position::new((k as f64 - half_width) * options.node_width, y);
        }
    }
    positions
}

/// BFS level of every node, index-aligned with `nodes`.
///
/// Every node with in-degree 0 starts at level 0. If there is none, the node
/// with the highest out-degree (first one on ties) is the only root. Nodes
/// the search never reaches stay at level 0.
pub fn assign_levels(nodes: &[GraphNode], edges: &[GraphEdge]) -> Vec<usize> {
    let n = nodes.len();
    let index: HashMap<&str, usize> = nodes.iter().enumerate().map(|(i, nd)| (nd.id.as_str(), i)).collect();

    let mut in_degree = vec![0usize; n];
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
    for e in edges {
        let (Some(&s), Some(&t)) = (index.get(e.source.as_str()), index.get(e.target.as_str())) else {
            continue;
        };
        in_degree[t] += 1;
        children[s].push(t);
    }

    let mut roots: Vec<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
    if roots.is_empty() && n > 0 {
        let busiest = (0..n)
            .rev()
            .max_by_key(|&i| children[i].len())
            .unwrap_or(0);
        roots.push(busiest);
    }

    let mut level: Vec<Option<usize>> = vec![None; n];
    let mut queue = VecDeque::new();
    for &r in &roots {
        level[r] = Some(0);
        queue.push_back(r);
    }
    while let Some(current) = queue.pop_front() {
        let next = level[current].unwrap_or(0) + 1;
        for &child in &children[current] {
            if level[child].is_none() {
                level[child] = Some(next);
                queue.push_back(child);
            }
        }
    }

    level.into_iter().map(|l| l.unwrap_or(0)).collect()
}
