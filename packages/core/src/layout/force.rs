//! Force-directed layout (Fruchterman-Reingold variant).
//!
//! Every pair of nodes repels, every edge pulls its endpoints together, and a
//! weak centering force keeps the graph from drifting. Velocity is capped by a
//! temperature that cools linearly to zero over the run. There is no
//! randomness: the same input always gives the same output.
//!
//! Repulsion is computed for all pairs, O(n²) per iteration.

use std::collections::HashMap;

use crate::layout::LayoutOptions;
use crate::types::{GraphEdge, GraphNode, Position};

/// Smallest distance used in force calculations.
const MIN_DISTANCE: f64 = 0.1;

pub fn layout(nodes: &[GraphNode], edges: &[GraphEdge], options: &LayoutOptions) -> Vec<Position> {
    let n = nodes.len();
    let mut pos: Vec<(f64, f64)> = nodes.iter().map(|nd| (nd.position.x, nd.position.y)).collect();
    if n == 0 {
        return vec![];
    }

    let index: HashMap<&str, usize> = nodes.iter().enumerate().map(|(i, nd)| (nd.id.as_str(), i)).collect();
    let springs: Vec<(usize, usize)> = edges
        .iter()
        .filter_map(|e| Some((*index.get(e.source.as_str())?, *index.get(e.target.as_str())?)))
        .filter(|(s, t)| s != t)
        .collect();

    let mut vel = vec![(0.0_f64, 0.0_f64); n];
    let initial_temperature = ((n as f64).sqrt() * 100.0).max(800.0) / 10.0;
    let iterations = options.iterations.max(1);
    // Non-positive or NaN spring lengths would divide by zero below.
    let spring_length = options.spring_length.max(MIN_DISTANCE);

    for step in 0..options.iterations {
        let temperature = initial_temperature * (1.0 - step as f64 / iterations as f64);
        let mut force = vec![(0.0_f64, 0.0_f64); n];

        for i in 0..n {
            for j in (i + 1)..n {
                let (ux, uy, dist) = direction(pos[i], pos[j]);
                let f = options.repulsion_strength / (dist * dist);
                force[i].0 += ux * f;
                force[i].1 += uy * f;
                force[j].0 -= ux * f;
                force[j].1 -= uy * f;
            }
        }

        for &(s, t) in &springs {
            // direction from t towards s; s is pulled the opposite way
            let (ux, uy, dist) = direction(pos[s], pos[t]);
            let f = dist * dist / spring_length * options.spring_strength;
            force[s].0 -= ux * f;
            force[s].1 -= uy * f;
            force[t].0 += ux * f;
            force[t].1 += uy * f;
        }

        for i in 0..n {
            let fx = force[i].0 - pos[i].0 * options.center_force;
            let fy = force[i].1 - pos[i].1 * options.center_force;

            let (mut vx, mut vy) = (vel[i].0 + fx, vel[i].1 + fy);
            let speed = vx.hypot(vy);
            if speed > temperature && speed > 0.0 {
                vx *= temperature / speed;
                vy *= temperature / speed;
            }

            pos[i].0 += vx;
            pos[i].1 += vy;
            vel[i] = (vx * options.damping, vy * options.damping);
        }
    }

    pos.into_iter().map(|(x, y)| Position::new(x, y)).collect()
}

// Unit vector from `b` to `a`, and the (floored) distance between them.
// Coincident points get a fixed +x direction.
fn direction(a: (f64, f64), b: (f64, f64)) -> (f64, f64, f64) {
    let (dx, dy) = (a.0 - b.0, a.1 - b.1);
    let len = dx.hypot(dy);
    if len < f64::EPSILON {
        return (1.0, 0.0, MIN_DISTANCE);
    }
    (dx / len, dy / len, len.max(MIN_DISTANCE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests::{edge, node};

    #[test]
    fn deterministic() {
        let nodes = vec![node("a", 0.0, 0.0), node("b", 10.0, 0.0), node("c", 0.0, 10.0)];
        let edges = vec![edge("a", "b")];
        let opts = LayoutOptions::default();
        assert_eq!(layout(&nodes, &edges, &opts), layout(&nodes, &edges, &opts));
    }

    #[test]
    fn coincident_nodes_separate() {
        let nodes = vec![node("a", 0.0, 0.0), node("b", 0.0, 0.0)];
        let out = layout(&nodes, &[], &LayoutOptions::default());
        assert!(out[0].distance(&out[1]) > 1.0);
        assert!(out.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn springs_pull_distant_neighbours_together() {
        let nodes = vec![node("a", -300.0, 0.0), node("b", 300.0, 0.0)];
        let out = layout(&nodes, &[edge("a", "b")], &LayoutOptions::default());
        assert!(out[0].distance(&out[1]) < 600.0);
    }

    #[test]
    fn zero_spring_length_stays_finite() {
        let nodes = vec![node("a", -50.0, 0.0), node("b", 50.0, 0.0), node("c", 0.0, 40.0)];
        let opts = LayoutOptions {
            spring_length: 0.0,
            ..LayoutOptions::default()
        };
        let out = layout(&nodes, &[edge("a", "b"), edge("b", "c")], &opts);
        assert!(out.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn zero_iterations_leave_positions_alone() {
        let nodes = vec![node("a", 3.0, 4.0), node("b", -1.0, 2.0)];
        let opts = LayoutOptions {
            iterations: 0,
            ..LayoutOptions::default()
        };
        let out = layout(&nodes, &[edge("a", "b")], &opts);
        assert_eq!(out, vec![Position::new(3.0, 4.0), Position::new(-1.0, 2.0)]);
    }

    #[test]
    fn edges_to_unknown_nodes_are_ignored() {
        let nodes = vec![node("a", 0.0, 0.0)];
        let out = layout(&nodes, &[edge("a", "ghost")], &LayoutOptions::default());
        assert_eq!(out.len(), 1);
    }
}
