//! Layout computation and animated transitions.
//!
//! A [`LayoutEngine`] owns the node and edge arrays handed over by the
//! transformer. [`LayoutEngine::apply_layout`] computes target positions with
//! one of three algorithms and starts a transition; the host then advances the
//! transition by calling [`LayoutEngine::tick`] with its own clock, once per
//! frame. Nothing runs between ticks.
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use mettagraph::layout::{LayoutAlgorithm, LayoutEngine, LayoutOptions};
//!
//! let mut engine = LayoutEngine::with_data(graph.nodes, graph.edges);
//! engine.apply_layout(LayoutAlgorithm::Hierarchical, &LayoutOptions::default(), Duration::ZERO);
//! let mut now = Duration::ZERO;
//! while engine.tick(now) {
//!     now += Duration::from_millis(16);
//! }
//! ```

pub mod circular;
pub mod force;
pub mod hierarchical;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{GraphEdge, GraphNode, Position};

/// Screen-space radius within which a click hits a node.
pub const HIT_RADIUS_PX: f64 = 20.0;

/// The available layout algorithms.
///
/// Serialises as a kebab-case string (e.g. `"force-directed"`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutAlgorithm {
    ForceDirected,
    Hierarchical,
    Circular,
}

impl std::fmt::Display for LayoutAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayoutAlgorithm::ForceDirected => write!(f, "force-directed"),
            LayoutAlgorithm::Hierarchical => write!(f, "hierarchical"),
            LayoutAlgorithm::Circular => write!(f, "circular"),
        }
    }
}

/// Parses a [`LayoutAlgorithm`] from its kebab-case name.
impl std::str::FromStr for LayoutAlgorithm {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "force-directed" => Ok(LayoutAlgorithm::ForceDirected),
            "hierarchical" => Ok(LayoutAlgorithm::Hierarchical),
            "circular" => Ok(LayoutAlgorithm::Circular),
            _ => Err(format!(
                "unknown layout algorithm {:?}; expected one of: \
                 force-directed, hierarchical, circular",
                s
            )),
        }
    }
}

/// Tuning knobs for all algorithms.
///
/// Deserialising a partial JSON object fills every missing key from
/// [`LayoutOptions::default`], so `{"iterations": 50}` is a complete config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Force-directed simulation steps.
    pub iterations: usize,
    /// Rest length of an edge spring.
    pub spring_length: f64,
    pub spring_strength: f64,
    pub repulsion_strength: f64,
    /// Velocity multiplier applied after every step.
    pub damping: f64,
    /// Transition length in milliseconds.
    pub animation_duration: u64,
    /// Pull of every node towards the origin.
    pub center_force: f64,
    /// Hierarchical: distance between rows.
    pub level_height: f64,
    /// Hierarchical: distance between nodes in a row.
    pub node_width: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            iterations: 300,
            spring_length: 200.0,
            spring_strength: 0.1,
            repulsion_strength: 1000.0,
            damping: 0.9,
            animation_duration: 1500,
            center_force: 0.01,
            level_height: 150.0,
            node_width: 120.0,
        }
    }
}

/// Snapshot of the engine's animation state.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LayoutState {
    pub is_animating: bool,
    /// Linear elapsed fraction of the current (or last) transition, 0..=1.
    pub progress: f64,
    pub algorithm: Option<LayoutAlgorithm>,
    pub start_time: Duration,
    pub duration: Duration,
}

/// Pan and zoom applied by the renderer: `screen = world * scale + (x, y)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScreenTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for ScreenTransform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

impl ScreenTransform {
    pub fn to_world(&self, screen: Position) -> Position {
        Position::new((screen.x - self.x) / self.scale, (screen.y - self.y) / self.scale)
    }
}

// An in-flight transition; positions are index-aligned with the node array.
#[derive(Debug)]
struct Transition {
    from: Vec<Position>,
    to: Vec<Position>,
}

/// Holds the graph for rendering and moves it between layouts.
///
/// At most one transition runs at a time: starting a layout replaces any
/// transition already in flight.
#[derive(Debug, Default)]
pub struct LayoutEngine {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    state: LayoutState,
    transition: Option<Transition>,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        let mut engine = Self::new();
        engine.set_data(nodes, edges);
        engine
    }

    /// Replace the graph. Any running transition is stopped, since its
    /// targets belong to the old node set.
    pub fn set_data(&mut self, nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) {
        self.stop_layout();
        self.nodes = nodes;
        self.edges = edges;
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Hand the graph back, ending the engine's ownership.
    pub fn into_graph(self) -> (Vec<GraphNode>, Vec<GraphEdge>) {
        (self.nodes, self.edges)
    }

    /// Compute target positions with `algorithm` and start a transition at `now`.
    ///
    /// Targets are computed synchronously; node positions only change as
    /// [`tick`](Self::tick) is called.
    pub fn apply_layout(&mut self, algorithm: LayoutAlgorithm, options: &LayoutOptions, now: Duration) {
        self.stop_layout();

        let to = compute_layout(algorithm, &self.nodes, &self.edges, options);
        let from = self.nodes.iter().map(|n| n.position).collect();
        tracing::debug!(%algorithm, nodes = self.nodes.len(), "starting layout transition");

        self.state = LayoutState {
            is_animating: true,
            progress: 0.0,
            algorithm: Some(algorithm),
            start_time: now,
            duration: Duration::from_millis(options.animation_duration),
        };
        self.transition = Some(Transition { from, to });
    }

    /// Advance the transition to `now`. Returns `true` while more ticks are needed.
    pub fn tick(&mut self, now: Duration) -> bool {
        let Some(transition) = &self.transition else {
            return false;
        };

        let elapsed = now.saturating_sub(self.state.start_time);
        let t = if self.state.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f64() / self.state.duration.as_secs_f64()).clamp(0.0, 1.0)
        };
        let eased = ease_out_cubic(t);

        for ((node, from), to) in self.nodes.iter_mut().zip(&transition.from).zip(&transition.to) {
            node.position = if t >= 1.0 { *to } else { from.lerp(to, eased) };
        }
        self.state.progress = t;

        if t >= 1.0 {
            self.transition = None;
            self.state.is_animating = false;
            tracing::debug!(algorithm = ?self.state.algorithm, "layout transition finished");
            return false;
        }
        true
    }

    /// Cancel the transition. Nodes stay where the last tick left them.
    pub fn stop_layout(&mut self) {
        self.transition = None;
        self.state.is_animating = false;
    }

    pub fn layout_state(&self) -> LayoutState {
        self.state.clone()
    }

    pub fn is_animating(&self) -> bool {
        self.state.is_animating
    }

    /// Move one node directly. Returns `false` if no node has that id.
    ///
    /// Independent of any running transition: the next tick overwrites the
    /// position again if that node is still being animated.
    pub fn handle_node_drag(&mut self, node_id: &str, position: Position) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == node_id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// The node nearest to `screen` within [`HIT_RADIUS_PX`] screen pixels.
    pub fn node_at_position(&self, screen: Position, transform: ScreenTransform) -> Option<&GraphNode> {
        let world = transform.to_world(screen);
        let radius = HIT_RADIUS_PX / transform.scale;

        self.nodes
            .iter()
            .map(|n| (n, n.position.distance(&world)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(n, _)| n)
    }
}

/// Target positions for `nodes` under `algorithm`, index-aligned with `nodes`.
///
/// The result keeps the centroid of the current positions, so switching
/// layouts does not shift the graph within the viewport.
pub fn compute_layout(
    algorithm: LayoutAlgorithm,
    nodes: &[GraphNode],
    edges: &[GraphEdge],
    options: &LayoutOptions,
) -> Vec<Position> {
    let mut positions = match algorithm {
        LayoutAlgorithm::ForceDirected => force::layout(nodes, edges, options),
        LayoutAlgorithm::Hierarchical => hierarchical::layout(nodes, edges, options),
        LayoutAlgorithm::Circular => circular::layout(nodes),
    };
    let current: Vec<Position> = nodes.iter().map(|n| n.position).collect();
    recenter(&mut positions, centroid(&current));
    positions
}

/// `1 - (1 - t)^3`
pub fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

fn centroid(positions: &[Position]) -> Position {
    if positions.is_empty() {
        return Position::default();
    }
    let n = positions.len() as f64;
    let (sx, sy) = positions.iter().fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Position::new(sx / n, sy / n)
}

// Translate so the centroid lands on `target`.
fn recenter(positions: &mut [Position], target: Position) {
    let c = centroid(positions);
    let (dx, dy) = (target.x - c.x, target.y - c.y);
    for p in positions {
        p.x += dx;
        p.y += dy;
    }
}

// --- tests -------------------------------------------------------------------
