//! End-to-end checks: text → triples → graph → layout.

use std::collections::BTreeSet;
use std::time::Duration;

use mettagraph::{
    parse_document, DiagnosticKind, EdgeType, LayoutAlgorithm, LayoutEngine, LayoutOptions,
    NodeType, Position, Terms,
};

const FRIENDS: &str = "\
; characters
(gender Chandler M)
(gender Monica F)
(married Chandler Monica)
(married Monica Chandler)
(parents Ross Jack Judy)
(believes Phoebe (likes Joey Pizza))
";

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn simple_fact_yields_one_triple() {
    let result = parse_document("(likes Alice Bob)");
    assert!(result.is_valid());
    assert_eq!(result.triples.len(), 1);
    let t = &result.triples[0];
    assert_eq!(t.predicate, "likes");
    assert_eq!(t.subject, Terms::One("Alice".into()));
    assert_eq!(t.object, Terms::One("Bob".into()));
    assert!(!t.is_hypergraph);
}

#[test]
fn ids_are_stable_across_parses() {
    let ids = |text: &str| {
        let r = parse_document(text);
        (
            r.graph.nodes.iter().map(|n| n.id.clone()).collect::<BTreeSet<_>>(),
            r.graph.edges.iter().map(|e| e.id.clone()).collect::<BTreeSet<_>>(),
        )
    };
    assert_eq!(ids(FRIENDS), ids(FRIENDS));
}

#[test]
fn repeated_fact_is_deduplicated() {
    let result = parse_document("(gender Chandler M)\n(gender Chandler M)");
    let g = &result.graph;
    assert_eq!(g.nodes.len(), 2);
    assert_eq!(g.node("chandler").unwrap().metadata.occurrences, 2);
    assert_eq!(g.node("m").unwrap().metadata.occurrences, 2);
    assert_eq!(g.edges.len(), 1);
}

#[test]
fn unbalanced_line_yields_one_error_and_no_triples() {
    let result = parse_document("(gender Chandler M");
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, DiagnosticKind::UnmatchedOpening);
    assert!(result.triples.is_empty());
    assert!(result.graph.is_empty());
}

#[test]
fn hypergraph_fact_builds_intermediate_structure() {
    let result = parse_document("(believes Alice (likes Bob Carol))");
    let g = &result.graph;

    assert_eq!(g.hypergraphs.len(), 1);
    let hg = &g.hypergraphs[0];
    assert_eq!(hg.subjects, vec!["Alice"]);
    assert_eq!(hg.objects, vec!["likes", "Bob", "Carol"]);

    let members = g.nodes.iter().filter(|n| n.node_type != NodeType::Hypergraph).count();
    let intermediates = g.nodes.iter().filter(|n| n.node_type == NodeType::Hypergraph).count();
    assert_eq!(members, 4);
    assert_eq!(intermediates, 1);

    assert_eq!(g.edges.len(), 4);
    assert!(g
        .edges
        .iter()
        .all(|e| e.edge_type == EdgeType::HypergraphConnection && !e.directed));
    assert_eq!(
        g.node(&hg.intermediate_node_id).unwrap().metadata.original_expression.as_deref(),
        Some("(believes Alice (likes Bob Carol))")
    );
}

#[test]
fn reciprocal_facts_keep_both_edges() {
    let result = parse_document(FRIENDS);
    let g = &result.graph;
    assert!(g.edge("married-chandler-monica").is_some());
    assert!(g.edge("married-monica-chandler").is_some());
    assert_eq!(g.metadata.bidirectional_count, 1);
}

#[test]
fn hierarchical_chain_levels() {
    let result = parse_document("(next A B)\n(next B C)");
    let g = result.graph;
    let opts = LayoutOptions {
        level_height: 90.0,
        ..LayoutOptions::default()
    };
    let mut engine = LayoutEngine::with_data(g.nodes, g.edges);
    engine.apply_layout(LayoutAlgorithm::Hierarchical, &opts, ms(0));
    assert!(!engine.tick(ms(opts.animation_duration)));

    let y = |id: &str| engine.nodes().iter().find(|n| n.id == id).unwrap().position.y;
    assert!(y("a") < y("b") && y("b") < y("c"));
    assert!((y("b") - y("a") - 90.0).abs() < 1e-9);
    assert!((y("c") - y("b") - 90.0).abs() < 1e-9);
}

#[test]
fn force_layout_is_reproducible() {
    let run = || {
        let g = parse_document(FRIENDS).graph;
        let mut engine = LayoutEngine::with_data(g.nodes, g.edges);
        engine.apply_layout(LayoutAlgorithm::ForceDirected, &LayoutOptions::default(), ms(0));
        engine.tick(ms(10_000));
        engine.nodes().iter().map(|n| n.position).collect::<Vec<Position>>()
    };
    let a = run();
    let b = run();
    assert_eq!(a.len(), b.len());
    for (p, q) in a.iter().zip(&b) {
        assert!(p.distance(q) < 1e-9);
    }
}

#[test]
fn stop_mid_animation_freezes_nodes() {
    let g = parse_document(FRIENDS).graph;
    let mut engine = LayoutEngine::with_data(g.nodes, g.edges);
    let opts = LayoutOptions::default();
    let targets = mettagraph::layout::compute_layout(
        LayoutAlgorithm::Circular,
        engine.nodes(),
        engine.edges(),
        &opts,
    );

    engine.apply_layout(LayoutAlgorithm::Circular, &opts, ms(0));
    assert!(engine.tick(ms(400)));
    engine.stop_layout();

    let state = engine.layout_state();
    assert!(!state.is_animating);
    assert!(state.progress > 0.0 && state.progress < 1.0);

    let frozen: Vec<Position> = engine.nodes().iter().map(|n| n.position).collect();
    engine.tick(ms(5000));
    let after: Vec<Position> = engine.nodes().iter().map(|n| n.position).collect();
    assert_eq!(frozen, after);
    assert!(frozen.iter().zip(&targets).any(|(p, t)| p.distance(t) > 1e-6));
}

#[test]
fn garbage_degrades_to_partial_graph() {
    let text = "hello\n)(\n(((\n(likes Ann Bob)\n(x)\n(a b) (c d)";
    let result = parse_document(text);
    assert_eq!(result.triples.len(), 1);
    assert_eq!(result.graph.nodes.len(), 2);
    assert_eq!(result.errors.len(), 5);
}
