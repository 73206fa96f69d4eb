//! WebAssembly bindings for the mettagraph core library.
//!
//! Exposes the parsing pipeline and the layout engine to JavaScript/TypeScript
//! via `wasm-bindgen`. Compile with `wasm-pack build` to produce an npm-ready
//! package; the canvas renderer and editor UI live on the JS side.
//!
//! ## Text API — [`validate`], [`parse`], [`render`]
//!
//! ```js
//! import init, { validate, parse, render } from './mettagraph_wasm.js';
//! await init();
//!
//! const report = JSON.parse(validate(text));   // { errors, warnings, isValid }
//! const graph = JSON.parse(parse(text));       // { nodes, edges, hypergraphs, metadata, errors, ... }
//! console.log(render(text));
//! ```
//!
//! ## Layout API — [`LayoutSession`]
//!
//! ```js
//! const session = new LayoutSession();
//! session.setData(JSON.stringify(graph.nodes), JSON.stringify(graph.edges));
//! session.applyLayout('hierarchical', JSON.stringify({ levelHeight: 120 }), performance.now());
//!
//! function frame(now) {
//!   const running = session.tick(now);
//!   draw(JSON.parse(session.nodes()));
//!   if (running) requestAnimationFrame(frame);
//! }
//! requestAnimationFrame(frame);
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use mettagraph::{DiagnosticKind, LayoutAlgorithm, LayoutOptions, Position, ScreenTransform};
use wasm_bindgen::prelude::*;

/// One-time initialisation called at the start of every exported function.
///
/// Installs the `console_error_panic_hook` when the feature is enabled so
/// that Rust panics are forwarded to the browser console as readable errors
/// rather than appearing as generic "unreachable" WASM traps.
fn setup() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Validate fact text line by line and return the report as a JSON string:
/// `{ "errors": [...], "warnings": [...], "isValid": bool }`.
#[wasm_bindgen]
pub fn validate(text: &str) -> Result<String, JsValue> {
    setup();
    let report = mettagraph::validate_text(text);
    to_json(&report)
}

/// Parse fact text into a graph and return it as a JSON string.
///
/// Never throws for bad input: per-line problems are listed under `errors`.
///
/// When the crate is used as a native rlib, a panic inside the pipeline is
/// caught and the result is an empty graph with a single line-1 error. On
/// `wasm32-unknown-unknown` panics abort instead of unwinding, so this fallback
/// never runs there; the panic hook logs the message to the console.
#[wasm_bindgen]
pub fn parse(text: &str) -> Result<String, JsValue> {
    setup();
    let result = panic::catch_unwind(AssertUnwindSafe(|| mettagraph::parse_document(text)))
        .unwrap_or_else(|_| mettagraph::ParseResult {
            errors: vec![mettagraph::Diagnostic::error(
                1,
                1,
                DiagnosticKind::Malformed,
                "internal error while parsing",
            )],
            ..Default::default()
        });
    to_json(&result)
}

/// Render fact text as a human-readable summary.
#[wasm_bindgen]
pub fn render(text: &str) -> String {
    setup();
    let result = mettagraph::parse_document(text);
    mettagraph::render::render_graph(&result.graph)
}

// ── Layout API ────────────────────────────────────────────────────────────────

/// A layout engine holding one graph.
///
/// Timestamps are host milliseconds, e.g. from `performance.now()`.
#[wasm_bindgen]
pub struct LayoutSession {
    inner: mettagraph::LayoutEngine,
}

#[wasm_bindgen]
impl LayoutSession {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        setup();
        Self {
            inner: mettagraph::LayoutEngine::new(),
        }
    }

    /// Replace the graph with JSON arrays of nodes and edges, as produced by [`parse`].
    #[wasm_bindgen(js_name = setData)]
    pub fn set_data(&mut self, nodes_json: &str, edges_json: &str) -> Result<(), JsValue> {
        let nodes = serde_json::from_str(nodes_json)
            .map_err(|e| JsValue::from_str(&format!("nodes parse error: {e}")))?;
        let edges = serde_json::from_str(edges_json)
            .map_err(|e| JsValue::from_str(&format!("edges parse error: {e}")))?;
        self.inner.set_data(nodes, edges);
        Ok(())
    }

    /// Start a transition to `algorithm` (`force-directed`, `hierarchical`,
    /// or `circular`). `options_json` may be a partial options object.
    #[wasm_bindgen(js_name = applyLayout)]
    pub fn apply_layout(
        &mut self,
        algorithm: &str,
        options_json: Option<String>,
        now_ms: f64,
    ) -> Result<(), JsValue> {
        let algorithm: LayoutAlgorithm = algorithm.parse().map_err(|e: String| JsValue::from_str(&e))?;
        let options: LayoutOptions = match options_json {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| JsValue::from_str(&format!("options parse error: {e}")))?,
            None => LayoutOptions::default(),
        };
        self.inner.apply_layout(algorithm, &options, millis(now_ms));
        Ok(())
    }

    /// Advance the transition. Returns `true` while more frames are needed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.inner.tick(millis(now_ms))
    }

    #[wasm_bindgen(js_name = stopLayout)]
    pub fn stop_layout(&mut self) {
        self.inner.stop_layout();
    }

    /// `{ isAnimating, progress, algorithm, startTimeMs, durationMs }`
    #[wasm_bindgen(js_name = layoutState)]
    pub fn layout_state(&self) -> String {
        let state = self.inner.layout_state();
        serde_json::json!({
            "isAnimating": state.is_animating,
            "progress":    state.progress,
            "algorithm":   state.algorithm.map(|a| a.to_string()),
            "startTimeMs": state.start_time.as_secs_f64() * 1000.0,
            "durationMs":  state.duration.as_secs_f64() * 1000.0,
        })
        .to_string()
    }

    /// Current nodes, with positions, as a JSON array.
    pub fn nodes(&self) -> Result<String, JsValue> {
        to_json(self.inner.nodes())
    }

    pub fn edges(&self) -> Result<String, JsValue> {
        to_json(self.inner.edges())
    }

    /// Move a node to a world position. Returns `false` if the id is unknown.
    #[wasm_bindgen(js_name = handleNodeDrag)]
    pub fn handle_node_drag(&mut self, node_id: &str, x: f64, y: f64) -> bool {
        self.inner.handle_node_drag(node_id, Position::new(x, y))
    }

    /// Id of the node under a screen point, given the renderer's pan/zoom.
    #[wasm_bindgen(js_name = nodeAtPosition)]
    pub fn node_at_position(&self, screen_x: f64, screen_y: f64, tx: f64, ty: f64, scale: f64) -> Option<String> {
        let transform = ScreenTransform { x: tx, y: ty, scale };
        self.inner
            .node_at_position(Position::new(screen_x, screen_y), transform)
            .map(|n| n.id.clone())
    }
}

impl Default for LayoutSession {
    fn default() -> Self {
        Self::new()
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn millis(ms: f64) -> Duration {
    if ms.is_finite() && ms > 0.0 {
        Duration::from_secs_f64(ms / 1000.0)
    } else {
        Duration::ZERO
    }
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, JsValue> {
    serde_json::to_string(value).map_err(|e| JsValue::from_str(&e.to_string()))
}
