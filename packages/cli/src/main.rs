//! `mgraph` — command-line interface for mettagraph.
//!
//! Provides four subcommands for working with Metta fact files:
//!
//! - **`validate`** — check every line and print errors and warnings.
//! - **`parse`** — print the parsed graph (nodes, edges, hypergraphs) as JSON.
//! - **`layout`** — parse, run a layout to completion, and print the
//!   positioned graph as JSON.
//! - **`render`** — print a human-readable summary of the graph.
//!
//! All subcommands read from a file path or from stdin (`-`), and exit 1 when
//! any input line has errors. Set `RUST_LOG` (e.g. `RUST_LOG=mettagraph=debug`)
//! to see pipeline logging on stderr.

mod config;

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use mettagraph::{parse_document, Diagnostic, LayoutAlgorithm, LayoutEngine, ParseResult};
use serde::Serialize;

use config::{load_layout_options, Overrides};

/// Simulated frame interval used to drive layout transitions headlessly.
const FRAME: Duration = Duration::from_millis(16);

/// Frames simulated before a transition is snapped to its end.
const MAX_FRAMES: usize = 1000;

/// mgraph — Metta fact graph CLI
///
/// Validate, parse, lay out, and summarise Metta fact files.
#[derive(Parser)]
#[command(name = "mgraph", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check every line of a fact file.
    ///
    /// Exits 0 if there are no errors (warnings are allowed), 1 otherwise.
    /// Pass `-` as FILE to read from stdin.
    Validate {
        /// Path to a fact file, or `-` for stdin.
        file: PathBuf,
    },

    /// Parse a fact file and print the graph as JSON.
    ///
    /// Lines with errors are skipped; the errors are included in the output
    /// and the exit code is 1.
    Parse {
        /// Path to a fact file, or `-` for stdin.
        file: PathBuf,

        /// Pretty-print the JSON.
        #[arg(long)]
        pretty: bool,
    },

    /// Parse a fact file, apply a layout, and print the positioned graph as JSON.
    ///
    /// Examples:
    ///   mgraph layout facts.metta -a hierarchical
    ///   mgraph layout facts.metta -a force-directed --options layout.json --iterations 100
    Layout {
        /// Path to a fact file, or `-` for stdin.
        file: PathBuf,

        /// Layout algorithm: force-directed | hierarchical | circular
        #[arg(short = 'a', long, env = "MGRAPH_ALGORITHM", default_value = "force-directed")]
        algorithm: LayoutAlgorithm,

        /// JSON file with layout options; missing keys keep their defaults.
        #[arg(long, env = "MGRAPH_OPTIONS", value_name = "FILE")]
        options: Option<PathBuf>,

        /// Force-directed simulation steps.
        #[arg(long)]
        iterations: Option<usize>,

        /// Transition length in milliseconds.
        #[arg(long = "duration-ms", value_name = "MS")]
        duration_ms: Option<u64>,

        /// Hierarchical: distance between rows.
        #[arg(long)]
        level_height: Option<f64>,

        /// Hierarchical: distance between nodes in a row.
        #[arg(long)]
        node_width: Option<f64>,

        /// Pretty-print the JSON.
        #[arg(long)]
        pretty: bool,
    },

    /// Print a human-readable summary of the graph.
    Render {
        /// Path to a fact file, or `-` for stdin.
        file: PathBuf,
    },
}

/// JSON shape printed by `mgraph layout`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOutput<'a> {
    algorithm: LayoutAlgorithm,
    nodes: &'a [mettagraph::GraphNode],
    edges: &'a [mettagraph::GraphEdge],
    errors: &'a [Diagnostic],
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mettagraph=info,mgraph=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Validate { file } => {
            let text = read_input(&file);
            let report = mettagraph::validate_text(&text);
            for d in report.errors.iter().chain(&report.warnings) {
                eprintln!("{}", format_diagnostic(&file, d));
            }
            if report.is_valid {
                println!(
                    "valid ({} warning{})",
                    report.warnings.len(),
                    if report.warnings.len() == 1 { "" } else { "s" }
                );
            } else {
                process::exit(1);
            }
        }

        Command::Parse { file, pretty } => {
            let text = read_input(&file);
            let result = parse_document(&text);
            print_json(&result, pretty);
            finish(exit_code(&result));
        }

        Command::Layout {
            file,
            algorithm,
            options,
            iterations,
            duration_ms,
            level_height,
            node_width,
            pretty,
        } => {
            let overrides = Overrides {
                iterations,
                duration_ms,
                level_height,
                node_width,
            };
            let options = load_layout_options(options.as_deref(), &overrides).unwrap_or_else(|e| fatal(&e));

            let text = read_input(&file);
            let result = parse_document(&text);
            for d in &result.errors {
                eprintln!("{}", format_diagnostic(&file, d));
            }

            let code = exit_code(&result);
            let graph = result.graph;
            let mut engine = LayoutEngine::with_data(graph.nodes, graph.edges);
            engine.apply_layout(algorithm, &options, Duration::ZERO);
            let frames = run_transition(&mut engine);
            tracing::info!(%algorithm, frames, "layout finished");

            let output = LayoutOutput {
                algorithm,
                nodes: engine.nodes(),
                edges: engine.edges(),
                errors: &result.errors,
            };
            print_json(&output, pretty);
            finish(code);
        }

        Command::Render { file } => {
            let text = read_input(&file);
            let result = parse_document(&text);
            for d in &result.errors {
                eprintln!("{}", format_diagnostic(&file, d));
            }
            print!("{}", mettagraph::render::render_graph(&result.graph));
            finish(exit_code(&result));
        }
    }
}

/// 0 for a clean parse, 1 when any line had errors.
fn exit_code(result: &ParseResult) -> i32 {
    if result.is_valid() {
        0
    } else {
        1
    }
}

/// Flush stdout and exit with `code`.
fn finish(code: i32) -> ! {
    let _ = io::stdout().flush();
    process::exit(code);
}

/// Drive a transition started at time zero to completion in simulated
/// frames, snapping to the end after [`MAX_FRAMES`]. Returns the frame count.
fn run_transition(engine: &mut LayoutEngine) -> usize {
    let mut now = Duration::ZERO;
    let mut frames = 0;
    while engine.tick(now) {
        frames += 1;
        if frames >= MAX_FRAMES {
            engine.tick(Duration::MAX);
            break;
        }
        now += FRAME;
    }
    frames
}

/// `file:line:column: severity: message`, the format editors understand.
fn format_diagnostic(file: &PathBuf, d: &Diagnostic) -> String {
    let severity = match d.severity {
        mettagraph::Severity::Error => "error",
        mettagraph::Severity::Warning => "warning",
    };
    format!("{}:{}:{}: {}: {}", file.display(), d.line, d.column, severity, d.message)
}

fn print_json<T: Serialize>(value: &T, pretty: bool) {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match json {
        Ok(s) => println!("{}", s),
        Err(e) => fatal(&format!("failed to serialise output: {}", e)),
    }
}

/// Read the full contents of a file, or stdin when the path is `"-"`.
fn read_input(path: &PathBuf) -> String {
    if path.to_str() == Some("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .unwrap_or_else(|e| fatal(&format!("failed to read stdin: {}", e)));
        buf
    } else {
        fs::read_to_string(path).unwrap_or_else(|e| {
            fatal(&format!("failed to read {}: {}", path.display(), e))
        })
    }
}

/// Print an error message to stderr and exit with code 2.
fn fatal(msg: &str) -> ! {
    eprintln!("mgraph: {}", msg);
    process::exit(2);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_flags_parse() {
        let cli = Cli::try_parse_from([
            "mgraph",
            "layout",
            "facts.metta",
            "-a",
            "circular",
            "--iterations",
            "50",
            "--duration-ms",
            "0",
        ])
        .unwrap();
        match cli.command {
            Command::Layout {
                algorithm,
                iterations,
                duration_ms,
                ..
            } => {
                assert_eq!(algorithm, LayoutAlgorithm::Circular);
                assert_eq!(iterations, Some(50));
                assert_eq!(duration_ms, Some(0));
            }
            _ => panic!("expected layout subcommand"),
        }
    }

    #[test]
    fn unknown_algorithm_is_rejected() {
        let result = Cli::try_parse_from(["mgraph", "layout", "facts.metta", "-a", "spiral"]);
        assert!(result.is_err());
    }

    #[test]
    fn exit_code_reflects_line_errors() {
        assert_eq!(exit_code(&parse_document("(gender Chandler M)")), 0);
        assert_eq!(exit_code(&parse_document("(likes Ann Bob)\n(gender Chandler M")), 1);
    }

    #[test]
    fn long_transitions_are_capped() {
        let result = parse_document("(next A B)\n(next B C)");
        let mut engine = LayoutEngine::with_data(result.graph.nodes, result.graph.edges);
        let options = mettagraph::LayoutOptions {
            animation_duration: u64::MAX,
            ..Default::default()
        };
        engine.apply_layout(LayoutAlgorithm::Hierarchical, &options, Duration::ZERO);

        assert_eq!(run_transition(&mut engine), MAX_FRAMES);
        let state = engine.layout_state();
        assert!(!state.is_animating);
        assert_eq!(state.progress, 1.0);
    }

    #[test]
    fn short_transitions_run_frame_by_frame() {
        let result = parse_document("(next A B)");
        let mut engine = LayoutEngine::with_data(result.graph.nodes, result.graph.edges);
        let options = mettagraph::LayoutOptions {
            animation_duration: 100,
            ..Default::default()
        };
        engine.apply_layout(LayoutAlgorithm::Circular, &options, Duration::ZERO);
        assert_eq!(run_transition(&mut engine), 7);
    }

    #[test]
    fn diagnostic_format() {
        let report = mettagraph::validate_text("(likes Alice");
        let line = format_diagnostic(&PathBuf::from("f.metta"), &report.errors[0]);
        assert_eq!(line, "f.metta:1:1: error: unmatched opening parenthesis");
    }
}
