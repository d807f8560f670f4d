// EDO chord graph layout: CLI entry point.
//
// Reads a graph file written by `generate`, lays out each connected component
// on its own, fits every component to a square viewport and writes the scene
// as JSON (to stdout unless --output is given).
//
// Usage:
//   cargo run -p edo_graphs --bin layout -- [graph.net] [--settings FILE]
//     [--dimensions N] [--iterations N] [--seed N] [--viewport SIZE]
//     [--margin PX] [--timeout-secs N] [--output FILE]
//
// Without --seed a seed is taken from the clock and logged, so any run can be
// repeated.

use edo_graphs::bounding::Viewport;
use edo_graphs::cli::{flag_value, parse_flag, positional};
use edo_graphs::config::Settings;
use edo_graphs::layout::{CancelToken, LayoutParams};
use edo_graphs::{logging, pipeline};
use edo_graphs_prng::LayoutRng;
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info};

const DEFAULT_INPUT: &str = "graph.net";
const DEFAULT_VIEWPORT: f64 = 800.0;
const DEFAULT_MARGIN: f64 = 40.0;

fn main() -> ExitCode {
    logging::init();
    let args: Vec<String> = std::env::args().collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> edo_graphs::Result<()> {
    let input = positional(args).unwrap_or(DEFAULT_INPUT);
    let settings = match flag_value(args, "--settings") {
        Some(path) => Settings::load(Path::new(path))?,
        None => Settings::default(),
    };
    let mut layout_settings = settings.layout_settings()?;
    if let Some(dimensions) = parse_flag(args, "--dimensions")? {
        layout_settings.dimensions = dimensions;
    }
    if let Some(iterations) = parse_flag(args, "--iterations")? {
        layout_settings.iterations = iterations;
    }

    let seed = match parse_flag(args, "--seed")? {
        Some(seed) => seed,
        None => {
            let seed = LayoutRng::clock_seed();
            info!(seed, "no --seed given, using clock seed");
            seed
        }
    };
    let size = parse_flag(args, "--viewport")?.unwrap_or(DEFAULT_VIEWPORT);
    let margin = parse_flag(args, "--margin")?.unwrap_or(DEFAULT_MARGIN);
    let cancel = match parse_flag::<u64>(args, "--timeout-secs")? {
        Some(secs) => CancelToken::with_timeout(Duration::from_secs(secs)),
        None => CancelToken::new(),
    };

    let params = LayoutParams::new(layout_settings, seed);
    let scene = pipeline::visualize(
        Path::new(input),
        &params,
        &Viewport::square(size, margin),
        &cancel,
    )?;

    match flag_value(args, "--output") {
        Some(path) => {
            scene.save(Path::new(path))?;
            info!(
                path,
                components = scene.components.len(),
                nodes = scene.node_count(),
                "wrote scene"
            );
        }
        None => println!("{}", scene.to_json()?),
    }
    Ok(())
}
