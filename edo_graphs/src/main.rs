// EDO chord graph generator: CLI entry point.
//
// Builds the voice-leading graph for one EDO and chord size and writes it as
// a graph file for the `layout` binary.
//
// Usage:
//   cargo run -p edo_graphs --bin generate -- [graph.net] [--settings FILE]
//     [--edo N] [--chord-size N] [--intervals A,B,..] [--all-keys BOOL]
//     [--truncate BOOL] [--simplify BOOL] [--include TERMS] [--exclude TERMS]
//     [--include-and BOOL] [--exclude-and BOOL]
//
// Flags override the settings file, which defaults to the built-in settings.
// TERMS uses the settings editor's format, e.g. "'32', '23'"; "False" or an
// empty string disables the filter.

use edo_graphs::cli::{flag_value, parse_flag, positional};
use edo_graphs::config::{Settings, TermField, parse_intervals};
use edo_graphs::{logging, pipeline};
use std::path::Path;
use std::process::ExitCode;
use tracing::error;

const DEFAULT_OUTPUT: &str = "graph.net";

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
    let output = positional(args).unwrap_or(DEFAULT_OUTPUT);
    let settings = load_settings(args)?;
    let config = settings.graph_config()?;
    let report = pipeline::generate(&config, Path::new(output))?;
    println!(
        "{output}: {} chords, {} transformations, {} components",
        report.nodes, report.edges, report.components
    );
    Ok(())
}

/// The settings file (or defaults) with command-line overrides applied.
fn load_settings(args: &[String]) -> edo_graphs::Result<Settings> {
    let mut settings = match flag_value(args, "--settings") {
        Some(path) => Settings::load(Path::new(path))?,
        None => Settings::default(),
    };

    if let Some(edo) = parse_flag(args, "--edo")? {
        settings.edo = edo;
    }
    if let Some(size) = parse_flag(args, "--chord-size")? {
        settings.chord_size = size;
    }
    if let Some(text) = flag_value(args, "--intervals") {
        settings.intervals = parse_intervals(text)?;
    }
    if let Some(all_keys) = parse_flag(args, "--all-keys")? {
        settings.do_all_keys = all_keys;
    }
    if let Some(truncate) = parse_flag(args, "--truncate")? {
        settings.truncate_symbols = truncate;
    }
    if let Some(simplify) = parse_flag(args, "--simplify")? {
        settings.simplify_symbols = simplify;
    }
    if let Some(terms) = flag_value(args, "--include") {
        settings.inclusions = TermField::Text(terms.to_string());
    }
    if let Some(terms) = flag_value(args, "--exclude") {
        settings.exclusions = TermField::Text(terms.to_string());
    }
    if let Some(and) = parse_flag(args, "--include-and")? {
        settings.include_and = and;
    }
    if let Some(and) = parse_flag(args, "--exclude-and")? {
        settings.exclude_and = and;
    }
    Ok(settings)
}
