// Transformation graph construction.
//
// Builds the voice-leading graph between chord shapes of one cardinality:
//
// 1. Enumerate all chords with `chord_size` active notes and keep one
//    canonical representative per rotation class (`Chord::smallest_rotation`).
// 2. For every shape and configured interval, move each note by the interval
//    where the destination is free. Without `do_all_keys` the neighbor is
//    canonicalized, so an edge means "some transposition of A reaches some
//    transposition of B"; with it the neighbor keeps its exact rotation.
// 3. Encode both ends (bit strings read back to front) into a set of symbol
//    pairs.
// 4. Keep pairs whose shapes pass the inclusion and exclusion terms.
// 5. With `do_all_keys`, sweep each surviving pair through all EDO rotations.
// 6. Optionally drop the redundant last shape digit from every label.
//
// Everything is held in ordered sets, so a given `GraphConfig` always yields
// the same graph. The sets are converted into the `Graph` arena by
// `graph.rs`.

use crate::chord::Chord;
use crate::config::GraphConfig;
use crate::error::CodecError;
use crate::symbol::{Symbol, decode, encode};
use std::collections::BTreeSet;
use tracing::debug;

/// An edge between two chord symbols, source first.
pub type SymbolPair = (Symbol, Symbol);

/// Output of the builder: unique labels and unique ordered label pairs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransformationGraph {
    pub labels: BTreeSet<String>,
    pub edges: BTreeSet<(String, String)>,
}

/// One representative per rotation class of `size`-note chords in `edo`.
pub fn canonical_shapes(edo: usize, size: usize) -> BTreeSet<Chord> {
    Chord::all_with_cardinality(edo, size)
        .iter()
        .map(Chord::smallest_rotation)
        .collect()
}

/// Encoded (shape, neighbor) pairs for every shape and interval, before
/// filtering.
pub fn transformation_pairs(config: &GraphConfig) -> Result<BTreeSet<SymbolPair>, CodecError> {
    let shapes = canonical_shapes(config.edo, config.chord_size);
    debug!(shapes = shapes.len(), "enumerated chord shapes");

    let mut pairs = BTreeSet::new();
    for shape in &shapes {
        let source = encode(&shape.reversed(), config.simplify)?;
        for &interval in &config.intervals {
            for neighbor in shape.interval_neighbors(interval) {
                let neighbor = if config.do_all_keys {
                    neighbor
                } else {
                    neighbor.smallest_rotation()
                };
                let target = encode(&neighbor.reversed(), config.simplify)?;
                pairs.insert((source.clone(), target));
            }
        }
    }
    Ok(pairs)
}

/// Whether a pair survives the inclusion and exclusion terms. Only the shape
/// part of each symbol is tested.
pub fn passes_filters(pair: &SymbolPair, config: &GraphConfig) -> bool {
    let (source, target) = (pair.0.shape(), pair.1.shape());
    let included = config.include.combine(
        config.inclusions.any_in(source),
        config.inclusions.any_in(target),
    );
    let not_excluded = config.exclude.combine(
        config.exclusions.none_in(source),
        config.exclusions.none_in(target),
    );
    included && not_excluded
}

/// Build the full transformation graph for `config`.
pub fn build(config: &GraphConfig) -> Result<TransformationGraph, CodecError> {
    let pairs = transformation_pairs(config)?;
    let total = pairs.len();
    let surviving: Vec<SymbolPair> = pairs
        .into_iter()
        .filter(|pair| passes_filters(pair, config))
        .collect();
    debug!(total, surviving = surviving.len(), "filtered transformation pairs");

    let mut edges: BTreeSet<SymbolPair> = BTreeSet::new();
    if config.do_all_keys {
        for (source, target) in &surviving {
            let sources = decode(source, config.edo)?.all_rotations();
            let targets = decode(target, config.edo)?.all_rotations();
            for (from, to) in sources.iter().zip(&targets) {
                edges.insert((encode(from, config.simplify)?, encode(to, config.simplify)?));
            }
        }
    } else {
        edges.extend(surviving);
    }

    let label = |symbol: &Symbol| {
        if config.truncate {
            symbol.truncated().to_string()
        } else {
            symbol.to_string()
        }
    };
    let mut graph = TransformationGraph::default();
    for (source, target) in &edges {
        let (source, target) = (label(source), label(target));
        graph.labels.insert(source.clone());
        graph.labels.insert(target.clone());
        graph.edges.insert((source, target));
    }
    Ok(graph)
}
