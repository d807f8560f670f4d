// EDO chord graphs
//
// Models the chords of an N-tone equal division of the octave as binary
// necklaces, builds the graph of single-note voice-leading moves between chord
// shapes, and lays that graph out for display. Two stages, run by two
// binaries that share nothing but a graph file:
//
//   generate: config -> transformation graph -> pruned graph -> graph file
//   layout:   graph file -> per component: D-dim layout -> 3-D projection
//             -> viewport fit -> scene
//
// Architecture:
// - chord.rs: Chords as bit strings (rotation, reversal, interval neighbors)
// - symbol.rs: Base-62 shape symbols and the necklace encode/decode codec
// - config.rs: Settings file, `GraphConfig` validation, filter terms
// - transform.rs: Transformation graph builder (shapes, filters, key sweep)
// - graph.rs: Arena graph with label index, components and pruning
// - graph_file.rs: Line-oriented graph file reader/writer, atomic save
// - layout.rs: Seeded N-dimensional force-directed layout with cancellation
// - projection.rs: Principal-axis projection to three dimensions
// - bounding.rs: Smallest enclosing ball and viewport fitting
// - pipeline.rs: The generate and visualize stages, scene output
// - cli.rs: Flag parsing shared by the binaries
// - logging.rs: `tracing` subscriber setup for the binaries
// - error.rs: Per-stage error enums and the crate `Error`
//
// Everything except `LayoutRng` seeding is deterministic; the binaries pick a
// clock seed only when none is given.

pub mod bounding;
pub mod chord;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod graph_file;
pub mod layout;
pub mod logging;
pub mod pipeline;
pub mod projection;
pub mod symbol;
pub mod transform;

pub use error::{Error, Result};
