// Stage entry points used by the binaries.
//
// Two stages, joined only by the graph file on disk:
//
// - `generate`: validate the config, build the transformation graph, drop
//   components too small to be interesting, and write the graph file.
// - `visualize`: read a graph file, split it into connected components, and
//   lay out, project and fit each one to the viewport on its own, producing a
//   `Scene` for a renderer that shows one component at a time.
//
// Nothing is written when a stage fails, so the previous output survives a
// bad run.

use crate::bounding::{self, Viewport};
use crate::config::GraphConfig;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::graph_file::{self, GraphFile};
use crate::layout::{self, CancelToken, LayoutParams};
use crate::projection;
use crate::transform;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::path::Path;
use tracing::{debug, info};

/// Components with fewer chords than this are dropped before writing.
pub const MIN_COMPONENT_SIZE: usize = 3;

/// Summary of a completed `generate` run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateReport {
    pub nodes: usize,
    pub edges: usize,
    pub components: usize,
    pub dropped_nodes: usize,
}

/// Build and prune the graph for `config`, without touching the filesystem.
pub fn build_graph(config: &GraphConfig) -> Result<Graph> {
    build_and_prune(config).map(|(graph, _)| graph)
}

/// The pruned graph and the number of nodes pruning removed.
fn build_and_prune(config: &GraphConfig) -> Result<(Graph, usize)> {
    config.validate()?;
    let transformations = transform::build(config)?;
    let full = Graph::from_transformations(&transformations);
    let pruned = full.retain_components(MIN_COMPONENT_SIZE);
    let dropped = full.node_count() - pruned.node_count();
    debug!(
        built = full.node_count(),
        kept = pruned.node_count(),
        "pruned small components"
    );
    if pruned.node_count() == 0 {
        return Err(Error::EmptyGraph {
            min_component: MIN_COMPONENT_SIZE,
        });
    }
    Ok((pruned, dropped))
}

/// Build the graph for `config` and write it to `output`.
pub fn generate(config: &GraphConfig, output: &Path) -> Result<GenerateReport> {
    info!(
        edo = config.edo,
        chord_size = config.chord_size,
        all_keys = config.do_all_keys,
        "generating transformation graph"
    );
    let (graph, dropped_nodes) = build_and_prune(config)?;
    graph_file::save(output, config.edo, &graph)?;

    let report = GenerateReport {
        nodes: graph.node_count(),
        edges: graph.edge_count(),
        components: graph.connected_components().len(),
        dropped_nodes,
    };
    info!(
        nodes = report.nodes,
        edges = report.edges,
        components = report.components,
        dropped = report.dropped_nodes,
        path = %output.display(),
        "wrote graph file"
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Scene
// ---------------------------------------------------------------------------

/// The laid-out components of one graph file, largest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub edo: usize,
    pub seed: u64,
    pub components: Vec<ComponentScene>,
}

/// One connected component in viewport coordinates, ready to draw. Edges
/// index into `labels` and `points`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentScene {
    pub labels: Vec<String>,
    pub edges: Vec<[usize; 2]>,
    pub points: Vec<[f64; 3]>,
    pub scale: f64,
    pub degenerate: bool,
}

impl Scene {
    pub fn node_count(&self) -> usize {
        self.components.iter().map(|c| c.labels.len()).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Lay out each component of an already loaded graph file and fit it to
/// `viewport`. Components smaller than `MIN_COMPONENT_SIZE` are skipped;
/// component `i` (in largest-first order) is seeded with `seed + i`.
pub fn layout_graph(
    file: &GraphFile,
    params: &LayoutParams,
    viewport: &Viewport,
    cancel: &CancelToken,
) -> Result<Scene> {
    let graph = &file.graph;
    let mut components = graph.connected_components();
    components.retain(|c| c.len() >= MIN_COMPONENT_SIZE);
    components.sort_by_key(|c| Reverse(c.len()));
    if components.is_empty() {
        return Err(Error::EmptyGraph {
            min_component: MIN_COMPONENT_SIZE,
        });
    }
    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        components = components.len(),
        dimensions = params.dimensions,
        iterations = params.iterations,
        seed = params.seed,
        "laying out graph"
    );

    let mut scenes = Vec::with_capacity(components.len());
    for (i, ids) in components.iter().enumerate() {
        let params = LayoutParams {
            seed: params.seed.wrapping_add(i as u64),
            ..*params
        };
        scenes.push(layout_component(&graph.subgraph(ids), &params, viewport, cancel)?);
    }

    Ok(Scene {
        edo: file.edo,
        seed: params.seed,
        components: scenes,
    })
}

fn layout_component(
    graph: &Graph,
    params: &LayoutParams,
    viewport: &Viewport,
    cancel: &CancelToken,
) -> Result<ComponentScene> {
    let positions = layout::run(graph, params, cancel)?;
    let projected = projection::principal_axes(&positions);
    let normalized = bounding::normalize(&projected, viewport)?;
    debug!(
        nodes = graph.node_count(),
        radius = normalized.ball.radius,
        scale = normalized.scale,
        "fitted component to viewport"
    );

    Ok(ComponentScene {
        labels: graph.nodes().iter().map(|n| n.label.clone()).collect(),
        edges: graph
            .edges()
            .iter()
            .map(|e| [e.from.index(), e.to.index()])
            .collect(),
        points: normalized.points.iter().map(|p| [p.x, p.y, p.z]).collect(),
        scale: normalized.scale,
        degenerate: normalized.degenerate,
    })
}

/// Read the graph file at `input` and turn it into a scene.
pub fn visualize(
    input: &Path,
    params: &LayoutParams,
    viewport: &Viewport,
    cancel: &CancelToken,
) -> Result<Scene> {
    let file = graph_file::load(input)?;
    layout_graph(&file, params, viewport, cancel)
}
