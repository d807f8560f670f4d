// Force-directed layout in D dimensions.
//
// A Fruchterman-Reingold style simulation with linear annealing:
//
// - every node starts at a point drawn uniformly from [0, 1)^D,
// - each unordered pair of distinct nodes repels with magnitude k²/d,
// - each edge attracts its endpoints with magnitude d²/k,
// - a node's summed displacement is clamped to the current temperature,
//   which starts at 0.1 and drops by 0.1 / (iterations + 1) per iteration.
//
// Two nodes joined by an edge settle at distance k, where the two forces
// balance. Cost is O(n² + e) per iteration; the chord graphs this runs on have
// at most a few hundred nodes.
//
// The run is deterministic for a given seed. A `CancelToken` is polled once
// per iteration so a caller on another thread (or a deadline) can stop a long
// run; a cancelled run returns an error rather than a half-annealed layout.

use crate::config::LayoutSettings;
use crate::error::LayoutError;
use crate::graph::{Graph, NodeId};
use edo_graphs_prng::LayoutRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;

/// Starting temperature: the largest distance a node may move in one
/// iteration.
pub const INITIAL_TEMPERATURE: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutParams {
    pub dimensions: usize,
    pub iterations: u32,
    /// Ideal edge length. `None` uses `ideal_length(node_count, dimensions)`.
    pub ideal_length: Option<f64>,
    pub seed: u64,
}

impl LayoutParams {
    /// Parameters from the settings file, with the default ideal length.
    pub fn new(settings: LayoutSettings, seed: u64) -> Self {
        LayoutParams {
            dimensions: settings.dimensions,
            iterations: settings.iterations,
            ideal_length: None,
            seed,
        }
    }
}

/// Shared stop flag with an optional deadline. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that reports cancelled once `timeout` has elapsed.
    pub fn with_timeout(timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => Self::with_deadline(deadline),
            None => Self::new(),
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        CancelToken {
            flag: Arc::default(),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed) || self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// Final node positions, indexed by `NodeId`.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub dimensions: usize,
    pub positions: Vec<Vec<f64>>,
}

impl Layout {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn distance(&self, a: NodeId, b: NodeId) -> f64 {
        let mut delta = vec![0.0; self.dimensions];
        difference_into(&mut delta, &self.positions[a.index()], &self.positions[b.index()])
    }
}

/// Default ideal edge length: the side of the cell each node would get if
/// `node_count` nodes tiled the unit hypercube.
pub fn ideal_length(node_count: usize, dimensions: usize) -> f64 {
    1.0 / (node_count as f64).powf(1.0 / dimensions as f64)
}

/// Lay out `graph`. Positions come back in node-id order.
pub fn run(
    graph: &Graph,
    params: &LayoutParams,
    cancel: &CancelToken,
) -> Result<Layout, LayoutError> {
    let dims = params.dimensions;
    if dims == 0 {
        return Err(LayoutError::ZeroDimensions);
    }
    let n = graph.node_count();
    let mut rng = LayoutRng::new(params.seed);
    let mut positions: Vec<Vec<f64>> = (0..n).map(|_| rng.unit_point(dims)).collect();
    if n == 0 {
        return Ok(Layout { dimensions: dims, positions });
    }

    let k = params.ideal_length.unwrap_or_else(|| ideal_length(n, dims));
    let k_squared = k * k;
    let cooling = INITIAL_TEMPERATURE / (f64::from(params.iterations) + 1.0);
    let mut temperature = INITIAL_TEMPERATURE;
    debug!(
        nodes = n,
        edges = graph.edge_count(),
        dims,
        k,
        iterations = params.iterations,
        "starting layout"
    );

    let mut displacement = vec![vec![0.0; dims]; n];
    let mut delta = vec![0.0; dims];
    for completed in 0..params.iterations {
        if cancel.is_cancelled() {
            return Err(LayoutError::Cancelled { completed });
        }
        for d in &mut displacement {
            d.fill(0.0);
        }

        for i in 0..n {
            for j in (i + 1)..n {
                let distance = difference_into(&mut delta, &positions[i], &positions[j]);
                if distance == 0.0 {
                    continue;
                }
                // Unit vector times k²/d, i.e. delta scaled by k²/d².
                let scale = k_squared / (distance * distance);
                for (axis, component) in delta.iter().enumerate() {
                    displacement[i][axis] += component * scale;
                    displacement[j][axis] -= component * scale;
                }
            }
        }

        for edge in graph.edges() {
            let (a, b) = (edge.from.index(), edge.to.index());
            let distance = difference_into(&mut delta, &positions[a], &positions[b]);
            if distance == 0.0 {
                continue;
            }
            // Unit vector times d²/k.
            let scale = distance / k;
            for (axis, component) in delta.iter().enumerate() {
                displacement[a][axis] -= component * scale;
                displacement[b][axis] += component * scale;
            }
        }

        for (position, step) in positions.iter_mut().zip(&displacement) {
            let length = norm(step);
            if length == 0.0 {
                continue;
            }
            let limit = length.min(temperature) / length;
            for (p, s) in position.iter_mut().zip(step) {
                *p += s * limit;
            }
        }
        temperature -= cooling;
    }

    Ok(Layout { dimensions: dims, positions })
}

/// Write `a - b` into `out` and return its length.
fn difference_into(out: &mut [f64], a: &[f64], b: &[f64]) -> f64 {
    for ((o, x), y) in out.iter_mut().zip(a).zip(b) {
        *o = x - y;
    }
    norm(out)
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair_graph() -> Graph {
        let mut graph = Graph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        graph.add_edge(a, b);
        graph
    }

    fn params(dimensions: usize, iterations: u32, seed: u64) -> LayoutParams {
        LayoutParams {
            dimensions,
            iterations,
            ideal_length: None,
            seed,
        }
    }

    #[test]
    fn two_connected_nodes_settle_at_ideal_length() {
        let mut p = params(3, 2000, 7);
        p.ideal_length = Some(0.25);
        let layout = run(&pair_graph(), &p, &CancelToken::new()).unwrap();
        let d = layout.distance(NodeId(0), NodeId(1));
        assert!((d - 0.25).abs() < 1e-3, "distance {d}");
    }

    #[test]
    fn default_ideal_length_is_used() {
        let layout = run(&pair_graph(), &params(2, 2000, 3), &CancelToken::new()).unwrap();
        let k = ideal_length(2, 2);
        let d = layout.distance(NodeId(0), NodeId(1));
        assert!((d - k).abs() < 1e-3, "distance {d}, k {k}");
    }

    #[test]
    fn same_seed_same_layout() {
        let mut graph = pair_graph();
        let c = graph.add_node("c");
        graph.add_edge(NodeId(1), c);
        let first = run(&graph, &params(4, 50, 99), &CancelToken::new()).unwrap();
        let second = run(&graph, &params(4, 50, 99), &CancelToken::new()).unwrap();
        let other = run(&graph, &params(4, 50, 100), &CancelToken::new()).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(first.dimensions, 4);
        assert!(first.positions.iter().all(|p| p.len() == 4));
    }

    #[test]
    fn zero_iterations_keeps_initial_positions() {
        let mut graph = Graph::new();
        for label in ["a", "b", "c", "d", "e"] {
            graph.add_node(label);
        }
        let layout = run(&graph, &params(3, 0, 1), &CancelToken::new()).unwrap();
        assert_eq!(layout.len(), 5);
        for p in &layout.positions {
            assert!(p.iter().all(|x| (0.0..1.0).contains(x)));
        }
    }

    #[test]
    fn unconnected_nodes_spread_apart() {
        let mut graph = Graph::new();
        graph.add_node("a");
        graph.add_node("b");
        let before = run(&graph, &params(2, 0, 5), &CancelToken::new()).unwrap();
        let after = run(&graph, &params(2, 100, 5), &CancelToken::new()).unwrap();
        assert!(after.distance(NodeId(0), NodeId(1)) > before.distance(NodeId(0), NodeId(1)));
    }

    #[test]
    fn empty_graph_gives_empty_layout() {
        let layout = run(&Graph::new(), &params(3, 10, 0), &CancelToken::new()).unwrap();
        assert!(layout.is_empty());
    }

    #[test]
    fn zero_dimensions_is_an_error() {
        let err = run(&pair_graph(), &params(0, 10, 0), &CancelToken::new()).unwrap_err();
        assert_eq!(err, LayoutError::ZeroDimensions);
    }

    #[test]
    fn cancelled_token_stops_before_first_iteration() {
        let token = CancelToken::new();
        token.clone().cancel();
        let err = run(&pair_graph(), &params(3, 10, 0), &token).unwrap_err();
        assert_eq!(err, LayoutError::Cancelled { completed: 0 });
    }

    #[test]
    fn expired_deadline_cancels() {
        let token = CancelToken::with_deadline(Instant::now());
        assert!(token.is_cancelled());
        assert!(run(&pair_graph(), &params(3, 10, 0), &token).is_err());
        assert!(!CancelToken::with_timeout(Duration::from_secs(3600)).is_cancelled());
    }
}
