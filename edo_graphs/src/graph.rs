// Labeled chord graph.
//
// The graph is an arena: nodes live in a `Vec` indexed by `NodeId`, edges in
// a second `Vec`, and a label index maps symbol text back to ids. Each node
// keeps an undirected neighbor list so component searches never scan the edge
// list. Ids are assigned in insertion order, which is also the vertex order of
// the graph file (`graph_file.rs`) and the position order of a layout
// (`layout.rs`).
//
// Edges are directed and unique; a self-loop is stored as an edge but adds no
// neighbor entry.

use crate::transform::TransformationGraph;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Compact identifier for a graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub label: String,
    /// Nodes joined to this one by an edge in either direction.
    neighbors: Vec<NodeId>,
}

/// A directed transformation edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub from: NodeId,
    pub to: NodeId,
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: FxHashMap<String, NodeId>,
    edge_set: FxHashSet<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arena form of the builder's output. Node ids follow label order.
    pub fn from_transformations(transformations: &TransformationGraph) -> Self {
        let mut graph = Graph::new();
        for label in &transformations.labels {
            graph.add_node(label);
        }
        for (source, target) in &transformations.edges {
            let from = graph.add_node(source);
            let to = graph.add_node(target);
            graph.add_edge(from, to);
        }
        graph
    }

    /// Add a node, or return the id of the node that already has this label.
    pub fn add_node(&mut self, label: &str) -> NodeId {
        if let Some(&id) = self.index.get(label) {
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            label: label.to_string(),
            neighbors: Vec::new(),
        });
        self.index.insert(label.to_string(), id);
        id
    }

    /// Add a directed edge. Returns `false` if it was already present.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> bool {
        let edge = Edge { from, to };
        if !self.edge_set.insert(edge) {
            return false;
        }
        self.edges.push(edge);
        if from != to {
            self.nodes[from.index()].neighbors.push(to);
            self.nodes[to.index()].neighbors.push(from);
        }
        true
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn label(&self, id: NodeId) -> &str {
        &self.nodes[id.index()].label
    }

    pub fn find(&self, label: &str) -> Option<NodeId> {
        self.index.get(label).copied()
    }

    /// Nodes adjacent to `id`, ignoring edge direction.
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].neighbors
    }

    /// Connected components (edges taken as undirected), each sorted by id,
    /// ordered by their smallest id.
    pub fn connected_components(&self) -> Vec<Vec<NodeId>> {
        let mut seen = vec![false; self.nodes.len()];
        let mut components = Vec::new();
        for start in &self.nodes {
            if seen[start.id.index()] {
                continue;
            }
            seen[start.id.index()] = true;
            let mut component = vec![start.id];
            let mut queue = VecDeque::from([start.id]);
            while let Some(current) = queue.pop_front() {
                for &next in self.neighbors(current) {
                    if !seen[next.index()] {
                        seen[next.index()] = true;
                        component.push(next);
                        queue.push_back(next);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }

    /// A copy holding only components with at least `min_nodes` nodes. Kept
    /// nodes and edges stay in their original relative order.
    pub fn retain_components(&self, min_nodes: usize) -> Graph {
        let mut keep = vec![false; self.nodes.len()];
        for component in self.connected_components() {
            if component.len() >= min_nodes {
                for id in component {
                    keep[id.index()] = true;
                }
            }
        }
        self.induced(&keep)
    }

    /// The subgraph on `ids` with every edge between them, renumbered from 0
    /// in original node order.
    pub fn subgraph(&self, ids: &[NodeId]) -> Graph {
        let mut keep = vec![false; self.nodes.len()];
        for id in ids {
            keep[id.index()] = true;
        }
        self.induced(&keep)
    }

    fn induced(&self, keep: &[bool]) -> Graph {
        let mut kept = Graph::new();
        let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        for node in &self.nodes {
            if keep[node.id.index()] {
                remap[node.id.index()] = Some(kept.add_node(&node.label));
            }
        }
        for edge in &self.edges {
            if let (Some(from), Some(to)) = (remap[edge.from.index()], remap[edge.to.index()]) {
                kept.add_edge(from, to);
            }
        }
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph(labels: &[&str]) -> Graph {
        let mut graph = Graph::new();
        let ids: Vec<NodeId> = labels.iter().map(|l| graph.add_node(l)).collect();
        for pair in ids.windows(2) {
            graph.add_edge(pair[0], pair[1]);
        }
        graph
    }

    #[test]
    fn add_node_deduplicates_labels() {
        let mut graph = Graph::new();
        let a = graph.add_node("324");
        let b = graph.add_node("234");
        assert_eq!(graph.add_node("324"), a);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.find("234"), Some(b));
        assert_eq!(graph.find("333"), None);
        assert_eq!(graph.label(b), "234");
    }

    #[test]
    fn add_edge_deduplicates_and_links_both_ways() {
        let mut graph = Graph::new();
        let a = graph.add_node("a");
        let b = graph.add_node("b");
        assert!(graph.add_edge(a, b));
        assert!(!graph.add_edge(a, b));
        assert!(graph.add_edge(b, a));
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.neighbors(a).contains(&b));
        assert!(graph.neighbors(b).contains(&a));
    }

    #[test]
    fn self_loops_are_edges_without_neighbors() {
        let mut graph = Graph::new();
        let a = graph.add_node("a");
        assert!(graph.add_edge(a, a));
        assert_eq!(graph.edge_count(), 1);
        assert!(graph.neighbors(a).is_empty());
    }

    #[test]
    fn components_ignore_direction() {
        let mut graph = path_graph(&["a", "b", "c"]);
        let d = graph.add_node("d");
        let e = graph.add_node("e");
        graph.add_edge(e, d);
        graph.add_node("f");
        let components = graph.connected_components();
        assert_eq!(components.len(), 3);
        assert_eq!(components[0], vec![NodeId(0), NodeId(1), NodeId(2)]);
        assert_eq!(components[1], vec![d, e]);
        assert_eq!(components[2], vec![NodeId(5)]);
    }

    #[test]
    fn retain_drops_small_components() {
        let mut graph = path_graph(&["a", "b"]);
        let c = graph.add_node("c");
        let d = graph.add_node("d");
        let e = graph.add_node("e");
        graph.add_edge(c, d);
        graph.add_edge(d, e);
        graph.add_edge(e, c);

        let kept = graph.retain_components(3);
        assert_eq!(kept.node_count(), 3);
        assert_eq!(kept.edge_count(), 3);
        assert_eq!(kept.label(NodeId(0)), "c");
        assert!(kept.find("a").is_none());
        let from_c = kept.edges()[0];
        assert_eq!(kept.label(from_c.from), "c");
        assert_eq!(kept.label(from_c.to), "d");
    }

    #[test]
    fn subgraph_keeps_internal_edges_only() {
        let mut graph = path_graph(&["a", "b", "c", "d"]);
        let (a, d) = (NodeId(0), NodeId(3));
        graph.add_edge(d, a);

        let sub = graph.subgraph(&[d, NodeId(2), NodeId(1)]);
        assert_eq!(sub.node_count(), 3);
        assert_eq!(sub.label(NodeId(0)), "b");
        assert_eq!(sub.label(NodeId(2)), "d");
        // b-c and c-d survive; a-b and d-a lose an endpoint.
        assert_eq!(sub.edge_count(), 2);
        assert_eq!(sub.connected_components().len(), 1);
    }

    #[test]
    fn retain_can_empty_the_graph() {
        let graph = path_graph(&["a", "b"]);
        assert_eq!(graph.retain_components(3).node_count(), 0);
    }

    #[test]
    fn from_transformations_orders_nodes_by_label() {
        let mut t = TransformationGraph::default();
        for (a, b) in [("b", "a"), ("c", "b")] {
            t.labels.insert(a.into());
            t.labels.insert(b.into());
            t.edges.insert((a.into(), b.into()));
        }
        let graph = Graph::from_transformations(&t);
        assert_eq!(graph.label(NodeId(0)), "a");
        assert_eq!(graph.label(NodeId(2)), "c");
        assert_eq!(graph.edge_count(), 2);
    }
}
