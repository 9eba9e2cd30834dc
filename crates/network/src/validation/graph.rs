//! Per-mode graph analyses: dead-ends, sources and connectivity.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use pathfinding::directed::strongly_connected_components::strongly_connected_components;
use pathfinding::undirected::connected_components::connected_components;
use serde::Serialize;

use crate::graph::Graph;
use crate::identifiers::NodeId;

/// Findings for the subgraph of links permitting one mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ModeReport {
    pub mode: String,
    pub node_count: usize,
    pub link_count: usize,
    /// Nodes with inbound but no outbound links.
    pub dead_ends: BTreeSet<NodeId>,
    /// Nodes with outbound but no inbound links.
    pub sources: BTreeSet<NodeId>,
    /// Weakly-connected components, largest first.
    pub components: Vec<BTreeSet<NodeId>>,
    pub strongly_connected_components: usize,
}

impl ModeReport {
    pub fn is_healthy(&self) -> bool {
        self.dead_ends.is_empty() && self.sources.is_empty() && self.components.len() <= 1
    }
}

impl fmt::Display for ModeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "mode {}: {} nodes, {} links, {} weak / {} strong components",
            self.mode,
            self.node_count,
            self.link_count,
            self.components.len(),
            self.strongly_connected_components
        )?;
        if !self.dead_ends.is_empty() {
            writeln!(f, "  dead-ends: {}", join(&self.dead_ends))?;
        }
        if !self.sources.is_empty() {
            writeln!(f, "  sources: {}", join(&self.sources))?;
        }
        Ok(())
    }
}

fn join(ids: &BTreeSet<NodeId>) -> String {
    ids.iter().map(NodeId::as_str).collect::<Vec<_>>().join(", ")
}

/// Adjacency of the links permitting `mode`.
struct ModalSubgraph {
    successors: BTreeMap<NodeId, BTreeSet<NodeId>>,
    predecessors: BTreeMap<NodeId, BTreeSet<NodeId>>,
    nodes: BTreeSet<NodeId>,
    link_count: usize,
}

impl ModalSubgraph {
    fn build(graph: &Graph, mode: &str) -> Self {
        let mut subgraph = Self {
            successors: BTreeMap::new(),
            predecessors: BTreeMap::new(),
            nodes: BTreeSet::new(),
            link_count: 0,
        };
        for link in graph.links_with_mode(mode) {
            subgraph
                .successors
                .entry(link.from.clone())
                .or_default()
                .insert(link.to.clone());
            subgraph
                .predecessors
                .entry(link.to.clone())
                .or_default()
                .insert(link.from.clone());
            subgraph.nodes.insert(link.from.clone());
            subgraph.nodes.insert(link.to.clone());
            subgraph.link_count += 1;
        }
        subgraph
    }

    fn successors(&self, node: &NodeId) -> Vec<NodeId> {
        self.successors
            .get(node)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn neighbours(&self, node: &NodeId) -> Vec<NodeId> {
        let forward = self.successors.get(node).into_iter().flatten();
        let backward = self.predecessors.get(node).into_iter().flatten();
        forward.chain(backward).cloned().collect()
    }
}

/// Analyse the subgraph of `mode`, ignoring dead-ends and sources among
/// `boundary`.
pub fn analyse_mode(graph: &Graph, mode: &str, boundary: &BTreeSet<NodeId>) -> ModeReport {
    let subgraph = ModalSubgraph::build(graph, mode);

    let mut dead_ends = BTreeSet::new();
    let mut sources = BTreeSet::new();
    for node in subgraph.nodes.difference(boundary) {
        let has_out = subgraph.successors.contains_key(node);
        let has_in = subgraph.predecessors.contains_key(node);
        match (has_in, has_out) {
            (true, false) => {
                dead_ends.insert(node.clone());
            }
            (false, true) => {
                sources.insert(node.clone());
            }
            _ => {}
        }
    }

    let starts: Vec<NodeId> = subgraph.nodes.iter().cloned().collect();
    let mut components: Vec<BTreeSet<NodeId>> =
        connected_components(&starts, |n| subgraph.neighbours(n))
            .into_iter()
            .map(|c| c.into_iter().collect())
            .collect();
    components.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let strongly_connected_components =
        strongly_connected_components(&starts, |n| subgraph.successors(n)).len();

    ModeReport {
        mode: mode.to_owned(),
        node_count: subgraph.nodes.len(),
        link_count: subgraph.link_count,
        dead_ends,
        sources,
        components,
        strongly_connected_components,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Link, Node};

    fn line() -> Graph {
        let mut graph = Graph::new();
        for (id, x) in [("a", 0.0), ("b", 1.0), ("c", 2.0)] {
            graph.insert_node(Node::new(id, x, 0.0));
        }
        graph.insert_link(Link::new("ab", "a", "b").with_modes(["car"]));
        graph.insert_link(Link::new("bc", "b", "c").with_modes(["car"]));
        graph
    }

    #[test]
    fn test_line_has_source_and_dead_end() {
        let report = analyse_mode(&line(), "car", &BTreeSet::new());
        assert_eq!(report.sources, BTreeSet::from([NodeId::new("a")]));
        assert_eq!(report.dead_ends, BTreeSet::from([NodeId::new("c")]));
        assert_eq!(report.components.len(), 1);
        assert_eq!(report.strongly_connected_components, 3);
        assert!(!report.is_healthy());
    }

    #[test]
    fn test_boundary_nodes_are_excluded() {
        let boundary = BTreeSet::from([NodeId::new("a"), NodeId::new("c")]);
        let report = analyse_mode(&line(), "car", &boundary);
        assert!(report.sources.is_empty());
        assert!(report.dead_ends.is_empty());
    }

    #[test]
    fn test_other_modes_form_separate_subgraphs() {
        let mut graph = line();
        graph.insert_node(Node::new("d", 5.0, 0.0));
        graph.insert_link(Link::new("cd", "c", "d").with_modes(["rail"]));
        graph.insert_link(Link::new("dc", "d", "c").with_modes(["rail"]));

        let rail = analyse_mode(&graph, "rail", &BTreeSet::new());
        assert!(rail.is_healthy());
        assert_eq!(rail.node_count, 2);

        let walk = analyse_mode(&graph, "walk", &BTreeSet::new());
        assert_eq!(walk.node_count, 0);
        assert!(walk.components.is_empty());
    }

    #[test]
    fn test_disjoint_components_sorted_by_size() {
        let mut graph = line();
        graph.insert_node(Node::new("x", 9.0, 9.0));
        graph.insert_node(Node::new("y", 9.0, 8.0));
        graph.insert_link(Link::new("xy", "x", "y").with_modes(["car"]));

        let report = analyse_mode(&graph, "car", &BTreeSet::new());
        assert_eq!(report.components.len(), 2);
        assert_eq!(report.components[0].len(), 3);
        assert_eq!(report.components[1].len(), 2);
    }
}
