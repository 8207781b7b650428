//! Lineage graph
//!
//! Directed graph over entity GUIDs where every edge is labelled with the
//! process that connects its endpoints. Built once from the relations of a
//! lineage response and read-only afterwards.
//!
//! Edge order matters: neighbours are always reported in the order their
//! relations were added, which keeps traversal results deterministic.

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

use super::LineageRelation;
use crate::error::{AtlanError, Result};

/// One hop in lineage: `target_id` is reached by passing through `through_id`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectedEdge {
    pub through_id: String,
    pub target_id: String,
}

/// In-memory lineage graph keyed by entity GUID
#[derive(Debug, Clone, Default)]
pub struct LineageGraph {
    /// Edge weight is the connecting process GUID
    graph: DiGraph<String, String>,

    /// GUID -> node index
    node_indices: HashMap<String, NodeIndex>,
}

impl LineageGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a full set of relations
    ///
    /// Fails without building anything if any relation lacks a process.
    pub fn build<'a, I>(relations: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a LineageRelation>,
        I::IntoIter: Clone,
    {
        let relations = relations.into_iter();
        if let Some(bad) = relations.clone().find(|r| !r.is_full_link()) {
            return Err(partial_link_error(bad));
        }

        let mut graph = Self::new();
        for relation in relations {
            graph.add_relation(relation)?;
        }
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built lineage graph"
        );
        Ok(graph)
    }

    /// Add one relation as a downstream edge from its source and the mirrored
    /// upstream edge into its target. Re-adding the same process between the
    /// same endpoints is a no-op.
    pub fn add_relation(&mut self, relation: &LineageRelation) -> Result<()> {
        let process = relation
            .process_id
            .as_ref()
            .ok_or_else(|| partial_link_error(relation))?;

        let from = self.node(&relation.from_entity_id);
        let to = self.node(&relation.to_entity_id);

        let exists = self
            .graph
            .edges_connecting(from, to)
            .any(|e| e.weight() == process);
        if !exists {
            self.graph.add_edge(from, to, process.clone());
        }
        Ok(())
    }

    fn node(&mut self, guid: &str) -> NodeIndex {
        if let Some(&idx) = self.node_indices.get(guid) {
            return idx;
        }
        let idx = self.graph.add_node(guid.to_string());
        self.node_indices.insert(guid.to_string(), idx);
        idx
    }

    /// Edges leaving (downstream) or entering (upstream) a node, in insertion order.
    /// Yields `(through, target)` pairs where `target` is the far endpoint.
    fn hops(&self, guid: &str, direction: Direction) -> Vec<(&str, &str)> {
        let Some(&idx) = self.node_indices.get(guid) else {
            return Vec::new();
        };

        let mut edges: Vec<(EdgeIndex, &str, &str)> = self
            .graph
            .edges_directed(idx, direction)
            .map(|e| {
                let far = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (e.id(), e.weight().as_str(), self.graph[far].as_str())
            })
            .collect();
        // petgraph walks adjacency lists newest-first
        edges.sort_by_key(|(id, _, _)| *id);
        edges.into_iter().map(|(_, through, target)| (through, target)).collect()
    }

    fn distinct<'a>(items: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        items.filter(|i| seen.insert(*i)).collect()
    }

    // ========== Immediate neighbours ==========

    pub fn downstream_edges(&self, guid: &str) -> Vec<DirectedEdge> {
        to_edges(self.hops(guid, Direction::Outgoing))
    }

    pub fn upstream_edges(&self, guid: &str) -> Vec<DirectedEdge> {
        to_edges(self.hops(guid, Direction::Incoming))
    }

    /// Entities directly downstream of `guid`
    pub fn downstream_entity_ids(&self, guid: &str) -> Vec<&str> {
        Self::distinct(self.hops(guid, Direction::Outgoing).into_iter().map(|(_, t)| t))
    }

    /// Processes that `guid` feeds directly
    pub fn downstream_process_ids(&self, guid: &str) -> Vec<&str> {
        Self::distinct(self.hops(guid, Direction::Outgoing).into_iter().map(|(p, _)| p))
    }

    /// Entities directly upstream of `guid`
    pub fn upstream_entity_ids(&self, guid: &str) -> Vec<&str> {
        Self::distinct(self.hops(guid, Direction::Incoming).into_iter().map(|(_, t)| t))
    }

    /// Processes that feed `guid` directly
    pub fn upstream_process_ids(&self, guid: &str) -> Vec<&str> {
        Self::distinct(self.hops(guid, Direction::Incoming).into_iter().map(|(p, _)| p))
    }

    // ========== Deep traversal ==========

    /// Every entity reachable downstream of `guid`, including `guid` itself
    pub fn all_downstream_entity_ids_dfs(&self, guid: &str) -> Vec<String> {
        self.dfs(guid, Direction::Outgoing)
    }

    /// Every entity reachable upstream of `guid`, including `guid` itself
    pub fn all_upstream_entity_ids_dfs(&self, guid: &str) -> Vec<String> {
        self.dfs(guid, Direction::Incoming)
    }

    /// Iterative DFS with an explicit stack. A node is recorded when popped, and
    /// its unvisited neighbours are pushed in edge order, so the most recently
    /// added neighbour is explored first.
    fn dfs(&self, start: &str, direction: Direction) -> Vec<String> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![start.to_string()];

        while let Some(current) = stack.pop() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for (_, next) in self.hops(&current, direction) {
                if !visited.contains(next) {
                    stack.push(next.to_string());
                }
            }
            order.push(current);
        }

        order
    }

    // ========== Stats ==========

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, guid: &str) -> bool {
        self.node_indices.contains_key(guid)
    }

    /// Lineage may legitimately loop back on itself
    pub fn has_cycles(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    /// Export to GraphViz DOT, edges labelled by process GUID
    pub fn to_dot(&self) -> String {
        let mut output = String::new();
        output.push_str("digraph Lineage {\n");
        output.push_str("  rankdir=LR;\n");
        output.push_str("  node [shape=box, style=rounded, fontname=\"Helvetica\", fontsize=10];\n");
        output.push_str("  edge [fontname=\"Helvetica\", fontsize=8];\n\n");

        for idx in self.graph.node_indices() {
            output.push_str(&format!("  \"{}\";\n", self.graph[idx]));
        }
        output.push('\n');

        for edge in self.graph.edge_references() {
            output.push_str(&format!(
                "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
                self.graph[edge.source()],
                self.graph[edge.target()],
                edge.weight()
            ));
        }

        output.push_str("}\n");
        output
    }
}

fn to_edges(hops: Vec<(&str, &str)>) -> Vec<DirectedEdge> {
    hops.into_iter()
        .map(|(through, target)| DirectedEdge {
            through_id: through.to_string(),
            target_id: target.to_string(),
        })
        .collect()
}

fn partial_link_error(relation: &LineageRelation) -> AtlanError {
    AtlanError::GraphPrecondition(format!(
        "relation {} -> {} has no process; request lineage with hideProcess=true to traverse it as a graph",
        relation.from_entity_id, relation.to_entity_id
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(from: &str, to: &str, process: &str) -> LineageRelation {
        LineageRelation::through_process(from, to, process)
    }

    fn graph(relations: &[LineageRelation]) -> LineageGraph {
        LineageGraph::build(relations).unwrap()
    }

    #[test]
    fn test_empty_graph() {
        let g = LineageGraph::new();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.downstream_entity_ids("missing").is_empty());
        assert!(g.upstream_process_ids("missing").is_empty());
    }

    #[test]
    fn test_edges_are_symmetric() {
        let relations = vec![rel("a", "b", "p1"), rel("b", "c", "p2"), rel("a", "c", "p3")];
        let g = graph(&relations);
        for r in &relations {
            assert!(g.downstream_entity_ids(&r.from_entity_id).contains(&r.to_entity_id.as_str()));
            assert!(g.upstream_entity_ids(&r.to_entity_id).contains(&r.from_entity_id.as_str()));
        }
    }

    #[test]
    fn test_duplicate_relation_collapses() {
        let g = graph(&[rel("a", "b", "p1"), rel("a", "b", "p1")]);
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.downstream_edges("a").len(), 1);
    }

    #[test]
    fn test_distinct_processes_between_same_pair() {
        let g = graph(&[rel("a", "b", "p1"), rel("a", "b", "p2")]);
        assert_eq!(g.edge_count(), 2);
        assert_eq!(g.downstream_entity_ids("a"), vec!["b"]);
        assert_eq!(g.downstream_process_ids("a"), vec!["p1", "p2"]);
        assert_eq!(g.upstream_process_ids("b"), vec!["p1", "p2"]);
    }

    #[test]
    fn test_neighbours_in_insertion_order() {
        let g = graph(&[rel("a", "x", "p1"), rel("a", "y", "p2"), rel("a", "z", "p3")]);
        assert_eq!(g.downstream_entity_ids("a"), vec!["x", "y", "z"]);
        assert_eq!(
            g.downstream_edges("a")[1],
            DirectedEdge { through_id: "p2".into(), target_id: "y".into() }
        );
    }

    #[test]
    fn test_dfs_explores_last_neighbour_first() {
        // a -> b -> d, a -> c
        let g = graph(&[rel("a", "b", "p1"), rel("a", "c", "p2"), rel("b", "d", "p3")]);
        assert_eq!(g.all_downstream_entity_ids_dfs("a"), vec!["a", "c", "b", "d"]);
        assert_eq!(g.all_upstream_entity_ids_dfs("d"), vec!["d", "b", "a"]);
    }

    #[test]
    fn test_dfs_includes_start_even_when_unknown() {
        let g = graph(&[rel("a", "b", "p1")]);
        assert_eq!(g.all_downstream_entity_ids_dfs("zzz"), vec!["zzz"]);
        assert_eq!(g.all_downstream_entity_ids_dfs("b"), vec!["b"]);
    }

    #[test]
    fn test_dfs_terminates_on_cycle() {
        let g = graph(&[rel("a", "b", "p1"), rel("b", "c", "p2"), rel("c", "a", "p3")]);
        assert!(g.has_cycles());
        let all = g.all_downstream_entity_ids_dfs("a");
        assert_eq!(all, vec!["a", "b", "c"]);
        let up = g.all_upstream_entity_ids_dfs("a");
        assert_eq!(up, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_deep_chain_does_not_recurse() {
        let relations: Vec<_> = (0..20_000)
            .map(|i| rel(&format!("n{}", i), &format!("n{}", i + 1), &format!("p{}", i)))
            .collect();
        let g = graph(&relations);
        assert_eq!(g.all_downstream_entity_ids_dfs("n0").len(), 20_001);
    }

    #[test]
    fn test_build_rejects_partial_links() {
        let relations = vec![
            rel("a", "b", "p1"),
            LineageRelation::through_relationship("b", "c", "r1"),
        ];
        let err = LineageGraph::build(&relations).unwrap_err();
        assert!(matches!(err, AtlanError::GraphPrecondition(_)));
    }

    #[test]
    fn test_dot_export() {
        let g = graph(&[rel("a", "b", "p1")]);
        let dot = g.to_dot();
        assert!(dot.starts_with("digraph Lineage {"));
        assert!(dot.contains("\"a\" -> \"b\" [label=\"p1\"]"));
    }
}
