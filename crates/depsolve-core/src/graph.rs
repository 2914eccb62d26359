//! The exact-pin graph and cycle detection over it.

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::catalog::{Catalog, UnitVersionId};

/// Directed graph with one node per registered unit and an edge from each
/// unit to the witness of every exact pin on one of its dependencies.
///
/// These are exactly the edges the exact closure follows, so the closure
/// terminates on every unit iff this graph is acyclic. Pins whose witness is
/// missing contribute no edge; they fail later, during propagation.
pub struct ExactPinGraph {
    graph: DiGraph<UnitVersionId, ()>,
    index: HashMap<UnitVersionId, NodeIndex>,
}

impl ExactPinGraph {
    pub fn build(catalog: &Catalog) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();
        for id in catalog.ids() {
            index.insert(id, graph.add_node(id));
        }
        for id in catalog.ids() {
            for pin in catalog.unit(id).pinned_dependencies() {
                if let Some(witness) = pin.satisfying_unit_version(catalog) {
                    let (from, to) = (index[&id], index[&witness]);
                    if !graph.edges(from).any(|e| e.target() == to) {
                        graph.add_edge(from, to, ());
                    }
                }
            }
        }
        Self { graph, index }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Units pinned directly by `id`.
    pub fn pins_of(&self, id: UnitVersionId) -> Vec<UnitVersionId> {
        let Some(&node) = self.index.get(&id) else {
            return Vec::new();
        };
        let mut pins: Vec<UnitVersionId> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| self.graph[e.target()])
            .collect();
        pins.sort();
        pins
    }

    /// The members of one cycle, smallest id first, with the first member
    /// repeated at the end; `None` when the graph is acyclic.
    pub fn find_cycle(&self) -> Option<Vec<UnitVersionId>> {
        let mut cycles: Vec<Vec<UnitVersionId>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || self.graph.edges(scc[0]).any(|e| e.target() == scc[0])
            })
            .map(|scc| self.walk_cycle(&scc))
            .collect();
        cycles.sort();
        cycles.into_iter().next()
    }

    /// Follow edges inside one strongly connected component from its smallest
    /// member until the walk returns to it.
    fn walk_cycle(&self, scc: &[NodeIndex]) -> Vec<UnitVersionId> {
        let start = scc
            .iter()
            .copied()
            .min_by_key(|&n| self.graph[n])
            .unwrap_or(scc[0]);
        let mut path = vec![self.graph[start]];
        let mut current = start;
        loop {
            let next = self
                .graph
                .edges(current)
                .map(|e| e.target())
                .filter(|t| scc.contains(t))
                .filter(|&t| t == start || !path.contains(&self.graph[t]))
                .min_by_key(|&t| (t != start, self.graph[t]));
            match next {
                Some(n) if n == start => {
                    path.push(self.graph[start]);
                    return path;
                }
                Some(n) => {
                    path.push(self.graph[n]);
                    current = n;
                }
                None => {
                    // Dead end inside the component; report the members.
                    let mut members: Vec<UnitVersionId> =
                        scc.iter().map(|&n| self.graph[n]).collect();
                    members.sort();
                    members.push(members[0]);
                    return members;
                }
            }
        }
    }
}
