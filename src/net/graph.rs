//! Export of a net's structure as a petgraph graph.

use super::Net;
use crate::{
    Symbol,
    node::{Arc, Node, NodeKind},
};
use petgraph::{Direction, graph::NodeIndex, stable_graph::StableGraph};
use std::{collections::HashMap, fmt};

/// A node of the exported graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub kind: NodeKind,
    pub name: Symbol,
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.name)
    }
}

/// The bipartite graph of a net, with arcs as edges.
pub type NetGraph = StableGraph<GraphNode, Arc>;

impl Net {
    /// Build the bipartite graph of places, transitions and arcs.
    ///
    /// Every arc is recorded on both of its endpoints; the graph is built from
    /// the transitions' side so each arc yields exactly one edge.
    pub fn to_graph(&self) -> NetGraph {
        let mut graph = NetGraph::new();
        let index: HashMap<Symbol, NodeIndex> = self
            .nodes()
            .map(|node| {
                let idx = graph.add_node(GraphNode {
                    kind: node.kind(),
                    name: node.name().clone(),
                });
                (node.name().clone(), idx)
            })
            .collect();

        for t in self.transitions() {
            let ti = index[t.name()];
            for (p, arc) in t.incoming() {
                graph.add_edge(index[p], ti, arc.clone());
            }
            for (p, arc) in t.outgoing() {
                graph.add_edge(ti, index[p], arc.clone());
            }
        }
        graph
    }

    /// Names of nodes without any arc, places first.
    pub fn isolated_nodes(&self) -> Vec<Symbol> {
        let graph = self.to_graph();
        graph
            .node_indices()
            .filter(|&idx| {
                graph.neighbors_directed(idx, Direction::Incoming).next().is_none()
                    && graph.neighbors_directed(idx, Direction::Outgoing).next().is_none()
            })
            .map(|idx| graph[idx].name.clone())
            .collect()
    }
}
