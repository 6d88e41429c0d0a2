//! Static call graph of user functions

use std::collections::HashMap;

use indexmap::{IndexMap, IndexSet};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{Dfs, EdgeRef};

use crate::ident::InfoId;
use crate::tree::NodeId;

/// Calls between user functions, and the variables each function refers to
#[derive(Debug, Default, Clone)]
pub struct CallGraph {
    /// Edges carry the call site
    graph: DiGraph<InfoId, NodeId>,
    nodes: HashMap<InfoId, NodeIndex>,
    references: IndexMap<InfoId, IndexSet<InfoId>>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn node(&mut self, function: InfoId) -> NodeIndex {
        let graph = &mut self.graph;
        *self
            .nodes
            .entry(function)
            .or_insert_with(|| graph.add_node(function))
    }

    /// Record a call from `caller` to `callee` at `site`
    pub fn add_call(&mut self, caller: InfoId, callee: InfoId, site: NodeId) {
        let a = self.node(caller);
        let b = self.node(callee);
        self.graph.add_edge(a, b, site);
    }

    /// Record that `function` refers to `variable`
    pub fn add_reference(&mut self, function: InfoId, variable: InfoId) {
        self.node(function);
        self.references
            .entry(function)
            .or_insert_with(IndexSet::new)
            .insert(variable);
    }

    /// Functions called directly by `function`
    pub fn callees(&self, function: InfoId) -> Vec<InfoId> {
        match self.nodes.get(&function) {
            Some(idx) => self
                .graph
                .neighbors(*idx)
                .map(|n| self.graph[n])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Functions reachable from `entry`, including itself
    pub fn reachable_from(&self, entry: InfoId) -> IndexSet<InfoId> {
        let mut result = IndexSet::new();
        result.insert(entry);

        if let Some(start) = self.nodes.get(&entry) {
            let mut dfs = Dfs::new(&self.graph, *start);
            while let Some(nx) = dfs.next(&self.graph) {
                result.insert(self.graph[nx]);
            }
        }

        result
    }

    /// Variables referred to by any of `functions`, in first-reference order
    pub fn referenced_by(&self, functions: &IndexSet<InfoId>) -> IndexSet<InfoId> {
        functions
            .iter()
            .filter_map(|f| self.references.get(f))
            .flat_map(|refs| refs.iter().copied())
            .collect()
    }

    /// Find a call that closes a cycle
    ///
    /// # Returns
    ///
    /// The calling function and the call site of one edge in a cycle, if the graph has one.
    pub fn recursion(&self) -> Option<(InfoId, NodeId)> {
        for component in tarjan_scc(&self.graph) {
            let members: IndexSet<NodeIndex> = component.iter().copied().collect();

            for member in &members {
                for edge in self.graph.edges(*member) {
                    let cyclic = if members.len() > 1 {
                        members.contains(&edge.target())
                    } else {
                        edge.target() == *member
                    };

                    if cyclic {
                        return Some((self.graph[*member], *edge.weight()));
                    }
                }
            }
        }

        None
    }
}
