//! Reachability graph over normalized types.
//!
//! Nodes are keyed by `Ty` equality. A type that is already a node, or already
//! queued, is never expanded again, so walking a cyclic schema terminates.
use std::collections::{HashSet, VecDeque};

use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::{debug, warn};

use crate::descriptor::Descriptor;
use crate::error::SchemaError;
use crate::ir::Ty;
use crate::normalize::{dependencies, normalize};
use crate::scope::Scope;

#[derive(Debug, Clone, Default)]
pub struct Graph {
    roots: Vec<Ty>,
    /// Node type → direct dependencies in slot order. Insertion order is discovery order.
    nodes: IndexMap<Ty, Vec<Ty>>,
}

/// Walk every type reachable from `root`.
pub fn build_graph(root: &Descriptor, scope: &Scope) -> Result<Graph, SchemaError> {
    let root = normalize(root, scope)?;

    let mut nodes: IndexMap<Ty, Vec<Ty>> = IndexMap::new();
    let mut pending: VecDeque<Ty> = VecDeque::from([root.clone()]);
    let mut queued: HashSet<Ty> = HashSet::from([root.clone()]);

    while let Some(ty) = pending.pop_front() {
        let deps = dependencies(&ty, scope)?;
        for dep in &deps {
            if !nodes.contains_key(dep) && queued.insert(dep.clone()) {
                pending.push_back(dep.clone());
            }
        }
        debug!(node = %ty, deps = deps.len(), "graph node");
        nodes.insert(ty, deps);
    }

    debug!(root = %root, nodes = nodes.len(), "graph built");
    Ok(Graph { roots: vec![root], nodes })
}

impl Graph {
    /// Union of several graphs. The first node seen for a type wins.
    pub fn merge<I>(graphs: I) -> Graph
    where
        I: IntoIterator<Item = Graph>,
    {
        let mut out = Graph::default();
        for graph in graphs {
            for root in graph.roots {
                if !out.roots.contains(&root) {
                    out.roots.push(root);
                }
            }
            for (ty, deps) in graph.nodes {
                match out.nodes.entry(ty) {
                    Entry::Vacant(slot) => {
                        slot.insert(deps);
                    }
                    Entry::Occupied(kept) => {
                        if kept.get() != &deps {
                            warn!(node = %kept.key(), "conflicting dependency lists while merging graphs; keeping the first");
                        }
                    }
                }
            }
        }
        out
    }

    pub fn roots(&self) -> &[Ty] { &self.roots }

    pub fn nodes(&self) -> impl Iterator<Item = (&Ty, &[Ty])> {
        self.nodes.iter().map(|(ty, deps)| (ty, deps.as_slice()))
    }

    pub fn get(&self, ty: &Ty) -> Option<&[Ty]> {
        self.nodes.get(ty).map(Vec::as_slice)
    }

    #[cfg(test)]
    pub(crate) fn insert_node(&mut self, ty: Ty, deps: Vec<Ty>) {
        self.nodes.insert(ty, deps);
    }

    pub fn contains(&self, ty: &Ty) -> bool { self.nodes.contains_key(ty) }
    pub fn len(&self) -> usize { self.nodes.len() }
    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }
}
