use std::collections::{BTreeMap, BTreeSet};

use crate::error::{ComponentKind, GraphError, GraphResult};

/// Opaque node handle. Only meaningful relative to the [`Graph`] that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

/// Opaque edge handle. Only meaningful relative to the [`Graph`] that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub u64);

#[derive(Debug, Clone)]
pub(crate) struct Edge<E> {
    pub(crate) target: NodeId,
    pub(crate) value: Option<E>,
}

#[derive(Debug, Clone)]
pub(crate) struct Node<N, E> {
    pub(crate) value: Option<N>,
    /// Outgoing edges keyed by edge id. `BTreeMap` keeps the natural creation
    /// order since edge ids are handed out monotonically.
    pub(crate) outgoing: BTreeMap<EdgeId, Edge<E>>,
    pub(crate) incoming: BTreeSet<NodeId>,
}

/// A generic labelled directed graph.
///
/// Nodes are addressed by an opaque [`NodeId`]; each node owns its outgoing
/// edges and an index of incoming-neighbour ids for reverse traversal. The
/// invariant `u -> v exists in u.outgoing` implies `u in v.incoming` holds
/// after every mutating operation.
#[derive(Debug, Clone)]
pub struct Graph<N, E> {
    pub(crate) nodes: BTreeMap<NodeId, Node<N, E>>,
    pub(crate) edge_owner: BTreeMap<EdgeId, NodeId>,
    next_node_id: u64,
    next_edge_id: u64,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> Graph<N, E> {
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            edge_owner: BTreeMap::new(),
            next_node_id: 0,
            next_edge_id: 0,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_owner.len()
    }

    pub fn create_node(&mut self, value: Option<N>) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        self.nodes.insert(
            id,
            Node {
                value,
                outgoing: BTreeMap::new(),
                incoming: BTreeSet::new(),
            },
        );
        id
    }

    pub fn node_value(&self, id: NodeId) -> GraphResult<Option<&N>> {
        self.nodes
            .get(&id)
            .map(|n| n.value.as_ref())
            .ok_or(GraphError::InvalidComponent {
                kind: ComponentKind::Node,
                id: id.0,
            })
    }

    pub fn create_edge(&mut self, from: NodeId, to: NodeId, value: Option<E>) -> GraphResult<EdgeId> {
        if !self.nodes.contains_key(&from) {
            return Err(GraphError::InvalidComponent {
                kind: ComponentKind::Node,
                id: from.0,
            });
        }
        if !self.nodes.contains_key(&to) {
            return Err(GraphError::InvalidComponent {
                kind: ComponentKind::Node,
                id: to.0,
            });
        }
        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;
        self.nodes
            .get_mut(&from)
            .expect("from checked above")
            .outgoing
            .insert(id, Edge { target: to, value });
        self.nodes
            .get_mut(&to)
            .expect("to checked above")
            .incoming
            .insert(from);
        self.edge_owner.insert(id, from);
        Ok(id)
    }

    pub fn edge_value(&self, id: EdgeId) -> GraphResult<Option<&E>> {
        let owner = self.edge_owner.get(&id).ok_or(GraphError::InvalidComponent {
            kind: ComponentKind::Edge,
            id: id.0,
        })?;
        Ok(self.nodes[owner].outgoing[&id].value.as_ref())
    }

    pub fn edge_endpoints(&self, id: EdgeId) -> GraphResult<(NodeId, NodeId)> {
        let owner = *self.edge_owner.get(&id).ok_or(GraphError::InvalidComponent {
            kind: ComponentKind::Edge,
            id: id.0,
        })?;
        let target = self.nodes[&owner].outgoing[&id].target;
        Ok((owner, target))
    }

    /// Removes a node and cascades to every incident edge, maintaining the
    /// reverse-neighbour index. O(degree).
    pub fn remove_node(&mut self, id: NodeId) -> GraphResult<()> {
        let node = self.nodes.remove(&id).ok_or(GraphError::InvalidComponent {
            kind: ComponentKind::Node,
            id: id.0,
        })?;

        for edge_id in node.outgoing.keys() {
            self.edge_owner.remove(edge_id);
        }
        for (target, edge) in node.outgoing.iter().map(|(eid, e)| (e.target, *eid)) {
            let _ = edge;
            if let Some(target_node) = self.nodes.get_mut(&target) {
                target_node.incoming.remove(&id);
            }
        }

        for pred in node.incoming.iter().copied().collect::<Vec<_>>() {
            if let Some(pred_node) = self.nodes.get_mut(&pred) {
                let dead: Vec<EdgeId> = pred_node
                    .outgoing
                    .iter()
                    .filter(|(_, e)| e.target == id)
                    .map(|(eid, _)| *eid)
                    .collect();
                for eid in dead {
                    pred_node.outgoing.remove(&eid);
                    self.edge_owner.remove(&eid);
                }
            }
        }
        Ok(())
    }

    /// Removes a single edge. O(degree) of the source node.
    pub fn remove_edge(&mut self, id: EdgeId) -> GraphResult<()> {
        let owner = self.edge_owner.remove(&id).ok_or(GraphError::InvalidComponent {
            kind: ComponentKind::Edge,
            id: id.0,
        })?;
        let target = self.nodes.get_mut(&owner).expect("owner tracked").outgoing.remove(&id).map(|e| e.target);
        if let Some(target) = target {
            let still_connected = self.nodes[&owner].outgoing.values().any(|e| e.target == target);
            if !still_connected {
                if let Some(target_node) = self.nodes.get_mut(&target) {
                    target_node.incoming.remove(&owner);
                }
            }
        }
        Ok(())
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Flat sequence of all edges, ordered by source-node id then edge-creation id.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, NodeId, NodeId)> + '_ {
        self.nodes.iter().flat_map(|(&src, node)| {
            node.outgoing.iter().map(move |(&eid, e)| (eid, src, e.target))
        })
    }

    pub fn successors(&self, id: NodeId) -> GraphResult<impl Iterator<Item = NodeId> + '_> {
        Ok(self
            .nodes
            .get(&id)
            .ok_or(GraphError::InvalidComponent {
                kind: ComponentKind::Node,
                id: id.0,
            })?
            .outgoing
            .values()
            .map(|e| e.target))
    }

    pub fn predecessors(&self, id: NodeId) -> GraphResult<impl Iterator<Item = NodeId> + '_> {
        Ok(self
            .nodes
            .get(&id)
            .ok_or(GraphError::InvalidComponent {
                kind: ComponentKind::Node,
                id: id.0,
            })?
            .incoming
            .iter()
            .copied())
    }

    pub fn output_degree(&self, id: NodeId) -> GraphResult<usize> {
        Ok(self
            .nodes
            .get(&id)
            .ok_or(GraphError::InvalidComponent {
                kind: ComponentKind::Node,
                id: id.0,
            })?
            .outgoing
            .len())
    }

    pub fn input_degree(&self, id: NodeId) -> GraphResult<usize> {
        Ok(self
            .nodes
            .get(&id)
            .ok_or(GraphError::InvalidComponent {
                kind: ComponentKind::Node,
                id: id.0,
            })?
            .incoming
            .len())
    }

    pub fn degree(&self, id: NodeId) -> GraphResult<usize> {
        Ok(self.output_degree(id)? + self.input_degree(id)?)
    }
}

impl<N: Clone, E: Clone> Graph<N, E> {
    /// Deep-copies the subgraph induced by `ids`, assigning fresh ids in
    /// iteration order and preserving node/edge values. Only edges with both
    /// endpoints inside `ids` are carried over.
    pub(crate) fn induced_subgraph(&self, ids: &BTreeSet<NodeId>) -> Graph<N, E> {
        let mut out = Graph::new();
        let mut remap: BTreeMap<NodeId, NodeId> = BTreeMap::new();
        for &old in ids {
            let value = self.nodes[&old].value.clone();
            remap.insert(old, out.create_node(value));
        }
        for &old in ids {
            for (_, edge) in &self.nodes[&old].outgoing {
                if ids.contains(&edge.target) {
                    let _ = out.create_edge(remap[&old], remap[&edge.target], edge.value.clone());
                }
            }
        }
        out
    }
}
