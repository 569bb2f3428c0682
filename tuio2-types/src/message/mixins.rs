//! Capability mixins shared across the message catalogue. A message composes
//! the mixins it needs as named fields — there is no base message type to
//! inherit from.

use std::collections::BTreeSet;

use tuio2_graph::Graph;

use crate::coords::{Accel, Angle, Velocity};
use crate::ids::{ComponentId, SessionId, TypeId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionIdHolder {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeUser {
    pub type_id: TypeId,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComponentIdHolder {
    pub component_id: ComponentId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputModeHolder {
    Only2D,
    Only3D,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AngleHolder {
    pub angle: Angle,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationHolder {
    pub rotation_velocity: Velocity,
    pub rotation_accel: Accel,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EllipseAxesHolder {
    pub major: f64,
    pub minor: f64,
}

/// Wraps a generic graph instantiated with `SessionId` nodes and `PortPair`
/// edges, as carried by the link/list/tree association messages. List and
/// tree variants additionally check a shape invariant before they are
/// considered well formed.
#[derive(Debug, Clone)]
pub struct LinkTopology {
    pub graph: Graph<SessionId, PortPair>,
}

/// Which outgoing/incoming port an association edge attaches to, when the
/// underlying device exposes more than one connector per contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct PortPair {
    pub source_port: u16,
    pub target_port: u16,
}

impl LinkTopology {
    pub fn new(graph: Graph<SessionId, PortPair>) -> Self {
        Self { graph }
    }

    pub fn is_list_shaped(&self) -> bool {
        tuio2_graph::is_linear_oriented(&self.graph)
    }

    pub fn is_tree_shaped(&self) -> bool {
        tuio2_graph::is_tree(&self.graph)
    }

    /// `(src_session, dst_session, ports)` for every edge, used by
    /// structural equality and pretty-printing. Session ids are unique per
    /// node here, so this triple set is a faithful structural fingerprint —
    /// unlike [`tuio2_graph::graph_compare`], it does not consider two
    /// differently-wired graphs with the same shape equal.
    fn edge_triples(&self) -> BTreeSet<(SessionId, SessionId, PortPair)> {
        self.graph
            .edges()
            .map(|(eid, src, dst)| {
                let src_session = *self.graph.node_value(src).unwrap().unwrap();
                let dst_session = *self.graph.node_value(dst).unwrap().unwrap();
                let port = self.graph.edge_value(eid).unwrap().copied().unwrap_or_default();
                (src_session, dst_session, port)
            })
            .collect()
    }

    fn node_values(&self) -> BTreeSet<SessionId> {
        self.graph
            .nodes()
            .map(|id| *self.graph.node_value(id).unwrap().unwrap())
            .collect()
    }
}

/// Structural equality: same node set and same edges (by session id and
/// port pair), independent of internal node/edge id assignment.
impl PartialEq for LinkTopology {
    fn eq(&self, other: &Self) -> bool {
        self.node_values() == other.node_values() && self.edge_triples() == other.edge_triples()
    }
}
