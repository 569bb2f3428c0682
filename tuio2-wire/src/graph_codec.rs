//! Encodes and decodes the link/list/tree association messages' embedded
//! graphs as a flat type-tagged list: the association kind, then one
//! `(src_session, dst_session, in_port, out_port)` quad per edge, then a
//! single `-1` sentinel.

use tuio2_graph::{is_linear_oriented, is_tree, Graph};
use tuio2_types::ids::SessionId;
use tuio2_types::message::{LinkTopology, PortPair};

use crate::bundle::Arg;
use crate::error::{WireError, WireResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssocKind {
    Link,
    List,
    Tree,
}

impl AssocKind {
    fn as_i32(self) -> i32 {
        match self {
            AssocKind::Link => 0,
            AssocKind::List => 1,
            AssocKind::Tree => 2,
        }
    }

    fn from_i32(v: i32) -> WireResult<AssocKind> {
        match v {
            0 => Ok(AssocKind::Link),
            1 => Ok(AssocKind::List),
            2 => Ok(AssocKind::Tree),
            other => Err(WireError::TopologyViolated(format!(
                "unknown association kind {other}"
            ))),
        }
    }
}

const SENTINEL: i32 = -1;

pub fn encode_link_topology(kind: AssocKind, topology: &LinkTopology) -> WireResult<Vec<Arg>> {
    let mut args = vec![Arg::Int(kind.as_i32())];
    for (edge_id, src, dst) in topology.graph.edges() {
        let src_session = topology
            .graph
            .node_value(src)
            .ok()
            .flatten()
            .copied()
            .unwrap_or(SessionId::NONE);
        let dst_session = topology
            .graph
            .node_value(dst)
            .ok()
            .flatten()
            .copied()
            .unwrap_or(SessionId::NONE);
        let port = topology
            .graph
            .edge_value(edge_id)
            .ok()
            .flatten()
            .copied()
            .unwrap_or_default();
        args.push(Arg::Int(src_session.0 as i32));
        args.push(Arg::Int(dst_session.0 as i32));
        args.push(Arg::Int(port.source_port as i32));
        args.push(Arg::Int(port.target_port as i32));
    }
    args.push(Arg::Int(SENTINEL));
    Ok(args)
}

pub fn decode_link_topology(expected: AssocKind, args: &[Arg]) -> WireResult<LinkTopology> {
    let as_int = |a: &Arg| -> WireResult<i32> {
        match a {
            Arg::Int(v) => Ok(*v),
            _ => Err(WireError::TopologyViolated(
                "association message carries a non-int argument".into(),
            )),
        }
    };

    let mut iter = args.iter();
    let kind_raw = as_int(iter.next().ok_or(WireError::Truncated("association kind"))?)?;
    let kind = AssocKind::from_i32(kind_raw)?;
    if kind != expected {
        return Err(WireError::TopologyViolated(format!(
            "association message on a {expected:?} path carries a {kind:?} graph"
        )));
    }

    let mut graph: Graph<SessionId, PortPair> = Graph::new();
    let mut node_of: std::collections::BTreeMap<SessionId, tuio2_graph::NodeId> =
        std::collections::BTreeMap::new();
    let mut node_for = |graph: &mut Graph<SessionId, PortPair>,
                         node_of: &mut std::collections::BTreeMap<SessionId, tuio2_graph::NodeId>,
                         session: SessionId| {
        *node_of
            .entry(session)
            .or_insert_with(|| graph.create_node(Some(session)))
    };

    let rest: Vec<i32> = iter.map(|a| as_int(a)).collect::<WireResult<_>>()?;
    let mut chunks = rest.chunks_exact(4);
    for chunk in &mut chunks {
        if chunk[0] == SENTINEL {
            break;
        }
        let src = node_for(&mut graph, &mut node_of, SessionId(chunk[0] as u32));
        let dst = node_for(&mut graph, &mut node_of, SessionId(chunk[1] as u32));
        let port = PortPair {
            source_port: chunk[2] as u16,
            target_port: chunk[3] as u16,
        };
        graph
            .create_edge(src, dst, Some(port))
            .map_err(|e| WireError::TopologyViolated(e.to_string()))?;
    }

    match kind {
        AssocKind::List => {
            if !is_linear_oriented(&graph) {
                return Err(WireError::TopologyViolated(
                    "linked-list association is not a single oriented chain".into(),
                ));
            }
        }
        AssocKind::Tree => {
            if !is_tree(&graph) {
                return Err(WireError::TopologyViolated(
                    "linked-tree association is not acyclic with one root".into(),
                ));
            }
        }
        AssocKind::Link => {}
    }

    Ok(LinkTopology::new(graph))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_topology() -> LinkTopology {
        let mut g: Graph<SessionId, PortPair> = Graph::new();
        let a = g.create_node(Some(SessionId(1)));
        let b = g.create_node(Some(SessionId(2)));
        let c = g.create_node(Some(SessionId(3)));
        g.create_edge(a, b, Some(PortPair::default())).unwrap();
        g.create_edge(b, c, Some(PortPair::default())).unwrap();
        LinkTopology::new(g)
    }

    #[test]
    fn list_topology_round_trips() {
        let topo = list_topology();
        let args = encode_link_topology(AssocKind::List, &topo).unwrap();
        let decoded = decode_link_topology(AssocKind::List, &args).unwrap();
        assert_eq!(decoded.graph.edge_count(), 2);
        assert!(decoded.is_list_shaped());
    }

    #[test]
    fn non_linear_graph_rejected_on_list_path() {
        let mut g: Graph<SessionId, PortPair> = Graph::new();
        let a = g.create_node(Some(SessionId(1)));
        let b = g.create_node(Some(SessionId(2)));
        let c = g.create_node(Some(SessionId(3)));
        g.create_edge(a, b, Some(PortPair::default())).unwrap();
        g.create_edge(a, c, Some(PortPair::default())).unwrap();
        let topo = LinkTopology::new(g);
        let args = encode_link_topology(AssocKind::List, &topo).unwrap();
        assert!(decode_link_topology(AssocKind::List, &args).is_err());
    }
}
