use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::components::split_weak_components;
use crate::graph::{Graph, NodeId};

type NodeCmp<'a, N> = dyn Fn(Option<&N>, Option<&N>) -> Ordering + 'a;
type EdgeCmp<'a, E> = dyn Fn(Option<&E>, Option<&E>) -> Ordering + 'a;

/// Reassigns internal ids so that node order reflects
/// (node-value ascending, output-degree descending, input-degree descending)
/// and each node's outgoing edges are reordered by
/// (edge-value ascending, target-node-value ascending).
fn canonicalize<N: Clone, E: Clone>(
    g: &Graph<N, E>,
    node_cmp: &NodeCmp<N>,
    edge_cmp: &EdgeCmp<E>,
) -> Graph<N, E> {
    let mut order: Vec<NodeId> = g.nodes().collect();
    order.sort_by(|&a, &b| {
        node_cmp(g.node_value(a).unwrap(), g.node_value(b).unwrap())
            .then_with(|| g.output_degree(b).unwrap().cmp(&g.output_degree(a).unwrap()))
            .then_with(|| g.input_degree(b).unwrap().cmp(&g.input_degree(a).unwrap()))
            .then_with(|| a.cmp(&b))
    });

    let mut new_rank: std::collections::HashMap<NodeId, usize> = std::collections::HashMap::new();
    for (rank, &old) in order.iter().enumerate() {
        new_rank.insert(old, rank);
    }

    let mut out = Graph::new();
    let mut remap: std::collections::HashMap<NodeId, NodeId> = std::collections::HashMap::new();
    for &old in &order {
        let value = g.node_value(old).unwrap().cloned();
        remap.insert(old, out.create_node(value));
    }

    for &old in &order {
        let mut outgoing: Vec<(NodeId, Option<E>)> = g
            .successors(old)
            .unwrap()
            .map(|target| {
                let edge_value = g
                    .edges()
                    .find(|&(_, src, dst)| src == old && dst == target)
                    .and_then(|(eid, _, _)| g.edge_value(eid).unwrap().cloned());
                (target, edge_value)
            })
            .collect();
        outgoing.sort_by(|(ta, va), (tb, vb)| {
            edge_cmp(va.as_ref(), vb.as_ref())
                .then_with(|| new_rank[ta].cmp(&new_rank[tb]))
        });
        for (target, value) in outgoing {
            out.create_edge(remap[&old], remap[&target], value)
                .expect("remapped endpoints exist");
        }
    }
    out
}

fn compare_node_positions<N: Clone, E: Clone>(
    ag: &Graph<N, E>,
    a: NodeId,
    bg: &Graph<N, E>,
    b: NodeId,
    node_cmp: &NodeCmp<N>,
) -> Ordering {
    node_cmp(ag.node_value(a).unwrap(), bg.node_value(b).unwrap())
        .then_with(|| bg.output_degree(b).unwrap().cmp(&ag.output_degree(a).unwrap()))
        .then_with(|| bg.input_degree(b).unwrap().cmp(&ag.input_degree(a).unwrap()))
}

fn sorted_predecessors<N: Clone, E: Clone>(
    g: &Graph<N, E>,
    n: NodeId,
    node_cmp: &NodeCmp<N>,
    edge_cmp: &EdgeCmp<E>,
) -> Vec<(Option<N>, Option<E>)> {
    let mut preds: Vec<(NodeId, Option<E>)> = g
        .predecessors(n)
        .unwrap()
        .map(|p| {
            let edge_value = g
                .edges()
                .find(|&(_, src, dst)| src == p && dst == n)
                .and_then(|(eid, _, _)| g.edge_value(eid).unwrap().cloned());
            (p, edge_value)
        })
        .collect();
    preds.sort_by(|(pa, ea), (pb, eb)| {
        node_cmp(g.node_value(*pa).unwrap(), g.node_value(*pb).unwrap())
            .then_with(|| edge_cmp(ea.as_ref(), eb.as_ref()))
    });
    preds
        .into_iter()
        .map(|(p, e)| (g.node_value(p).unwrap().cloned(), e))
        .collect()
}

fn outgoing_signature<N: Clone, E: Clone>(g: &Graph<N, E>, n: NodeId) -> Vec<(Option<N>, Option<E>)> {
    g.successors(n)
        .unwrap()
        .map(|target| {
            let edge_value = g
                .edges()
                .find(|&(_, src, dst)| src == n && dst == target)
                .and_then(|(eid, _, _)| g.edge_value(eid).unwrap().cloned());
            (g.node_value(target).unwrap().cloned(), edge_value)
        })
        .collect()
}

fn structural_match<N: Clone, E: Clone>(
    ag: &Graph<N, E>,
    a: NodeId,
    bg: &Graph<N, E>,
    b: NodeId,
    node_cmp: &NodeCmp<N>,
    edge_cmp: &EdgeCmp<E>,
) -> bool {
    let a_out = outgoing_signature(ag, a);
    let b_out = outgoing_signature(bg, b);
    if a_out.len() != b_out.len() {
        return false;
    }
    for ((an, ae), (bn, be)) in a_out.iter().zip(b_out.iter()) {
        if node_cmp(an.as_ref(), bn.as_ref()) != Ordering::Equal {
            return false;
        }
        if edge_cmp(ae.as_ref(), be.as_ref()) != Ordering::Equal {
            return false;
        }
    }

    let a_pred = sorted_predecessors(ag, a, node_cmp, edge_cmp);
    let b_pred = sorted_predecessors(bg, b, node_cmp, edge_cmp);
    if a_pred.len() != b_pred.len() {
        return false;
    }
    for ((an, ae), (bn, be)) in a_pred.iter().zip(b_pred.iter()) {
        if node_cmp(an.as_ref(), bn.as_ref()) != Ordering::Equal {
            return false;
        }
        if edge_cmp(ae.as_ref(), be.as_ref()) != Ordering::Equal {
            return false;
        }
    }
    true
}

/// Compares two already-canonicalized, consumable graphs via the
/// pop-lexicographically-first-node backtracking match described in the
/// topology-comparison algorithm. Consumes working copies.
fn compare_canonical<N: Clone, E: Clone>(
    a: &Graph<N, E>,
    b: &Graph<N, E>,
    node_cmp: &NodeCmp<N>,
    edge_cmp: &EdgeCmp<E>,
) -> Ordering {
    let mut ag = a.clone();
    let mut bg = b.clone();
    let mut a_list: VecDeque<NodeId> = ag.nodes().collect();
    let mut b_list: VecDeque<NodeId> = bg.nodes().collect();

    loop {
        if a_list.is_empty() && b_list.is_empty() {
            return Ordering::Equal;
        }
        if a_list.is_empty() {
            return Ordering::Less;
        }
        if b_list.is_empty() {
            return Ordering::Greater;
        }

        let a0 = a_list[0];
        let mut matched_offset = None;

        for offset in 0..b_list.len() {
            let b0 = b_list[offset];
            let key_order = compare_node_positions(&ag, a0, &bg, b0, node_cmp);
            if offset == 0 && key_order != Ordering::Equal {
                // the two sides' lexicographically-first nodes disagree —
                // that disagreement *is* the total order between the graphs.
                return key_order;
            }
            if key_order != Ordering::Equal {
                // ran past the block of nodes tied with a0's rank on B's side.
                break;
            }
            if structural_match(&ag, a0, &bg, b0, node_cmp, edge_cmp) {
                matched_offset = Some(offset);
                break;
            }
        }

        match matched_offset {
            Some(offset) => {
                let b0 = b_list.remove(offset).expect("offset in range");
                a_list.pop_front();
                ag.remove_node(a0).expect("a0 present");
                bg.remove_node(b0).expect("b0 present");
            }
            None => {
                let a_nodes = a_list.len();
                let b_nodes = b_list.len();
                if a_nodes != b_nodes {
                    return a_nodes.cmp(&b_nodes);
                }
                let a_edges: usize = a_list.iter().map(|&n| ag.output_degree(n).unwrap()).sum();
                let b_edges: usize = b_list.iter().map(|&n| bg.output_degree(n).unwrap()).sum();
                return a_edges.cmp(&b_edges);
            }
        }
    }
}

fn component_order<N: Clone, E: Clone>(
    x: &Graph<N, E>,
    y: &Graph<N, E>,
    node_cmp: &NodeCmp<N>,
    edge_cmp: &EdgeCmp<E>,
) -> Ordering {
    x.node_count()
        .cmp(&y.node_count())
        .then_with(|| x.edge_count().cmp(&y.edge_count()))
        .then_with(|| compare_canonical(x, y, node_cmp, edge_cmp))
}

/// Total order over labelled graphs that is zero exactly on isomorphism
/// (under the caller-supplied node/edge comparators).
///
/// Both graphs are split into weak components and the component multisets
/// compared pairwise after independent canonicalization; see the topology
/// comparison algorithm for the full procedure.
pub fn graph_compare<N, E>(
    a: &Graph<N, E>,
    b: &Graph<N, E>,
    node_cmp: impl Fn(Option<&N>, Option<&N>) -> Ordering,
    edge_cmp: impl Fn(Option<&E>, Option<&E>) -> Ordering,
) -> Ordering
where
    N: Clone,
    E: Clone,
{
    let node_cmp: &NodeCmp<N> = &node_cmp;
    let edge_cmp: &EdgeCmp<E> = &edge_cmp;

    let mut comps_a: Vec<Graph<N, E>> = split_weak_components(a)
        .iter()
        .map(|c| canonicalize(c, node_cmp, edge_cmp))
        .collect();
    let mut comps_b: Vec<Graph<N, E>> = split_weak_components(b)
        .iter()
        .map(|c| canonicalize(c, node_cmp, edge_cmp))
        .collect();

    comps_a.sort_by(|x, y| component_order(x, y, node_cmp, edge_cmp));
    comps_b.sort_by(|x, y| component_order(x, y, node_cmp, edge_cmp));

    for (x, y) in comps_a.iter().zip(comps_b.iter()) {
        let ord = component_order(x, y, node_cmp, edge_cmp);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    comps_a.len().cmp(&comps_b.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_cmp(a: Option<&i64>, b: Option<&i64>) -> Ordering {
        a.cmp(&b)
    }

    fn port_cmp(a: Option<&(i32, i32)>, b: Option<&(i32, i32)>) -> Ordering {
        a.cmp(&b)
    }

    #[test]
    fn identical_graph_compares_equal() {
        let mut g: Graph<i64, (i32, i32)> = Graph::new();
        let a = g.create_node(Some(1));
        let b = g.create_node(Some(2));
        let c = g.create_node(Some(3));
        g.create_edge(a, b, Some((0, 0))).unwrap();
        g.create_edge(b, c, Some((0, 0))).unwrap();

        assert_eq!(graph_compare(&g, &g, id_cmp, port_cmp), Ordering::Equal);
    }

    #[test]
    fn isomorphic_under_different_creation_order() {
        // A = {1->2, 1->3}
        let mut a: Graph<i64, (i32, i32)> = Graph::new();
        let n1 = a.create_node(Some(1));
        let n2 = a.create_node(Some(2));
        let n3 = a.create_node(Some(3));
        a.create_edge(n1, n2, Some((0, 0))).unwrap();
        a.create_edge(n1, n3, Some((0, 0))).unwrap();

        // B = {1->3, 1->2} (reversed creation order)
        let mut b: Graph<i64, (i32, i32)> = Graph::new();
        let m1 = b.create_node(Some(1));
        let m3 = b.create_node(Some(3));
        let m2 = b.create_node(Some(2));
        b.create_edge(m1, m3, Some((0, 0))).unwrap();
        b.create_edge(m1, m2, Some((0, 0))).unwrap();

        assert_eq!(graph_compare(&a, &b, id_cmp, port_cmp), Ordering::Equal);
    }

    #[test]
    fn different_node_value_breaks_tie() {
        let mut a: Graph<i64, (i32, i32)> = Graph::new();
        a.create_node(Some(1));

        let mut b: Graph<i64, (i32, i32)> = Graph::new();
        b.create_node(Some(2));

        assert_eq!(graph_compare(&a, &b, id_cmp, port_cmp), Ordering::Less);
        assert_eq!(graph_compare(&b, &a, id_cmp, port_cmp), Ordering::Greater);
    }

    #[test]
    fn different_component_count_orders_by_size() {
        let mut a: Graph<i64, (i32, i32)> = Graph::new();
        let a1 = a.create_node(Some(1));
        a.create_node(Some(2));
        let _ = a1;

        let mut b: Graph<i64, (i32, i32)> = Graph::new();
        b.create_node(Some(1));

        assert_eq!(graph_compare(&a, &b, id_cmp, port_cmp), Ordering::Greater);
    }
}
