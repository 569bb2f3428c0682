use crate::components::split_weak_components;
use crate::cycle::{contains_cycle_oriented, contains_cycle_unoriented};
use crate::graph::{Graph, NodeId};

/// A weakly connected, acyclic graph: `|E| == |V| - 1` with no unoriented cycle.
pub fn is_tree<N: Clone, E: Clone>(g: &Graph<N, E>) -> bool {
    if g.node_count() == 0 {
        return true;
    }
    split_weak_components(g).len() == 1
        && g.edge_count() + 1 == g.node_count()
        && !contains_cycle_unoriented(g)
}

/// A single directed chain: every node has out-degree <= 1 and in-degree <=
/// 1, exactly one node has in-degree 0 (the head), no cycle, and every node
/// is reachable from the head.
pub fn is_linear_oriented<N: Clone, E: Clone>(g: &Graph<N, E>) -> bool {
    if g.node_count() == 0 {
        return true;
    }
    if contains_cycle_oriented(g) {
        return false;
    }
    let mut heads = Vec::new();
    for n in g.nodes() {
        let out_deg = g.output_degree(n).unwrap();
        let in_deg = g.input_degree(n).unwrap();
        if out_deg > 1 || in_deg > 1 {
            return false;
        }
        if in_deg == 0 {
            heads.push(n);
        }
    }
    if heads.len() != 1 {
        return false;
    }
    reachable_count(g, heads[0]) == g.node_count()
}

/// One central node connected to every other node; the others share no
/// edges among themselves.
pub fn is_star_oriented<N: Clone, E: Clone>(g: &Graph<N, E>) -> bool {
    let n = g.node_count();
    if n < 2 {
        return n <= 1;
    }
    for center in g.nodes() {
        let center_degree = g.degree(center).unwrap();
        if center_degree != n - 1 {
            continue;
        }
        let leaves_ok = g
            .nodes()
            .filter(|&x| x != center)
            .all(|x| g.degree(x).unwrap() == 1);
        if leaves_ok {
            return true;
        }
    }
    false
}

/// A linear chain followed by one branching tree: a prefix path of nodes
/// with out/in-degree <= 1, terminating in a single node whose descendants
/// form an acyclic branching structure (out-degree may exceed 1 there).
pub fn is_trunk_tree<N: Clone, E: Clone>(g: &Graph<N, E>) -> bool {
    if g.node_count() == 0 {
        return true;
    }
    if contains_cycle_oriented(g) || split_weak_components(g).len() != 1 {
        return false;
    }
    let roots: Vec<NodeId> = g.nodes().filter(|&n| g.input_degree(n).unwrap() == 0).collect();
    if roots.len() != 1 {
        return false;
    }
    // every non-root node has in-degree exactly 1 (it's a tree once the
    // trunk is accounted for); the trunk itself is the maximal prefix of
    // single-child nodes starting at the root.
    for n in g.nodes() {
        if n != roots[0] && g.input_degree(n).unwrap() != 1 {
            return false;
        }
    }
    reachable_count(g, roots[0]) == g.node_count()
}

fn reachable_count<N, E>(g: &Graph<N, E>, from: NodeId) -> usize {
    let mut seen = std::collections::HashSet::new();
    let mut stack = vec![from];
    seen.insert(from);
    while let Some(n) = stack.pop() {
        for s in g.successors(n).unwrap() {
            if seen.insert(s) {
                stack.push(s);
            }
        }
    }
    seen.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_chain_is_linear_oriented() {
        let mut g: Graph<(), ()> = Graph::new();
        let a = g.create_node(None);
        let b = g.create_node(None);
        let c = g.create_node(None);
        g.create_edge(a, b, None).unwrap();
        g.create_edge(b, c, None).unwrap();
        assert!(is_linear_oriented(&g));
        assert!(is_tree(&g));
        assert!(!is_star_oriented(&g));
    }

    #[test]
    fn star_shape_detected() {
        let mut g: Graph<(), ()> = Graph::new();
        let center = g.create_node(None);
        let a = g.create_node(None);
        let b = g.create_node(None);
        let c = g.create_node(None);
        g.create_edge(center, a, None).unwrap();
        g.create_edge(center, b, None).unwrap();
        g.create_edge(center, c, None).unwrap();
        assert!(is_star_oriented(&g));
        assert!(!is_linear_oriented(&g));
    }

    #[test]
    fn trunk_then_branch_is_trunk_tree() {
        let mut g: Graph<(), ()> = Graph::new();
        let a = g.create_node(None);
        let b = g.create_node(None);
        let trunk_end = g.create_node(None);
        let leaf1 = g.create_node(None);
        let leaf2 = g.create_node(None);
        g.create_edge(a, b, None).unwrap();
        g.create_edge(b, trunk_end, None).unwrap();
        g.create_edge(trunk_end, leaf1, None).unwrap();
        g.create_edge(trunk_end, leaf2, None).unwrap();
        assert!(is_trunk_tree(&g));
        assert!(!is_linear_oriented(&g));
    }
}
