use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::graph::{Graph, NodeId};

/// Splits `g` into one graph per weakly-connected component (edge direction
/// ignored). Each component is a deep copy with fresh ids; node/edge values
/// are preserved.
pub fn split_weak_components<N: Clone, E: Clone>(g: &Graph<N, E>) -> Vec<Graph<N, E>> {
    let mut parent: HashMap<NodeId, NodeId> = g.nodes().map(|n| (n, n)).collect();

    fn find(parent: &mut HashMap<NodeId, NodeId>, x: NodeId) -> NodeId {
        let p = parent[&x];
        if p == x {
            return x;
        }
        let root = find(parent, p);
        parent.insert(x, root);
        root
    }

    fn union(parent: &mut HashMap<NodeId, NodeId>, a: NodeId, b: NodeId) {
        let ra = find(parent, a);
        let rb = find(parent, b);
        if ra != rb {
            parent.insert(ra, rb);
        }
    }

    for (_, src, dst) in g.edges() {
        union(&mut parent, src, dst);
    }

    let mut buckets: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
    for node in g.nodes() {
        let root = find(&mut parent, node);
        buckets.entry(root).or_default().insert(node);
    }

    buckets.values().map(|ids| g.induced_subgraph(ids)).collect()
}

/// Tarjan's strongly-connected-components algorithm, iterative (no
/// recursion, since sources may be large).
pub fn split_strong_components<N: Clone, E: Clone>(g: &Graph<N, E>) -> Vec<Graph<N, E>> {
    #[derive(Clone, Copy)]
    struct Frame {
        node: NodeId,
        child_iter_idx: usize,
    }

    let mut index: HashMap<NodeId, usize> = HashMap::new();
    let mut low_link: HashMap<NodeId, usize> = HashMap::new();
    let mut on_stack: BTreeSet<NodeId> = BTreeSet::new();
    let mut stack: Vec<NodeId> = Vec::new();
    let mut next_index = 0usize;
    let mut result: Vec<BTreeSet<NodeId>> = Vec::new();

    let successors: HashMap<NodeId, Vec<NodeId>> = g
        .nodes()
        .map(|n| (n, g.successors(n).expect("node exists").collect()))
        .collect();

    for start in g.nodes() {
        if index.contains_key(&start) {
            continue;
        }
        let mut call_stack = vec![Frame {
            node: start,
            child_iter_idx: 0,
        }];
        index.insert(start, next_index);
        low_link.insert(start, next_index);
        next_index += 1;
        stack.push(start);
        on_stack.insert(start);

        while let Some(frame) = call_stack.last_mut() {
            let v = frame.node;
            let children = &successors[&v];
            if frame.child_iter_idx < children.len() {
                let w = children[frame.child_iter_idx];
                frame.child_iter_idx += 1;
                if !index.contains_key(&w) {
                    index.insert(w, next_index);
                    low_link.insert(w, next_index);
                    next_index += 1;
                    stack.push(w);
                    on_stack.insert(w);
                    call_stack.push(Frame {
                        node: w,
                        child_iter_idx: 0,
                    });
                } else if on_stack.contains(&w) {
                    let lv = low_link[&v].min(index[&w]);
                    low_link.insert(v, lv);
                }
            } else {
                call_stack.pop();
                if let Some(parent) = call_stack.last() {
                    let lp = low_link[&parent.node].min(low_link[&v]);
                    low_link.insert(parent.node, lp);
                }
                if low_link[&v] == index[&v] {
                    let mut component = BTreeSet::new();
                    loop {
                        let w = stack.pop().expect("component root still on stack");
                        on_stack.remove(&w);
                        component.insert(w);
                        if w == v {
                            break;
                        }
                    }
                    result.push(component);
                }
            }
        }
    }

    result.iter().map(|ids| g.induced_subgraph(ids)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weak_components_splits_disjoint_chains() {
        let mut g: Graph<(), ()> = Graph::new();
        let a = g.create_node(None);
        let b = g.create_node(None);
        let c = g.create_node(None);
        let d = g.create_node(None);
        g.create_edge(a, b, None).unwrap();
        g.create_edge(c, d, None).unwrap();

        let components = split_weak_components(&g);
        assert_eq!(components.len(), 2);
        assert!(components.iter().all(|c| c.node_count() == 2 && c.edge_count() == 1));
    }

    #[test]
    fn strong_components_finds_cycle() {
        let mut g: Graph<(), ()> = Graph::new();
        let a = g.create_node(None);
        let b = g.create_node(None);
        let c = g.create_node(None);
        g.create_edge(a, b, None).unwrap();
        g.create_edge(b, c, None).unwrap();
        g.create_edge(c, a, None).unwrap();

        let sccs = split_strong_components(&g);
        assert_eq!(sccs.len(), 1);
        assert_eq!(sccs[0].node_count(), 3);
    }

    #[test]
    fn strong_components_splits_dag() {
        let mut g: Graph<(), ()> = Graph::new();
        let a = g.create_node(None);
        let b = g.create_node(None);
        let c = g.create_node(None);
        g.create_edge(a, b, None).unwrap();
        g.create_edge(b, c, None).unwrap();

        let sccs = split_strong_components(&g);
        assert_eq!(sccs.len(), 3);
    }
}
