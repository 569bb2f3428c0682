//! Generic labelled directed graph engine.
//!
//! Supports exactly the operations the TUIO2 link-topology messages need:
//! node/edge CRUD, weak/strong component splitting, cycle and shape
//! predicates, and a deterministic isomorphism-sensitive total order. Not a
//! general-purpose graph library.

mod compare;
mod components;
mod cycle;
mod error;
mod graph;
mod topology;

pub use compare::graph_compare;
pub use components::{split_strong_components, split_weak_components};
pub use cycle::{contains_cycle_oriented, contains_cycle_unoriented};
pub use error::{ComponentKind, GraphError, GraphResult};
pub use graph::{EdgeId, Graph, NodeId};
pub use topology::{is_linear_oriented, is_star_oriented, is_tree, is_trunk_tree};
