use std::fmt;

/// Which kind of id an [`invalid_component`](GraphError::InvalidComponent) error was raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Node,
    Edge,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Node => write!(f, "node"),
            ComponentKind::Edge => write!(f, "edge"),
        }
    }
}

/// Errors raised by [`crate::Graph`] operations.
///
/// Every variant is surfaced to the caller — graph invariant violations are
/// never silently swallowed.
#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    #[error("invalid_component: {kind} {id} does not belong to this graph")]
    InvalidComponent { kind: ComponentKind, id: u64 },
}

pub type GraphResult<T> = Result<T, GraphError>;
