/// Errors that can arise while working with TUIO2 scalar identifiers and
/// message values, independent of the wire codec (see `tuio2-wire::WireError`
/// for parse-time failures) and the graph engine (see `tuio2-graph::GraphError`).
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TuioError {
    #[error("session id {0} is reserved (0 means \"none\")")]
    ReservedSessionId(u32),
}
