/// Failures that can arise while decoding a bundle off the wire. A conformant
/// decoder never rejects the enclosing bundle for these — each is handled by
/// the caller per the propagation policy (log and skip, or drop a message).
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum WireError {
    #[error("buffer truncated while reading {0}")]
    Truncated(&'static str),

    #[error("string argument is not valid utf-8")]
    InvalidUtf8,

    #[error("record at path {path:?} declared type tags {type_tags:?} but the catalogue expects a different shape")]
    TypeTagMismatch { path: String, type_tags: String },

    #[error("no parser registered for path {0:?}")]
    UnknownPath(String),

    #[error("bundle is missing its `#bundle\\0` marker")]
    NotABundle,

    #[error("association message topology violates its declared shape: {0}")]
    TopologyViolated(String),
}

pub type WireResult<T> = Result<T, WireError>;
