/// Configuration errors are fatal at startup: malformed XML, a missing
/// required key, or a value out of range.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{path}: malformed XML: {reason}")]
    Malformed { path: String, reason: String },

    #[error("{path}: element {element:?} is missing or invalid: {reason}")]
    Invalid {
        path: String,
        element: String,
        reason: String,
    },
}

/// The device I/O boundary named out of scope by the core: `touchd` ships
/// exactly one concrete `InputSource` (trace-file replay); a live evdev
/// source is an external collaborator.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("device {path} unavailable: {reason}")]
    Unavailable { path: String, reason: String },
}
