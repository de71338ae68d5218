use std::fmt;

/// Result type for deskarena-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the types layer
#[derive(Debug)]
pub enum Error {
    /// A task descriptor's `evaluator` block has mismatched list lengths
    /// across `func`/`result`/`expected`/`options`.
    MismatchedEvaluatorLists { func_len: usize, other: &'static str, other_len: usize },

    /// A task/evaluator spec failed to deserialize or violated a structural
    /// invariant (e.g. `conj` outside `{"and", "or"}`).
    InvalidSpec(String),

    /// IO operation failed
    Io(std::io::Error),

    /// JSON (de)serialization failed
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MismatchedEvaluatorLists { func_len, other, other_len } => write!(
                f,
                "evaluator list length mismatch: func has {func_len} entries, {other} has {other_len}"
            ),
            Error::InvalidSpec(msg) => write!(f, "invalid evaluator spec: {msg}"),
            Error::Io(err) => write!(f, "IO error: {err}"),
            Error::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::MismatchedEvaluatorLists { .. } | Error::InvalidSpec(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
