use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Any network fault, handshake failure, or protocol error talking to
    /// the hypervisor control channel (§2's "all surface as a single
    /// connection-error kind"). Callers treat this as retryable.
    Hypervisor(String),

    /// The guest HTTP transport timed out or refused the connection.
    GuestTransport(String),

    /// The guest responded with the `{status: "error", message}` envelope.
    GuestApplication(String),

    /// `save_state` was called against a backend that doesn't support it
    /// (§4.2.1).
    Unsupported(&'static str),

    /// A `computer_13` action named a key outside the fixed keyboard
    /// vocabulary.
    UnknownKey(String),

    /// An action-space/action-type combination the dispatcher doesn't
    /// recognize.
    UnknownActionType(String),

    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Hypervisor(msg) => write!(f, "hypervisor control channel error: {msg}"),
            Error::GuestTransport(msg) => write!(f, "guest transport error: {msg}"),
            Error::GuestApplication(msg) => write!(f, "guest returned an error: {msg}"),
            Error::Unsupported(msg) => write!(f, "unsupported operation: {msg}"),
            Error::UnknownKey(key) => write!(f, "unknown keyboard key: {key}"),
            Error::UnknownActionType(kind) => write!(f, "unknown action type: {kind}"),
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
            _ => None,
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

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::GuestTransport(err.to_string())
    }
}
