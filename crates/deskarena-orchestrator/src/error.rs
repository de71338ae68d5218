use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// An experiment in the manifest was started but never marked done, and
    /// the operator hasn't yet said how to proceed (§4.8).
    UnresolvedExperiment(String),
    Core(deskarena_core::Error),
    Engine(deskarena_engine::Error),
    Recorder(deskarena_recorder::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "IO error: {err}"),
            Error::Json(err) => write!(f, "JSON error: {err}"),
            Error::UnresolvedExperiment(name) => {
                write!(f, "experiment '{name}' was started but never finished; resume, skip, or abort")
            }
            Error::Core(err) => write!(f, "core error: {err}"),
            Error::Engine(err) => write!(f, "episode engine error: {err}"),
            Error::Recorder(err) => write!(f, "recorder error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Core(err) => Some(err),
            Error::Engine(err) => Some(err),
            Error::Recorder(err) => Some(err),
            Error::UnresolvedExperiment(_) => None,
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

impl From<deskarena_core::Error> for Error {
    fn from(err: deskarena_core::Error) -> Self {
        Error::Core(err)
    }
}

impl From<deskarena_engine::Error> for Error {
    fn from(err: deskarena_engine::Error) -> Self {
        Error::Engine(err)
    }
}

impl From<deskarena_recorder::Error> for Error {
    fn from(err: deskarena_recorder::Error) -> Self {
        Error::Recorder(err)
    }
}
