use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// `EvaluatorSpec::normalize()` named a getter/metric tag that isn't in
    /// the registry (§4.5.1 "unknown tag is a structured error raised at
    /// task-load time").
    UnknownTag(String),

    /// A getter couldn't find the thing it was asked to probe (file,
    /// registry key, window). Callers decide under `and`/`or` composition
    /// whether this short-circuits.
    NotFound(String),

    /// The guest transport or guest application returned an error while a
    /// getter was collecting evidence.
    GuestIo(deskarena_guestio::Error),

    /// A metric's return value wasn't coercible to a number (§4.4
    /// invariant: non-numeric metric return -> score 0 and a warning).
    NonNumericMetric(String),

    Spec(deskarena_types::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownTag(tag) => write!(f, "unknown evaluator tag: {tag}"),
            Error::NotFound(what) => write!(f, "getter could not find: {what}"),
            Error::GuestIo(err) => write!(f, "guest I/O error: {err}"),
            Error::NonNumericMetric(repr) => write!(f, "metric returned a non-numeric value: {repr}"),
            Error::Spec(err) => write!(f, "evaluator spec error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::GuestIo(err) => Some(err),
            Error::Spec(err) => Some(err),
            _ => None,
        }
    }
}

impl From<deskarena_guestio::Error> for Error {
    fn from(err: deskarena_guestio::Error) -> Self {
        Error::GuestIo(err)
    }
}

impl From<deskarena_types::Error> for Error {
    fn from(err: deskarena_types::Error) -> Self {
        Error::Spec(err)
    }
}
