use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// RESET couldn't get the guest back to a ready state within the poll
    /// budget (§4.4 RESET: 5s interval, 20 attempts).
    ResetTimedOut,
    GuestIo(deskarena_guestio::Error),
    Evaluator(deskarena_evaluators::Error),
    Recorder(deskarena_recorder::Error),
    Core(deskarena_core::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ResetTimedOut => write!(f, "guest did not become ready after RESET"),
            Error::GuestIo(err) => write!(f, "guest I/O error: {err}"),
            Error::Evaluator(err) => write!(f, "evaluator error: {err}"),
            Error::Recorder(err) => write!(f, "recorder error: {err}"),
            Error::Core(err) => write!(f, "core error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::GuestIo(err) => Some(err),
            Error::Evaluator(err) => Some(err),
            Error::Recorder(err) => Some(err),
            Error::Core(err) => Some(err),
            Error::ResetTimedOut => None,
        }
    }
}

impl From<deskarena_guestio::Error> for Error {
    fn from(err: deskarena_guestio::Error) -> Self {
        Error::GuestIo(err)
    }
}

impl From<deskarena_evaluators::Error> for Error {
    fn from(err: deskarena_evaluators::Error) -> Self {
        Error::Evaluator(err)
    }
}

impl From<deskarena_recorder::Error> for Error {
    fn from(err: deskarena_recorder::Error) -> Self {
        Error::Recorder(err)
    }
}

impl From<deskarena_core::Error> for Error {
    fn from(err: deskarena_core::Error) -> Self {
        Error::Core(err)
    }
}
