//! The episode engine (C4): drives one task from RESET through EVALUATE.

pub mod agent;
pub mod episode;
pub mod error;

pub use agent::{Agent, NoopAgent, ScriptedAgent};
pub use episode::{run_episode, EpisodeOutcome, ResetBackend};
pub use error::{Error, Result};
