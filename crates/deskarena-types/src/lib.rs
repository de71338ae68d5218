//! Core data structures shared across the deskarena workspace: task
//! descriptors, observations, actions, trajectories, and the agent
//! boundary's data shapes. No crate in this workspace should model its own
//! copy of these -- they are the contract every other crate is built
//! around, the same role `agtrace-types` plays for the rest of that
//! workspace.

pub mod action;
pub mod agent;
pub mod error;
pub mod observation;
pub mod task;
pub mod trajectory;

pub use action::{Action, ActionSpace, Computer13Action, Computer13Kind};
pub use agent::{AgentPrediction, ComputerUpdate};
pub use error::{Error, Result};
pub use observation::{Entity, EntitySource, EntityType, Observation, PendingHumanInput, Rect};
pub use task::{
    ConfigDirective, Conjunction, EvaluatorEntry, EvaluatorSpec, GetterSpec, ScalarOrList, Task,
};
pub use trajectory::{ActionTimestamp, StepInfo, StepRecord, TrajectorySummary};
