//! Task partitioning, the experiments manifest, and the worker/experiment
//! runner process supervision layer (C7/C8) for the deskarena benchmark
//! harness.

pub mod error;
pub mod manifest;
pub mod partition;
pub mod runner;
pub mod worker;

pub use error::{Error, Result};
pub use manifest::ManifestStore;
pub use partition::{flatten, parse_meta, partition_for_worker, TaskRef, TestAllMeta};
pub use runner::{run_experiments, ExperimentOutcome, ExperimentSpec, UnresolvedDecision, WorkerEvent};
pub use worker::{run_worker, WorkerConfig, WorkerSummary};
