//! The Experiment Runner (C8): walks the experiments manifest and, for
//! every experiment not yet done, spawns `num_workers` copies of the
//! `run-worker` binary as child processes, folds their streamed
//! JSON-lines outcomes into an aggregate, then marks the experiment done
//! (§4.8, §4.8.1).

use crate::error::{Error, Result};
use crate::manifest::ManifestStore;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Error as IoError, ErrorKind};
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// What to do with an experiment that was started but never finished.
/// The runner never reads stdin itself -- this is handed in by whatever
/// drives it (an interactive CLI prompt, or a `--on-unresolved` flag).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedDecision {
    Resume,
    Skip,
    Abort,
}

/// One line a worker process writes to its stdout per completed task
/// (§4.8.1): `{"domain": "...", "task_id": "...", "score": 0.0}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerEvent {
    pub domain: String,
    pub task_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ExperimentOutcome {
    pub completed: usize,
    pub scores: Vec<f64>,
}

impl ExperimentOutcome {
    pub fn success_rate(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().sum::<f64>() / self.scores.len() as f64
    }
}

/// One experiment's launch parameters, read out of its manifest entry by
/// the caller (the CLI) and handed to the runner.
pub struct ExperimentSpec {
    pub name: String,
    pub num_workers: u32,
    pub binary: PathBuf,
    /// Flags shared by every worker of this experiment, e.g.
    /// `--result-dir`, `--test-all-meta-path`, `--model`; the runner
    /// appends `--worker-id`/`--num-workers` itself, per child.
    pub worker_args: Vec<String>,
}

/// `Ok(true)` if `name` should be (re)launched now, `Ok(false)` if it's
/// already done or the operator chose to skip it.
fn should_launch(manifest: &ManifestStore, name: &str, decision: Option<UnresolvedDecision>) -> Result<bool> {
    if manifest.is_done(name)? {
        return Ok(false);
    }
    if manifest.is_unresolved(name)? {
        return match decision {
            Some(UnresolvedDecision::Resume) => Ok(true),
            Some(UnresolvedDecision::Skip) => Ok(false),
            Some(UnresolvedDecision::Abort) | None => Err(Error::UnresolvedExperiment(name.to_string())),
        };
    }
    Ok(true)
}

/// Runs every experiment in `specs` that isn't already done, skipping or
/// erroring out of unresolved ones per `decisions`, and returns each
/// launched experiment's aggregate outcome.
pub async fn run_experiments(
    manifest: &ManifestStore,
    specs: &[ExperimentSpec],
    decisions: &HashMap<String, UnresolvedDecision>,
) -> Result<Vec<(String, ExperimentOutcome)>> {
    let mut results = Vec::new();

    for spec in specs {
        if !should_launch(manifest, &spec.name, decisions.get(&spec.name).copied())? {
            continue;
        }

        manifest.mark_started(&spec.name, chrono::Utc::now())?;
        let outcome = launch_experiment(spec).await?;
        manifest.mark_done(&spec.name, chrono::Utc::now())?;

        tracing::info!(
            experiment = %spec.name,
            completed = outcome.completed,
            success_rate = outcome.success_rate(),
            "experiment finished"
        );
        results.push((spec.name.clone(), outcome));
    }

    Ok(results)
}

/// Spawns `spec.num_workers` `run-worker` child processes, reads each
/// one's stdout for `WorkerEvent` lines as they arrive, and waits for all
/// of them before returning the folded outcome.
async fn launch_experiment(spec: &ExperimentSpec) -> Result<ExperimentOutcome> {
    let mut readers = Vec::with_capacity(spec.num_workers as usize);

    for worker_id in 0..spec.num_workers {
        let mut child = Command::new(&spec.binary)
            .arg("run-worker")
            .args(&spec.worker_args)
            .arg("--worker-id")
            .arg(worker_id.to_string())
            .arg("--num-workers")
            .arg(spec.num_workers.to_string())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;

        let stdout = child.stdout.take().ok_or_else(|| {
            Error::Io(IoError::new(ErrorKind::Other, "child process stdout was not piped"))
        })?;

        readers.push(tokio::spawn(async move {
            let mut events = Vec::new();
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                match serde_json::from_str::<WorkerEvent>(&line) {
                    Ok(event) => events.push(event),
                    Err(err) => tracing::warn!(%line, ?err, "unparsable worker stdout line; ignoring"),
                }
            }
            let status = child.wait().await;
            (events, status)
        }));
    }

    let mut outcome = ExperimentOutcome::default();
    for reader in readers {
        let (events, status) = reader
            .await
            .map_err(|err| Error::Io(IoError::new(ErrorKind::Other, err.to_string())))?;

        match status {
            Ok(status) if !status.success() => {
                tracing::warn!(?status, "worker process exited with a non-zero status");
            }
            Err(err) => tracing::warn!(?err, "failed to wait on worker process"),
            Ok(_) => {}
        }

        for event in events {
            outcome.completed += 1;
            outcome.scores.push(event.score);
        }
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixed_time() -> chrono::DateTime<chrono::Utc> {
        chrono::DateTime::parse_from_rfc3339("2026-07-30T00:00:00Z").unwrap().with_timezone(&chrono::Utc)
    }

    #[test]
    fn unstarted_experiment_should_launch() {
        let dir = TempDir::new().unwrap();
        let manifest = ManifestStore::new(dir.path().join("manifest.json"));
        assert!(should_launch(&manifest, "exp-1", None).unwrap());
    }

    #[test]
    fn done_experiment_is_skipped() {
        let dir = TempDir::new().unwrap();
        let manifest = ManifestStore::new(dir.path().join("manifest.json"));
        manifest.mark_started("exp-1", fixed_time()).unwrap();
        manifest.mark_done("exp-1", fixed_time()).unwrap();
        assert!(!should_launch(&manifest, "exp-1", None).unwrap());
    }

    #[test]
    fn unresolved_without_a_decision_aborts() {
        let dir = TempDir::new().unwrap();
        let manifest = ManifestStore::new(dir.path().join("manifest.json"));
        manifest.mark_started("exp-1", fixed_time()).unwrap();
        assert!(matches!(should_launch(&manifest, "exp-1", None), Err(Error::UnresolvedExperiment(_))));
    }

    #[test]
    fn unresolved_with_skip_decision_is_skipped() {
        let dir = TempDir::new().unwrap();
        let manifest = ManifestStore::new(dir.path().join("manifest.json"));
        manifest.mark_started("exp-1", fixed_time()).unwrap();
        assert!(!should_launch(&manifest, "exp-1", Some(UnresolvedDecision::Skip)).unwrap());
    }

    #[test]
    fn unresolved_with_resume_decision_relaunches() {
        let dir = TempDir::new().unwrap();
        let manifest = ManifestStore::new(dir.path().join("manifest.json"));
        manifest.mark_started("exp-1", fixed_time()).unwrap();
        assert!(should_launch(&manifest, "exp-1", Some(UnresolvedDecision::Resume)).unwrap());
    }

    #[test]
    fn success_rate_is_mean_of_folded_scores() {
        let outcome = ExperimentOutcome { completed: 2, scores: vec![1.0, 0.0] };
        assert_eq!(outcome.success_rate(), 0.5);
    }
}
