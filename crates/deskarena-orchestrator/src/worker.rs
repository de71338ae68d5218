//! The Worker Orchestrator (C7): iterates one worker's partition of tasks,
//! skipping completed ones, driving the episode engine for the rest, and
//! folding the results into an aggregate success rate (§4.7).

use crate::error::Result;
use crate::partition::TaskRef;
use deskarena_core::path::{is_task_complete, task_result_dir, ResultDirKey};
use deskarena_core::Settings;
use deskarena_engine::{run_episode, Agent, ResetBackend};
use deskarena_guestio::GuestClient;
use deskarena_recorder::TrajectoryWriter;
use deskarena_types::task::Task;
use deskarena_types::trajectory::{ActionTimestamp, StepInfo, StepRecord};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub struct WorkerConfig {
    pub result_root: PathBuf,
    pub action_space: String,
    pub observation_type: String,
    pub model: String,
    pub trial_id: String,
    pub settings: Settings,
}

#[derive(Debug, Clone, Default)]
pub struct WorkerSummary {
    pub completed: usize,
    pub skipped: usize,
    pub scores: Vec<f64>,
}

impl WorkerSummary {
    pub fn success_rate(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().sum::<f64>() / self.scores.len() as f64
    }
}

/// Runs every `(TaskRef, Task)` pair this worker owns. A task whose result
/// directory already contains `result.txt` is skipped; a partially
/// complete directory is wiped and rerun, since partition guarantees no
/// other worker ever touches the same task id.
pub async fn run_worker(
    config: &WorkerConfig,
    tasks: &[(TaskRef, Task)],
    client: &GuestClient,
    reset_backend: ResetBackend<'_>,
    agent: &mut dyn Agent,
    mut on_task_done: impl FnMut(&TaskRef, f64),
) -> Result<WorkerSummary> {
    let mut summary = WorkerSummary::default();

    for (task_ref, task) in tasks {
        let key = ResultDirKey {
            action_space: &config.action_space,
            observation_type: &config.observation_type,
            model: &config.model,
            trial_id: &config.trial_id,
            domain: &task_ref.domain,
            task_id: &task_ref.task_id,
        };
        let dir = task_result_dir(&config.result_root, &key);

        if is_task_complete(&dir) {
            summary.skipped += 1;
            continue;
        }
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        std::fs::create_dir_all(&dir)?;

        let mut recorder = TrajectoryWriter::open(&dir)?;
        // `run_episode` already writes `result.txt` on success; on an
        // uncaught error it never gets that far, so this path writes it here.
        let score = match run_episode(client, reset_backend, &config.settings, task, agent, &mut recorder).await {
            Ok(outcome) => outcome.score,
            Err(err) => {
                tracing::error!(?err, task_id = %task_ref.task_id, "uncaught error during episode; scoring 0 and moving on");
                record_exception(&mut recorder, &err)?;
                recorder.write_result(0.0)?;
                0.0
            }
        };
        summary.completed += 1;
        summary.scores.push(score);
        on_task_done(task_ref, score);
    }

    Ok(summary)
}

/// §4.4 Rules: an uncaught exception during an episode writes the
/// exception/traceback to the trajectory files rather than aborting the
/// worker, and the task still scores 0 via `result.txt`.
fn record_exception(recorder: &mut TrajectoryWriter, err: &deskarena_engine::Error) -> Result<()> {
    let mut traceback = String::new();
    let mut cause = std::error::Error::source(err);
    while let Some(source) = cause {
        traceback.push_str(&format!("caused by: {source}\n"));
        cause = source.source();
    }

    let record = StepRecord {
        step_num: 0,
        action_timestamp: ActionTimestamp::from_datetime(&chrono::Utc::now()),
        action: None,
        reward: None,
        done: true,
        info: StepInfo {
            exception: Some(err.to_string()),
            traceback: if traceback.is_empty() { None } else { Some(traceback) },
            ..StepInfo::default()
        },
        agent_log: None,
    };
    recorder.record_step(record, BTreeMap::new())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn record_exception_writes_a_done_step_with_the_exception_message() {
        let dir = TempDir::new().unwrap();
        let mut recorder = TrajectoryWriter::open(dir.path()).unwrap();
        let err = deskarena_engine::Error::ResetTimedOut;

        record_exception(&mut recorder, &err).unwrap();

        let content = std::fs::read_to_string(dir.path().join("traj.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 1);
        let parsed: serde_json::Value = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(parsed["done"], true);
        assert_eq!(parsed["info"]["exception"], "guest did not become ready after RESET");
    }

    #[test]
    fn success_rate_is_mean_of_recorded_scores() {
        let summary = WorkerSummary { completed: 2, skipped: 0, scores: vec![1.0, 0.0] };
        assert_eq!(summary.success_rate(), 0.5);
    }

    #[test]
    fn success_rate_is_zero_with_no_scores() {
        assert_eq!(WorkerSummary::default().success_rate(), 0.0);
    }
}
