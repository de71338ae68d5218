//! The episode state machine: RESET -> SETUP -> OBSERVE -> (PREDICT ->
//! ACT_AND_OBSERVE)* -> EVALUATE -> DONE (§4.4).

use crate::agent::Agent;
use crate::error::{Error, Result};
use deskarena_core::Settings;
use deskarena_evaluators::evaluate as run_evaluator;
use deskarena_guestio::{dispatch, GuestClient, VmController};
use deskarena_recorder::{RecordedValue, TrajectoryWriter};
use deskarena_types::action::Action;
use deskarena_types::observation::Observation;
use deskarena_types::task::Task;
use deskarena_types::trajectory::{ActionTimestamp, StepInfo, StepRecord};
use std::collections::BTreeMap;
use std::time::Duration;

/// Which backend RESET uses to get the guest back to a known state.
#[derive(Clone, Copy)]
pub enum ResetBackend<'a> {
    /// A hypervisor control channel is available: RESET restores
    /// `task.snapshot` via `loadvm`.
    Local(&'a VmController),
    /// No hypervisor channel: RESET invokes `close_all` on the guest as a
    /// best-effort substitute.
    Remote,
}

pub struct EpisodeOutcome {
    pub score: f64,
    pub steps_taken: u32,
}

/// Runs one task end to end against a live guest connection, recording
/// every step, and returns the final score.
pub async fn run_episode(
    client: &GuestClient,
    reset_backend: ResetBackend<'_>,
    settings: &Settings,
    task: &Task,
    agent: &mut dyn Agent,
    recorder: &mut TrajectoryWriter,
) -> Result<EpisodeOutcome> {
    reset(client, reset_backend, &task.snapshot, settings).await?;
    setup(client, task).await;
    agent.reset();

    let mut last_action: Option<Action> = None;
    let mut step_num: u32 = 0;
    let mut done = false;

    let mut obs = fetch_observation(client, &task.instruction, settings).await;

    let reset_record = StepRecord {
        step_num: 0,
        action_timestamp: ActionTimestamp::from_datetime(&now()),
        action: None,
        reward: None,
        done: false,
        info: StepInfo::default(),
        agent_log: None,
    };
    recorder.record_step(reset_record, observation_to_recorded(&obs))?;

    while !done && step_num < settings.max_steps {
        let prediction = agent.predict(&task.instruction, &obs);

        if let Some(update) = &prediction.computer_update {
            let payload = deskarena_guestio::ComputerUpdatePayload {
                rects: update.rects.iter().map(|r| serde_json::to_value(r).unwrap_or_default()).collect(),
                window_rect: update.window_rect.as_ref().map(|r| serde_json::to_value(r).unwrap_or_default()),
                screenshot: String::new(),
                scale: update.scale,
                clipboard_content: update.clipboard.clone(),
                swap_ctrl_alt: false,
            };
            if let Err(err) = client.update_computer(&payload).await {
                tracing::warn!(?err, "failed to forward computer_update to guest");
            }
        }

        for action in &prediction.actions {
            last_action = Some(action.clone());
            let mut info = StepInfo::default();

            match action {
                Action::Wait => {
                    tokio::time::sleep(Duration::from_secs_f64(settings.wait_pause_secs)).await;
                }
                Action::Fail => {
                    done = true;
                    info.fail = true;
                }
                Action::Done => {
                    done = true;
                    info.done = true;
                }
                _ => {
                    if let Err(err) = dispatch_and_execute(client, action).await {
                        tracing::warn!(?err, "action dispatch failed");
                        info.exception = Some(err.to_string());
                    }
                    tokio::time::sleep(Duration::from_secs_f64(settings.sleep_after_execution_secs)).await;
                }
            }

            obs = fetch_observation(client, &task.instruction, settings).await;
            step_num += 1;

            let record = StepRecord {
                step_num,
                action_timestamp: ActionTimestamp::from_datetime(&now()),
                action: Some(action.clone()),
                reward: None,
                done,
                info,
                agent_log: Some(prediction.logs.clone()),
            };
            let observation_values = observation_to_recorded(&obs);
            recorder.record_step(record, observation_values)?;

            if done || step_num >= settings.max_steps {
                break;
            }
        }

        if prediction.actions.is_empty() {
            // No actions at all this turn: still counts toward the budget
            // so a silent agent can't loop forever, and still gets its own
            // trajectory record so traj.jsonl grows by one line per step.
            step_num += 1;
            let record = StepRecord {
                step_num,
                action_timestamp: ActionTimestamp::from_datetime(&now()),
                action: None,
                reward: None,
                done,
                info: StepInfo::default(),
                agent_log: Some(prediction.logs.clone()),
            };
            recorder.record_step(record, observation_to_recorded(&obs))?;
        }
    }

    let score = evaluate(client, task, last_action.as_ref()).await?;
    recorder.write_result(score)?;

    Ok(EpisodeOutcome { score, steps_taken: step_num })
}

async fn reset(client: &GuestClient, backend: ResetBackend<'_>, snapshot: &str, settings: &Settings) -> Result<()> {
    match backend {
        ResetBackend::Local(vm) => {
            if let Err(err) = vm.loadvm(snapshot).await {
                tracing::warn!(?err, snapshot, "failed to restore snapshot; continuing best-effort");
            }
        }
        ResetBackend::Remote => {
            if let Err(err) = client.setup("close_all", serde_json::json!({})).await {
                tracing::warn!(?err, "close_all fallback failed during RESET; continuing best-effort");
            }
        }
    }

    for _ in 0..settings.probe_poll_attempts {
        if client.probe().await.unwrap_or(false) {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_secs(settings.probe_poll_interval_secs)).await;
    }
    Err(Error::ResetTimedOut)
}

/// Applies `task.config[]`: a setter that raises does not abort the
/// episode (§4.4 Rules) -- this loop logs and proceeds past failures.
async fn setup(client: &GuestClient, task: &Task) {
    for directive in &task.config {
        if let Err(err) = deskarena_guestio::setup::apply_directive(client, directive).await {
            tracing::warn!(?err, directive = %directive.kind, "setup directive failed; proceeding best-effort");
        }
    }
}

async fn dispatch_and_execute(client: &GuestClient, action: &Action) -> Result<()> {
    if let Some(code) = dispatch::render_action(action)? {
        client.execute_windows(&code).await?;
    }
    Ok(())
}

async fn fetch_observation(client: &GuestClient, instruction: &str, settings: &Settings) -> Observation {
    for attempt in 0..settings.observation_retry_attempts.max(1) {
        let obs = build_observation(client, instruction, settings).await;
        if !obs.is_null() {
            return obs;
        }
        if attempt + 1 < settings.observation_retry_attempts {
            tokio::time::sleep(Duration::from_secs(settings.probe_poll_interval_secs)).await;
        }
    }
    build_observation(client, instruction, settings).await
}

async fn build_observation(client: &GuestClient, instruction: &str, settings: &Settings) -> Observation {
    let mut obs = Observation { instruction: instruction.to_string(), ..Default::default() };

    if let Ok(bytes) = client.screenshot().await {
        obs.screenshot = Some(bytes);
    }
    if let Ok(Some(terminal)) = client.terminal_output().await {
        obs.terminal = Some(terminal);
    }
    if let Ok(wa) = client.obs_winagent().await {
        obs.window_image = Some(wa.image);
        obs.window_title = wa.window_title;
        obs.clipboard = wa.computer_clipboard;
        if let Some(names) = wa.window_names_str {
            obs.visible_windows = names.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect();
        }
    }
    if settings.som_origin.requires_a11y_tree() {
        match client.accessibility_tree(Some(settings.a11y_backend.wire_tag())).await {
            Ok(tree) => obs.accessibility_tree = tree,
            Err(err) => tracing::warn!(?err, "failed to fetch accessibility tree"),
        }
    }

    obs
}

fn observation_to_recorded(obs: &Observation) -> BTreeMap<String, RecordedValue> {
    let mut map = BTreeMap::new();
    if let Some(bytes) = &obs.screenshot {
        map.insert("screenshot".to_string(), RecordedValue::Image(bytes.clone()));
    }
    if let Some(bytes) = &obs.window_image {
        map.insert("window_image".to_string(), RecordedValue::Image(bytes.clone()));
    }
    if let Some(tree) = &obs.accessibility_tree {
        map.insert("accessibility_tree".to_string(), RecordedValue::Text(tree.clone()));
    }
    if let Some(terminal) = &obs.terminal {
        map.insert("terminal".to_string(), RecordedValue::Text(terminal.clone()));
    }
    map
}

/// Implements §4.4 Rules: `infeasible` scores 1 iff the last action was
/// `FAIL`; otherwise a `FAIL` last action scores 0 without calling the
/// metric; otherwise the evaluator kernel decides.
async fn evaluate(client: &GuestClient, task: &Task, last_action: Option<&Action>) -> Result<f64> {
    let last_was_fail = matches!(last_action, Some(Action::Fail));

    if task.evaluator.is_infeasible() {
        return Ok(if last_was_fail { 1.0 } else { 0.0 });
    }
    if last_was_fail {
        return Ok(0.0);
    }

    Ok(run_evaluator(client, &task.evaluator).await?)
}

fn now() -> chrono::DateTime<chrono::Utc> {
    chrono::Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_to_recorded_only_includes_present_fields() {
        let obs = Observation { terminal: Some("ok".to_string()), ..Default::default() };
        let recorded = observation_to_recorded(&obs);
        assert_eq!(recorded.len(), 1);
        assert!(recorded.contains_key("terminal"));
    }
}
