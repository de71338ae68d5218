//! `deskarena run-worker` (C7+C4): partitions one worker's share of
//! `test_all_meta_path`, loads each task's JSON config, and drives the
//! episode engine over them, streaming a `WorkerEvent` JSON line per
//! completed task to stdout for a parent `run-experiments` process to
//! fold (§4.8.1).

use crate::args::{A11yBackendArg, DiffLvlArg, SomOriginArg};
use anyhow::{Context, Result};
use deskarena_core::{task_config_path, tasks_dir_from_meta_path, DiffLevel, Settings};
use deskarena_engine::{Agent, NoopAgent, ResetBackend};
use deskarena_guestio::{GuestClient, VmController};
use deskarena_orchestrator::{flatten, parse_meta, partition_for_worker, run_worker, TaskRef, WorkerConfig};
use deskarena_types::task::Task;
use std::path::{Path, PathBuf};

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    worker_id: usize,
    num_workers: usize,
    result_dir: String,
    test_all_meta_path: String,
    tasks_dir: Option<String>,
    agent_name: String,
    model: String,
    action_space: String,
    observation_type: String,
    trial_id: String,
    domain: Option<String>,
    config: Option<String>,
    max_steps: Option<u32>,
    sleep_after_execution: Option<f64>,
    screen_width: Option<u32>,
    screen_height: Option<u32>,
    emulator_ip: Option<String>,
    guest_port: Option<u16>,
    a11y_backend: Option<A11yBackendArg>,
    som_origin: Option<SomOriginArg>,
    diff_lvl: Option<DiffLvlArg>,
    vmctl_host: Option<String>,
    vmctl_port: u16,
) -> Result<()> {
    let mut settings = Settings::load(config.as_deref()).context("loading settings")?;
    if let Some(v) = max_steps {
        settings.max_steps = v;
    }
    if let Some(v) = sleep_after_execution {
        settings.sleep_after_execution_secs = v;
    }
    if let Some(v) = screen_width {
        settings.screen_width = v;
    }
    if let Some(v) = screen_height {
        settings.screen_height = v;
    }
    if let Some(v) = emulator_ip {
        settings.emulator_ip = v;
    }
    if let Some(v) = guest_port {
        settings.guest_port = v;
    }
    if let Some(v) = a11y_backend {
        settings.a11y_backend = v.into();
    }
    if let Some(v) = som_origin {
        settings.som_origin = v.into();
    }
    if let Some(v) = diff_lvl {
        settings.diff_lvl = v.into();
    }

    let meta_path = PathBuf::from(&test_all_meta_path);
    let tasks_dir = tasks_dir.map(PathBuf::from).unwrap_or_else(|| tasks_dir_from_meta_path(&meta_path));

    let raw = std::fs::read_to_string(&meta_path)
        .with_context(|| format!("reading test_all_meta_path {}", meta_path.display()))?;
    let meta = parse_meta(&serde_json::from_str(&raw)?, domain.as_deref());
    let all_tasks = flatten(&meta);
    let my_tasks = partition_for_worker(&all_tasks, worker_id, num_workers);

    tracing::info!(worker_id, num_workers, assigned = my_tasks.len(), "partitioned task list");

    let hard = matches!(settings.diff_lvl, DiffLevel::Hard);
    let loaded = load_tasks(&tasks_dir, &my_tasks, hard);

    let client = GuestClient::with_port(&settings.emulator_ip, settings.guest_port);
    let vm_controller = vmctl_host.map(|host| VmController::new(host, vmctl_port));
    let reset_backend = match &vm_controller {
        Some(vm) => ResetBackend::Local(vm),
        None => ResetBackend::Remote,
    };

    let mut agent = build_agent(&agent_name);

    let worker_config = WorkerConfig {
        result_root: PathBuf::from(&result_dir),
        action_space,
        observation_type,
        model,
        trial_id,
        settings,
    };

    let summary = run_worker(&worker_config, &loaded, &client, reset_backend, agent.as_mut(), |task_ref, score| {
        let line = serde_json::json!({ "domain": task_ref.domain, "task_id": task_ref.task_id, "score": score });
        println!("{line}");
    })
    .await
    .context("running worker's task partition")?;

    tracing::info!(
        completed = summary.completed,
        skipped = summary.skipped,
        success_rate = summary.success_rate(),
        "worker finished"
    );

    Ok(())
}

/// Reads each assigned task's JSON config, logging and skipping (not
/// aborting the worker) any single task whose file is missing or
/// malformed -- a config fault is scoped to that one task, not the whole
/// run (§7 propagation policy).
fn load_tasks(tasks_dir: &Path, refs: &[TaskRef], hard: bool) -> Vec<(TaskRef, Task)> {
    let mut loaded = Vec::with_capacity(refs.len());
    for task_ref in refs {
        let path = task_config_path(tasks_dir, &task_ref.domain, &task_ref.task_id, hard);
        match std::fs::read_to_string(&path).map_err(anyhow::Error::from).and_then(|s| Ok(Task::from_json_str(&s)?)) {
            Ok(task) => loaded.push((task_ref.clone(), task)),
            Err(err) => {
                tracing::error!(domain = %task_ref.domain, task_id = %task_ref.task_id, %err, "skipping task: could not load config");
            }
        }
    }
    loaded
}

/// Resolves the `--agent-name` flag to an `Agent` implementation. Only the
/// reference doubles from `deskarena-engine::agent` (§4.4.1) are wired
/// here; a real screen-parsing/LLM-backed agent is expected to live in an
/// external crate and be plugged in by a fork of this function.
fn build_agent(name: &str) -> Box<dyn Agent> {
    match name {
        "noop" => Box::new(NoopAgent),
        other => {
            tracing::warn!(agent_name = other, "unrecognized agent name; falling back to NoopAgent");
            Box::new(NoopAgent)
        }
    }
}
