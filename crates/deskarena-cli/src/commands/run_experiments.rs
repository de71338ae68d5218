//! `deskarena run-experiments` (C8): walks the manifest, resolves each
//! unresolved experiment interactively (or via `--on-unresolved`), and
//! hands the rest to `deskarena_orchestrator::run_experiments`, which
//! spawns this same binary's `run-worker` subcommand per worker (§4.8).

use crate::args::OnUnresolved;
use anyhow::{Context, Result};
use deskarena_orchestrator::{run_experiments, ExperimentSpec, ManifestStore, UnresolvedDecision};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::{self, Write};

/// An experiment manifest entry's config (§6's "Persisted state layout" --
/// everything but the reserved `_`-prefixed fields, which `ManifestStore`
/// owns). Deserialized straight from the `Value` `ManifestStore::config`
/// returns; unrecognized keys (including the reserved ones) are ignored.
#[derive(Debug, Deserialize)]
struct ExperimentConfig {
    num_workers: u32,
    result_dir: String,
    test_all_meta_path: String,
    #[serde(default)]
    tasks_dir: Option<String>,
    #[serde(default = "default_agent_name")]
    agent_name: String,
    #[serde(default = "default_model")]
    model: String,
    #[serde(default = "default_action_space")]
    action_space: String,
    #[serde(default = "default_observation_type")]
    observation_type: String,
    #[serde(default = "default_trial_id")]
    trial_id: String,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    max_steps: Option<u32>,
    #[serde(default)]
    sleep_after_execution: Option<f64>,
    #[serde(default)]
    screen_width: Option<u32>,
    #[serde(default)]
    screen_height: Option<u32>,
    #[serde(default)]
    emulator_ip: Option<String>,
    #[serde(default)]
    guest_port: Option<u16>,
    #[serde(default)]
    a11y_backend: Option<String>,
    #[serde(default)]
    som_origin: Option<String>,
    #[serde(default)]
    diff_lvl: Option<String>,
    #[serde(default)]
    vmctl_host: Option<String>,
    #[serde(default)]
    vmctl_port: Option<u16>,
}

fn default_agent_name() -> String {
    "noop".to_string()
}
fn default_model() -> String {
    "default".to_string()
}
fn default_action_space() -> String {
    "default_action_space".to_string()
}
fn default_observation_type() -> String {
    "screenshot".to_string()
}
fn default_trial_id() -> String {
    "trial".to_string()
}

pub async fn execute(manifest_path: String, config: Option<String>, on_unresolved: Option<OnUnresolved>) -> Result<()> {
    let manifest = ManifestStore::new(&manifest_path);
    let binary = std::env::current_exe().context("resolving this binary's own path to spawn workers")?;

    let mut specs = Vec::new();
    let mut decisions = HashMap::new();

    for name in manifest.names().context("reading experiment names from manifest")? {
        if manifest.is_unresolved(&name)? {
            let decision = match on_unresolved {
                Some(flag) => to_orchestrator_decision(flag),
                None => prompt_unresolved(&name)?,
            };
            decisions.insert(name.clone(), decision);
        }

        let raw = manifest.config(&name).with_context(|| format!("reading config for experiment '{name}'"))?;
        let cfg: ExperimentConfig = serde_json::from_value(raw)
            .with_context(|| format!("experiment '{name}' config does not match the expected shape"))?;

        specs.push(ExperimentSpec {
            name: name.clone(),
            num_workers: cfg.num_workers,
            binary: binary.clone(),
            worker_args: build_worker_args(&cfg, config.as_deref()),
        });
    }

    let results = run_experiments(&manifest, &specs, &decisions).await.context("running experiments")?;

    for (name, outcome) in &results {
        println!("{name}: completed={} success_rate={:.3}", outcome.completed, outcome.success_rate());
    }

    Ok(())
}

fn to_orchestrator_decision(flag: OnUnresolved) -> UnresolvedDecision {
    match flag {
        OnUnresolved::Resume => UnresolvedDecision::Resume,
        OnUnresolved::Skip => UnresolvedDecision::Skip,
        OnUnresolved::Abort => UnresolvedDecision::Abort,
    }
}

/// Asks the operator how to proceed with a started-but-unfinished
/// experiment, matching `agtrace-cli`'s `confirm_kill` y/N prompt idiom.
fn prompt_unresolved(name: &str) -> Result<UnresolvedDecision> {
    print!("Experiment '{name}' was started but never finished. Resume, skip, or abort? [r/s/A]: ");
    io::stdout().flush().ok();
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(match input.trim().to_lowercase().as_str() {
        "r" | "resume" => UnresolvedDecision::Resume,
        "s" | "skip" => UnresolvedDecision::Skip,
        _ => UnresolvedDecision::Abort,
    })
}

fn build_worker_args(cfg: &ExperimentConfig, shared_config: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "--result-dir".to_string(),
        cfg.result_dir.clone(),
        "--test-all-meta-path".to_string(),
        cfg.test_all_meta_path.clone(),
        "--agent-name".to_string(),
        cfg.agent_name.clone(),
        "--model".to_string(),
        cfg.model.clone(),
        "--action-space".to_string(),
        cfg.action_space.clone(),
        "--observation-type".to_string(),
        cfg.observation_type.clone(),
        "--trial-id".to_string(),
        cfg.trial_id.clone(),
    ];

    let mut push_opt = |flag: &str, value: &Option<String>| {
        if let Some(v) = value {
            args.push(flag.to_string());
            args.push(v.clone());
        }
    };
    push_opt("--tasks-dir", &cfg.tasks_dir);
    push_opt("--domain", &cfg.domain);
    push_opt("--emulator-ip", &cfg.emulator_ip);
    push_opt("--a11y-backend", &cfg.a11y_backend);
    push_opt("--som-origin", &cfg.som_origin);
    push_opt("--diff-lvl", &cfg.diff_lvl);
    push_opt("--vmctl-host", &cfg.vmctl_host);

    if let Some(v) = cfg.max_steps {
        args.push("--max-steps".to_string());
        args.push(v.to_string());
    }
    if let Some(v) = cfg.sleep_after_execution {
        args.push("--sleep-after-execution".to_string());
        args.push(v.to_string());
    }
    if let Some(v) = cfg.screen_width {
        args.push("--screen-width".to_string());
        args.push(v.to_string());
    }
    if let Some(v) = cfg.screen_height {
        args.push("--screen-height".to_string());
        args.push(v.to_string());
    }
    if let Some(v) = cfg.guest_port {
        args.push("--guest-port".to_string());
        args.push(v.to_string());
    }
    if let Some(v) = cfg.vmctl_port {
        args.push("--vmctl-port".to_string());
        args.push(v.to_string());
    }
    if let Some(path) = shared_config {
        args.push("--config".to_string());
        args.push(path.to_string());
    }

    args
}
