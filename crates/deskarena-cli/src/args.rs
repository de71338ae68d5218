use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;

// NOTE: Command Organization Rationale
//
// Why two subcommands instead of namespaced ones?
// - C7 (worker orchestrator) and C8 (experiment runner) are the only two
//   processes this binary ever is; `list-tasks` is a read-only debugging
//   helper alongside them. A flat `run-experiments`/`run-worker`/
//   `list-tasks` surface matches the three real invocations operators make.

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum OnUnresolved {
    Resume,
    Skip,
    Abort,
}

/// CLI-facing mirror of `deskarena_core::A11yBackend`: `deskarena-core`
/// stays a plain `serde`/`toml` crate with no `clap` dependency, so the
/// value parsing lives here and is translated in `commands::run_worker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum A11yBackendArg {
    Uia,
    Win32,
}

impl From<A11yBackendArg> for deskarena_core::A11yBackend {
    fn from(value: A11yBackendArg) -> Self {
        match value {
            A11yBackendArg::Uia => deskarena_core::A11yBackend::Uia,
            A11yBackendArg::Win32 => deskarena_core::A11yBackend::Win32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum SomOriginArg {
    Oss,
    A11y,
    MixedOss,
    Omni,
    MixedOmni,
}

impl From<SomOriginArg> for deskarena_core::SomOrigin {
    fn from(value: SomOriginArg) -> Self {
        match value {
            SomOriginArg::Oss => deskarena_core::SomOrigin::Oss,
            SomOriginArg::A11y => deskarena_core::SomOrigin::A11y,
            SomOriginArg::MixedOss => deskarena_core::SomOrigin::MixedOss,
            SomOriginArg::Omni => deskarena_core::SomOrigin::Omni,
            SomOriginArg::MixedOmni => deskarena_core::SomOrigin::MixedOmni,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum DiffLvlArg {
    Normal,
    Hard,
}

impl From<DiffLvlArg> for deskarena_core::DiffLevel {
    fn from(value: DiffLvlArg) -> Self {
        match value {
            DiffLvlArg::Normal => deskarena_core::DiffLevel::Normal,
            DiffLvlArg::Hard => deskarena_core::DiffLevel::Hard,
        }
    }
}

#[derive(Parser)]
#[command(name = "deskarena")]
#[command(about = "Benchmark harness for autonomous GUI agents on virtualised Windows desktops", long_about = None)]
#[command(version)]
pub struct Cli {
    #[arg(long, default_value = "info", global = true)]
    pub log_level: LogLevel,

    #[arg(long, default_value = "pretty", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run every not-yet-done experiment in a manifest, spawning worker processes per experiment")]
    RunExperiments {
        #[arg(long)]
        manifest: String,

        #[arg(long)]
        config: Option<String>,

        /// Decision applied to every unresolved (started-but-not-finished)
        /// experiment without prompting the operator.
        #[arg(long, value_enum)]
        on_unresolved: Option<OnUnresolved>,
    },

    #[command(about = "Run one worker's partition of tasks against a single VM (the entry point the runner itself spawns)")]
    RunWorker {
        #[arg(long)]
        worker_id: usize,

        #[arg(long)]
        num_workers: usize,

        #[arg(long)]
        result_dir: String,

        #[arg(long)]
        test_all_meta_path: String,

        #[arg(long)]
        tasks_dir: Option<String>,

        #[arg(long, default_value = "noop")]
        agent_name: String,

        #[arg(long, default_value = "default")]
        model: String,

        #[arg(long, default_value = "default_action_space")]
        action_space: String,

        #[arg(long, default_value = "screenshot")]
        observation_type: String,

        #[arg(long, default_value = "trial")]
        trial_id: String,

        #[arg(long)]
        domain: Option<String>,

        #[arg(long)]
        config: Option<String>,

        #[arg(long)]
        max_steps: Option<u32>,

        #[arg(long)]
        sleep_after_execution: Option<f64>,

        #[arg(long)]
        screen_width: Option<u32>,

        #[arg(long)]
        screen_height: Option<u32>,

        #[arg(long)]
        emulator_ip: Option<String>,

        #[arg(long)]
        guest_port: Option<u16>,

        #[arg(long, value_enum)]
        a11y_backend: Option<A11yBackendArg>,

        #[arg(long, value_enum)]
        som_origin: Option<SomOriginArg>,

        #[arg(long, value_enum)]
        diff_lvl: Option<DiffLvlArg>,

        /// Hypervisor control channel host for `ResetBackend::Local`. When
        /// absent, RESET falls back to `ResetBackend::Remote` (§4.2.1).
        #[arg(long)]
        vmctl_host: Option<String>,

        #[arg(long, default_value_t = 4444)]
        vmctl_port: u16,
    },

    #[command(about = "Print the flattened, per-worker partitioned task list without spinning up any VMs")]
    ListTasks {
        #[arg(long)]
        test_all_meta_path: String,

        #[arg(long)]
        domain: Option<String>,

        #[arg(long, default_value_t = 1)]
        num_workers: usize,
    },
}
