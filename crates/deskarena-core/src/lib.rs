//! Shared path/layout resolution and run configuration for the deskarena
//! workspace, grounded on `agtrace-core`'s tilde/XDG path resolution and
//! `agtrace-runtime::config`'s TOML-backed config loading.

pub mod error;
pub mod path;
pub mod settings;

pub use error::{Error, Result};
pub use path::{
    expand_tilde, is_task_complete, resolve_result_root, task_config_path, task_result_dir,
    tasks_dir_from_meta_path, ResultDirKey,
};
pub use settings::{A11yBackend, DiffLevel, Settings, SomOrigin};
