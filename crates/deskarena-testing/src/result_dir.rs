//! A `tempfile`-backed stand-in for the `{result_root}/.../{task_id}`
//! layout `deskarena_core::path` computes, so recorder/engine tests can
//! assert on `traj.jsonl`/`traj.html`/`result.txt` without touching the
//! real result root.

use deskarena_core::{task_result_dir, ResultDirKey};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestResultRoot {
    root: TempDir,
}

impl TestResultRoot {
    pub fn new() -> Self {
        Self { root: TempDir::new().expect("create temp result root") }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// The directory one task's run would land in, created on demand.
    pub fn task_dir(&self, key: &ResultDirKey<'_>) -> PathBuf {
        let dir = task_result_dir(self.root.path(), key);
        fs::create_dir_all(&dir).expect("create task result dir");
        dir
    }

    pub fn result_value(&self, key: &ResultDirKey<'_>) -> Option<f64> {
        let path = task_result_dir(self.root.path(), key).join("result.txt");
        fs::read_to_string(path).ok().and_then(|s| s.trim().parse().ok())
    }

    pub fn trajectory_lines(&self, key: &ResultDirKey<'_>) -> Vec<String> {
        let path = task_result_dir(self.root.path(), key).join("traj.jsonl");
        match fs::read_to_string(path) {
            Ok(contents) => contents.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Default for TestResultRoot {
    fn default() -> Self {
        Self::new()
    }
}

/// A key for the scenario fixtures, stable across a test module's calls.
pub fn sample_key<'a>(task_id: &'a str) -> ResultDirKey<'a> {
    ResultDirKey {
        action_space: "default_action_space",
        observation_type: "screenshot",
        model: "test-model",
        trial_id: "trial",
        domain: "test_domain",
        task_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_dir_is_created_under_the_expected_layout() {
        let root = TestResultRoot::new();
        let key = sample_key("task-1");
        let dir = root.task_dir(&key);
        assert!(dir.starts_with(root.path()));
        assert!(dir.ends_with("default_action_space/screenshot/test-model/trial/test_domain/task-1"));
    }

    #[test]
    fn result_value_is_none_before_any_write() {
        let root = TestResultRoot::new();
        let key = sample_key("task-1");
        root.task_dir(&key);
        assert!(root.result_value(&key).is_none());
    }
}
