use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Resolve the result directory root based on priority:
/// 1. Explicit `--result-dir` path
/// 2. `DESKARENA_RESULT_DIR` environment variable
/// 3. XDG data directory (`<data_dir>/deskarena/results`)
/// 4. `~/.deskarena/results` (fallback)
pub fn resolve_result_root(explicit_path: Option<&str>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }
    if let Ok(env_path) = std::env::var("DESKARENA_RESULT_DIR") {
        return Ok(expand_tilde(&env_path));
    }
    if let Some(data_dir) = dirs::data_dir() {
        return Ok(data_dir.join("deskarena").join("results"));
    }
    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".deskarena").join("results"));
    }
    Err(Error::Config(
        "could not determine a result directory: no HOME or XDG data directory found".to_string(),
    ))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

/// `{result_root}/{action_space}/{observation_type}/{model}/{trial_id}/{domain}/{task_id}/`
/// per §6's "Persisted state layout".
#[derive(Debug, Clone)]
pub struct ResultDirKey<'a> {
    pub action_space: &'a str,
    pub observation_type: &'a str,
    pub model: &'a str,
    pub trial_id: &'a str,
    pub domain: &'a str,
    pub task_id: &'a str,
}

pub fn task_result_dir(result_root: &Path, key: &ResultDirKey) -> PathBuf {
    result_root
        .join(key.action_space)
        .join(key.observation_type)
        .join(key.model)
        .join(key.trial_id)
        .join(key.domain)
        .join(key.task_id)
}

/// A task's result directory is "complete" iff it exists and contains
/// `result.txt` (§4.7 step 3). Anything else present without that file is
/// a partial run left behind by a crashed worker.
pub fn is_task_complete(task_dir: &Path) -> bool {
    task_dir.join("result.txt").is_file()
}

/// `{tasks_dir}/examples/{domain}/{task_id}.json`, or `examples_noctxt`
/// under `--diff-lvl hard` (§6.1's `--diff_lvl` flag): the task config
/// layout the runner's `test_all_meta_path` sits alongside.
pub fn task_config_path(tasks_dir: &Path, domain: &str, task_id: &str, hard: bool) -> PathBuf {
    let examples_dir = if hard { "examples_noctxt" } else { "examples" };
    tasks_dir.join(examples_dir).join(domain).join(format!("{task_id}.json"))
}

/// Directory a `--test-all-meta-path` implies for `task_config_path`'s
/// `tasks_dir` when `--tasks-dir` isn't given explicitly: the parent of
/// the meta file itself, matching the original's convention of keeping
/// `test_all.json` alongside the `examples/` it indexes.
pub fn tasks_dir_from_meta_path(meta_path: &Path) -> PathBuf {
    meta_path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_path_wins() {
        let root = resolve_result_root(Some("/tmp/explicit")).unwrap();
        assert_eq!(root, PathBuf::from("/tmp/explicit"));
    }

    #[test]
    fn tilde_expansion() {
        if let Some(home) = std::env::var_os("HOME") {
            let expanded = expand_tilde("~/foo/bar");
            assert_eq!(expanded, PathBuf::from(home).join("foo/bar"));
        }
    }

    #[test]
    fn task_result_dir_layout() {
        let root = PathBuf::from("/results");
        let key = ResultDirKey {
            action_space: "pyautogui",
            observation_type: "screenshot",
            model: "gpt4",
            trial_id: "trial1",
            domain: "chrome",
            task_id: "abc-123",
        };
        let dir = task_result_dir(&root, &key);
        assert_eq!(
            dir,
            PathBuf::from("/results/pyautogui/screenshot/gpt4/trial1/chrome/abc-123")
        );
    }

    #[test]
    fn task_config_path_uses_examples_for_normal_difficulty() {
        let dir = PathBuf::from("/tasks");
        let path = task_config_path(&dir, "chrome", "abc-123", false);
        assert_eq!(path, PathBuf::from("/tasks/examples/chrome/abc-123.json"));
    }

    #[test]
    fn task_config_path_uses_examples_noctxt_for_hard_difficulty() {
        let dir = PathBuf::from("/tasks");
        let path = task_config_path(&dir, "chrome", "abc-123", true);
        assert_eq!(path, PathBuf::from("/tasks/examples_noctxt/chrome/abc-123.json"));
    }

    #[test]
    fn tasks_dir_from_meta_path_is_the_parent_directory() {
        let meta = PathBuf::from("/data/evaluation_examples_windows/test_all.json");
        assert_eq!(tasks_dir_from_meta_path(&meta), PathBuf::from("/data/evaluation_examples_windows"));
    }

    #[test]
    fn completeness_requires_result_txt() {
        let dir = TempDir::new().unwrap();
        assert!(!is_task_complete(dir.path()));
        std::fs::write(dir.path().join("result.txt"), "1.0").unwrap();
        assert!(is_task_complete(dir.path()));
    }
}
