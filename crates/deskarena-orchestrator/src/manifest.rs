//! The experiments manifest (§4.8.1): one `ManifestStore` owns the JSON
//! file; every mutation is a read-modify-write guarded by an advisory lock
//! on a sidecar `.lock` file. Worker subprocesses never touch this file --
//! only the Experiment Runner process does.

use crate::error::Result;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde_json::{Map, Value};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

pub struct ManifestStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let lock_path = path.with_extension("json.lock");
        Self { path, lock_path }
    }

    fn read(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }

    fn write(&self, manifest: &Map<String, Value>) -> Result<()> {
        let content = serde_json::to_string_pretty(manifest)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn with_lock<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Map<String, Value>) -> Result<T>,
    {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let lock_file: File = OpenOptions::new().create(true).write(true).open(&self.lock_path)?;
        lock_file.lock_exclusive()?;

        let mut manifest = self.read()?;
        let result = f(&mut manifest);
        if result.is_ok() {
            self.write(&manifest)?;
        }

        fs2::FileExt::unlock(&lock_file)?;
        result
    }

    /// Whether `name` exists in the manifest and has `_done == true`.
    pub fn is_done(&self, name: &str) -> Result<bool> {
        let manifest = self.read()?;
        Ok(manifest
            .get(name)
            .and_then(|entry| entry.get("_done"))
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }

    /// An experiment that has `_start_time` but no `_done == true` was
    /// interrupted mid-run (§4.8: "prompt the operator to resume, skip, or
    /// abort").
    pub fn is_unresolved(&self, name: &str) -> Result<bool> {
        let manifest = self.read()?;
        let Some(entry) = manifest.get(name) else { return Ok(false) };
        let started = entry.get("_start_time").is_some();
        let done = entry.get("_done").and_then(Value::as_bool).unwrap_or(false);
        Ok(started && !done)
    }

    pub fn names(&self) -> Result<Vec<String>> {
        Ok(self.read()?.keys().cloned().collect())
    }

    /// The experiment's launch config exactly as stored, reserved `_`
    /// fields included; callers that only want the operator-supplied
    /// fields should ignore keys starting with `_`.
    pub fn config(&self, name: &str) -> Result<Value> {
        Ok(self.read()?.get(name).cloned().unwrap_or(Value::Object(Map::new())))
    }

    pub fn mark_started(&self, name: &str, at: DateTime<Utc>) -> Result<()> {
        self.with_lock(|manifest| {
            let entry = manifest.entry(name.to_string()).or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(map) = entry {
                map.insert("_start_time".to_string(), Value::String(at.to_rfc3339()));
            }
            Ok(())
        })
    }

    pub fn mark_done(&self, name: &str, at: DateTime<Utc>) -> Result<()> {
        self.with_lock(|manifest| {
            let entry = manifest.entry(name.to_string()).or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(map) = entry {
                map.insert("_stop_time".to_string(), Value::String(at.to_rfc3339()));
                map.insert("_done".to_string(), Value::Bool(true));
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn path_for(dir: &Path, name: &str) -> PathBuf {
        dir.join(name)
    }

    fn fixed_time() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-07-30T00:00:00Z").unwrap().with_timezone(&Utc)
    }

    #[test]
    fn mark_started_then_done_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = ManifestStore::new(path_for(dir.path(), "manifest.json"));

        store.mark_started("exp-1", fixed_time()).unwrap();
        assert!(store.is_unresolved("exp-1").unwrap());
        assert!(!store.is_done("exp-1").unwrap());

        store.mark_done("exp-1", fixed_time()).unwrap();
        assert!(store.is_done("exp-1").unwrap());
        assert!(!store.is_unresolved("exp-1").unwrap());
    }

    #[test]
    fn unknown_experiment_is_neither_done_nor_unresolved() {
        let dir = TempDir::new().unwrap();
        let store = ManifestStore::new(path_for(dir.path(), "manifest.json"));
        assert!(!store.is_done("nope").unwrap());
        assert!(!store.is_unresolved("nope").unwrap());
    }

    #[test]
    fn names_lists_every_experiment_entered() {
        let dir = TempDir::new().unwrap();
        let store = ManifestStore::new(path_for(dir.path(), "manifest.json"));
        store.mark_started("exp-a", fixed_time()).unwrap();
        store.mark_started("exp-b", fixed_time()).unwrap();
        let mut names = store.names().unwrap();
        names.sort();
        assert_eq!(names, vec!["exp-a".to_string(), "exp-b".to_string()]);
    }
}
