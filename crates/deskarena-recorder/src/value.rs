//! `RecordedValue`: a closed tagged union for everything one step's
//! observation dict can carry, each variant with its own on-disk writer
//! (§4.6.1). Grounded on `TrajectoryRecorder.save_dict`'s `isinstance`
//! dispatch chain.

use crate::error::Result;
use crate::npy;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedValue {
    /// Raw bytes saved verbatim, e.g. a non-image binary blob.
    Bytes(Vec<u8>),
    /// PNG-encoded image bytes, saved as `.png`.
    Image(Vec<u8>),
    /// A number or short string kept inline in `traj.jsonl`, never given a
    /// side file.
    Scalar(Value),
    /// A numeric vector, saved as a hand-rolled `.npy` file.
    Vector(Vec<f64>),
    /// Long-form text (accessibility tree, human question, plan result),
    /// saved as `.txt`.
    Text(String),
    /// An arbitrary JSON object/array, saved as `.json`.
    Record(Value),
}

/// Where one key's side file (if any) was written, relative to the result
/// directory -- what lands in the `traj.jsonl` record for that key.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredRef {
    Inline(Value),
    File(String),
}

impl RecordedValue {
    /// Writes the side file (if this variant needs one) under `dir`, named
    /// `{key}-step_{step}_{timestamp}.{ext}`, and returns what should be
    /// recorded inline in `traj.jsonl`.
    pub fn store(&self, dir: &Path, key: &str, step: u32, timestamp: &str) -> Result<StoredRef> {
        match self {
            RecordedValue::Scalar(value) => Ok(StoredRef::Inline(value.clone())),
            RecordedValue::Bytes(bytes) => {
                let name = file_name(key, step, timestamp, "bin");
                std::fs::write(dir.join(&name), bytes)?;
                Ok(StoredRef::File(name))
            }
            RecordedValue::Image(bytes) => {
                let name = file_name(key, step, timestamp, "png");
                std::fs::write(dir.join(&name), bytes)?;
                Ok(StoredRef::File(name))
            }
            RecordedValue::Vector(data) => {
                let name = file_name(key, step, timestamp, "npy");
                npy::write_vector(&dir.join(&name), data)?;
                Ok(StoredRef::File(name))
            }
            RecordedValue::Text(text) => {
                let name = file_name(key, step, timestamp, "txt");
                let content = if text.is_empty() { "No data available" } else { text };
                std::fs::write(dir.join(&name), content)?;
                Ok(StoredRef::File(name))
            }
            RecordedValue::Record(value) => {
                let name = file_name(key, step, timestamp, "json");
                std::fs::write(dir.join(&name), serde_json::to_vec(value)?)?;
                Ok(StoredRef::File(name))
            }
        }
    }
}

fn file_name(key: &str, step: u32, timestamp: &str, ext: &str) -> String {
    format!("{key}-step_{step}_{timestamp}.{ext}")
}

impl From<StoredRef> for Value {
    fn from(stored: StoredRef) -> Self {
        match stored {
            StoredRef::Inline(value) => value,
            StoredRef::File(name) => Value::String(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn scalar_stays_inline() {
        let dir = TempDir::new().unwrap();
        let stored = RecordedValue::Scalar(Value::from(42)).store(dir.path(), "reward", 0, "ts").unwrap();
        assert_eq!(stored, StoredRef::Inline(Value::from(42)));
    }

    #[test]
    fn text_writes_a_side_file_and_names_it() {
        let dir = TempDir::new().unwrap();
        let stored = RecordedValue::Text("tree".to_string())
            .store(dir.path(), "accessibility_tree", 3, "20260730@000000")
            .unwrap();
        match stored {
            StoredRef::File(name) => {
                assert_eq!(name, "accessibility_tree-step_3_20260730@000000.txt");
                assert_eq!(std::fs::read_to_string(dir.path().join(&name)).unwrap(), "tree");
            }
            other => panic!("expected a file ref, got {other:?}"),
        }
    }

    #[test]
    fn empty_text_falls_back_to_placeholder() {
        let dir = TempDir::new().unwrap();
        let stored = RecordedValue::Text(String::new()).store(dir.path(), "plan_result", 0, "ts").unwrap();
        let StoredRef::File(name) = stored else { panic!("expected file") };
        assert_eq!(std::fs::read_to_string(dir.path().join(&name)).unwrap(), "No data available");
    }
}
