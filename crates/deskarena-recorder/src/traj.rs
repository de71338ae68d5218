//! Writes the three artifacts a task's result directory holds: `traj.jsonl`
//! (one record per step), `traj.html` (a human-browsable view, appended
//! incrementally), and `result.txt` (the final score). Grounded on
//! `TrajectoryRecorder`/`lib_run_single.py`'s `save_dict` + HTML rendering.

use crate::error::Result;
use crate::value::{RecordedValue, StoredRef};
use deskarena_types::trajectory::StepRecord;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

const HTML_HEADER: &str = r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>trajectory</title>
<style>
body.light { background: #fff; color: #111; }
body.dark { background: #111; color: #eee; }
details { margin-bottom: 0.5em; }
img { max-width: 480px; display: block; }
</style>
<script>
function toggleTheme() {
  document.body.classList.toggle('dark');
  document.body.classList.toggle('light');
}
window.addEventListener('DOMContentLoaded', () => document.body.classList.add('light'));
</script>
</head>
<body>
<button onclick="toggleTheme()">Toggle theme</button>
"#;

pub struct TrajectoryWriter {
    dir: PathBuf,
    jsonl: File,
    html: File,
}

impl TrajectoryWriter {
    /// Opens (creating if necessary) `traj.jsonl`/`traj.html` in `dir`. Safe
    /// to call again against an in-progress result directory: both files
    /// are opened in append mode, and the HTML header is written only once.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let jsonl_path = dir.join("traj.jsonl");
        let html_path = dir.join("traj.html");
        let html_is_new = !html_path.exists();

        let jsonl = OpenOptions::new().create(true).append(true).open(&jsonl_path)?;
        let mut html = OpenOptions::new().create(true).append(true).open(&html_path)?;
        if html_is_new {
            html.write_all(HTML_HEADER.as_bytes())?;
            html.sync_all()?;
        }

        Ok(Self { dir: dir.to_path_buf(), jsonl, html })
    }

    /// Records one step: stores each observation value's side file (if
    /// any), appends the JSONL record, appends the HTML fragment, and
    /// fsyncs both files before returning -- a step's record is durable
    /// before the engine starts the next one (§5 ordering guarantee).
    pub fn record_step(
        &mut self,
        mut record: StepRecord,
        observation: BTreeMap<String, RecordedValue>,
    ) -> Result<()> {
        let timestamp = record.action_timestamp.0.clone();
        let mut obs_json = Map::new();
        for (key, value) in &observation {
            let stored = value.store(&self.dir, key, record.step_num, &timestamp)?;
            obs_json.insert(key.clone(), Value::from(stored.clone()));
        }
        if !obs_json.is_empty() {
            let entry = record.agent_log.get_or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(map) = entry {
                map.insert("observation".to_string(), Value::Object(obs_json.clone()));
            }
        }

        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        self.jsonl.write_all(&line)?;
        self.jsonl.sync_all()?;

        let fragment = render_html_fragment(&record, &observation);
        self.html.write_all(fragment.as_bytes())?;
        self.html.sync_all()?;

        Ok(())
    }

    /// Writes the final score to `result.txt` (§6 file format: a single
    /// decimal number, optionally followed by a newline).
    pub fn write_result(&self, score: f64) -> Result<()> {
        std::fs::write(self.dir.join("result.txt"), format!("{score}\n"))?;
        Ok(())
    }
}

fn render_html_fragment(record: &StepRecord, observation: &BTreeMap<String, RecordedValue>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "<details><summary>step {} @ {}</summary>\n",
        record.step_num, record.action_timestamp.0
    ));
    if let Some(action) = &record.action {
        out.push_str(&format!("<pre>{}</pre>\n", html_escape(&serde_json::to_string(action).unwrap_or_default())));
    }
    for (key, value) in observation {
        match value {
            RecordedValue::Image(_) => {
                out.push_str(&format!(
                    "<div><b>{}</b><img src=\"{}-step_{}_{}.png\"></div>\n",
                    html_escape(key),
                    html_escape(key),
                    record.step_num,
                    record.action_timestamp.0
                ));
            }
            RecordedValue::Text(text) => {
                out.push_str(&format!("<div><b>{}</b><pre>{}</pre></div>\n", html_escape(key), html_escape(text)));
            }
            _ => {}
        }
    }
    out.push_str("</details>\n");
    out
}

fn html_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskarena_types::trajectory::{ActionTimestamp, StepInfo};
    use tempfile::TempDir;

    fn sample_record(step: u32) -> StepRecord {
        StepRecord {
            step_num: step,
            action_timestamp: ActionTimestamp("20260730@120000".to_string()),
            action: None,
            reward: Some(0.0),
            done: false,
            info: StepInfo::default(),
            agent_log: None,
        }
    }

    #[test]
    fn record_step_appends_one_jsonl_line_per_call() {
        let dir = TempDir::new().unwrap();
        let mut writer = TrajectoryWriter::open(dir.path()).unwrap();
        writer.record_step(sample_record(0), BTreeMap::new()).unwrap();
        writer.record_step(sample_record(1), BTreeMap::new()).unwrap();

        let content = std::fs::read_to_string(dir.path().join("traj.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn html_header_is_written_only_once() {
        let dir = TempDir::new().unwrap();
        {
            let mut writer = TrajectoryWriter::open(dir.path()).unwrap();
            writer.record_step(sample_record(0), BTreeMap::new()).unwrap();
        }
        {
            let mut writer = TrajectoryWriter::open(dir.path()).unwrap();
            writer.record_step(sample_record(1), BTreeMap::new()).unwrap();
        }
        let html = std::fs::read_to_string(dir.path().join("traj.html")).unwrap();
        assert_eq!(html.matches("<!DOCTYPE html>").count(), 1);
        assert_eq!(html.matches("<details>").count(), 2);
    }

    #[test]
    fn result_txt_holds_a_single_decimal_number() {
        let dir = TempDir::new().unwrap();
        let writer = TrajectoryWriter::open(dir.path()).unwrap();
        writer.write_result(0.75).unwrap();
        let content = std::fs::read_to_string(dir.path().join("result.txt")).unwrap();
        assert_eq!(content.trim(), "0.75");
    }
}
