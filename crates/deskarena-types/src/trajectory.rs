use crate::action::Action;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `YYYYMMDD@HHMMSS`, the original's trajectory timestamp format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct ActionTimestamp(pub String);

impl ActionTimestamp {
    pub fn from_datetime(dt: &chrono::DateTime<chrono::Utc>) -> Self {
        Self(dt.format("%Y%m%d@%H%M%S").to_string())
    }
}

/// Free-form info the engine attaches to a step: `fail`/`done` flags set by
/// sentinel actions, or an `exception`/`traceback` block on an uncaught
/// per-step error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct StepInfo {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fail: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

/// One record of `traj.jsonl`. `observation`/`agent_log` are kept as raw
/// JSON here; the recorder decides which fields get spilled to side files
/// (see `deskarena-recorder::RecordedValue`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepRecord {
    pub step_num: u32,
    pub action_timestamp: ActionTimestamp,
    pub action: Option<Action>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward: Option<f64>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub info: StepInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_log: Option<Value>,
}

/// The terminal record of a trajectory: final score and total wall-clock
/// elapsed time, in addition to the fields a regular step carries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrajectorySummary {
    pub score: f64,
    pub elapsed_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_info_skips_unset_flags() {
        let info = StepInfo::default();
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn step_info_serializes_fail_flag() {
        let info = StepInfo { fail: true, ..Default::default() };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json, serde_json::json!({"fail": true}));
    }

    #[test]
    fn action_timestamp_format() {
        use chrono::TimeZone;
        let dt = chrono::Utc.with_ymd_and_hms(2026, 7, 30, 12, 1, 2).unwrap();
        let ts = ActionTimestamp::from_datetime(&dt);
        assert_eq!(ts.0, "20260730@120102");
    }
}
