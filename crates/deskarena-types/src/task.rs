use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single setup directive from `task.config[]` or `evaluator.postconfig[]`.
/// `type` names a registered setter; the remaining JSON keys are the
/// setter-specific payload, passed through untouched -- the setter itself
/// owns interpreting them (see `deskarena-engine::setup`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConfigDirective {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub payload: Value,
}

/// One scalar-or-list JSON value, normalized on access. Mirrors the
/// `func`/`result`/`expected`/`options` fields of `evaluator`, which the
/// original accepts either bare or as a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ScalarOrList<T> {
    Scalar(T),
    List(Vec<T>),
}

impl<T: Clone> ScalarOrList<T> {
    /// Expand to a `Vec<Option<T>>` of the requested length. A `Scalar` is
    /// treated as a length-1 list; a `List` shorter than `len` is padded
    /// with `None` (the "missing positional entries are implicit nulls"
    /// invariant from the data model).
    fn expand(&self, len: usize) -> Vec<Option<T>> {
        let raw: Vec<T> = match self {
            ScalarOrList::Scalar(v) => vec![v.clone()],
            ScalarOrList::List(v) => v.clone(),
        };
        let mut out: Vec<Option<T>> = raw.into_iter().map(Some).collect();
        out.resize(len, None);
        out
    }

    fn len(&self) -> usize {
        match self {
            ScalarOrList::Scalar(_) => 1,
            ScalarOrList::List(v) => v.len(),
        }
    }
}

/// Conjunction mode combining multiple `(metric, result, expected, options)`
/// tuples into one score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

/// A getter specification: a tag naming a registered getter plus its
/// arguments. The tag is resolved against the registry in
/// `deskarena-evaluators`; this crate only models the JSON shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GetterSpec {
    #[serde(rename = "type")]
    pub tag: String,
    #[serde(flatten)]
    pub args: Value,
}

/// The raw `evaluator` block of a task descriptor, as it appears in task
/// JSON: `func`/`result`/`expected`/`options` may each be bare or a list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluatorSpec {
    pub func: ScalarOrList<String>,
    #[serde(default)]
    pub conj: Conjunction,
    pub result: ScalarOrList<GetterSpec>,
    #[serde(default)]
    pub expected: Option<ScalarOrList<GetterSpec>>,
    #[serde(default)]
    pub options: Option<ScalarOrList<Value>>,
    #[serde(default)]
    pub postconfig: Vec<ConfigDirective>,
}

/// One normalized `(metric, result, expected, options)` tuple, after
/// scalar-or-list expansion. Positional entries missing from a shorter list
/// surface as `None`.
#[derive(Debug, Clone)]
pub struct EvaluatorEntry {
    pub func: String,
    pub result: GetterSpec,
    pub expected: Option<GetterSpec>,
    pub options: Value,
}

impl EvaluatorSpec {
    /// The literal `"infeasible"` unary metric name, special-cased by the
    /// episode engine: score 1 iff the episode's last action was `FAIL`.
    pub const INFEASIBLE: &'static str = "infeasible";

    pub fn is_infeasible(&self) -> bool {
        matches!(&self.func, ScalarOrList::Scalar(name) if name == Self::INFEASIBLE)
    }

    /// Expand `func`/`result`/`expected`/`options` into an equal-length list
    /// of tuples. Rejects the spec up front if any present list-typed field
    /// disagrees in length with `func` (the data-model invariant).
    pub fn normalize(&self) -> Result<Vec<EvaluatorEntry>> {
        let len = self.func.len();

        if let ScalarOrList::List(_) = &self.result
            && self.result.len() != len
        {
            return Err(Error::MismatchedEvaluatorLists {
                func_len: len,
                other: "result",
                other_len: self.result.len(),
            });
        }
        if let Some(expected) = &self.expected
            && matches!(expected, ScalarOrList::List(_))
            && expected.len() != len
        {
            return Err(Error::MismatchedEvaluatorLists {
                func_len: len,
                other: "expected",
                other_len: expected.len(),
            });
        }
        if let Some(options) = &self.options
            && matches!(options, ScalarOrList::List(_))
            && options.len() != len
        {
            return Err(Error::MismatchedEvaluatorLists {
                func_len: len,
                other: "options",
                other_len: options.len(),
            });
        }

        let funcs = self.func.expand(len);
        let results = self.result.expand(len);
        let expecteds = self
            .expected
            .as_ref()
            .map(|e| e.expand(len))
            .unwrap_or_else(|| vec![None; len]);
        let options = self
            .options
            .as_ref()
            .map(|o| o.expand(len))
            .unwrap_or_else(|| vec![None; len]);

        let mut entries = Vec::with_capacity(len);
        for i in 0..len {
            let func = funcs[i]
                .clone()
                .ok_or_else(|| Error::InvalidSpec(format!("missing func at position {i}")))?;
            let result = results[i]
                .clone()
                .ok_or_else(|| Error::InvalidSpec(format!("missing result getter at position {i}")))?;
            entries.push(EvaluatorEntry {
                func,
                result,
                expected: expecteds[i].clone(),
                options: options[i].clone().unwrap_or(Value::Null),
            });
        }
        Ok(entries)
    }
}

/// A task descriptor: immutable for the duration of one episode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub instruction: String,
    #[serde(default)]
    pub config: Vec<ConfigDirective>,
    pub evaluator: EvaluatorSpec,

    /// Hypervisor snapshot name RESET restores to. Defaults to the
    /// well-known base image snapshot the original task JSON files assume
    /// when the field is absent.
    #[serde(default = "default_snapshot")]
    pub snapshot: String,

    /// Application identifiers setup directives may need to launch/focus.
    #[serde(default)]
    pub related_apps: Vec<String>,
}

fn default_snapshot() -> String {
    "init_state".to_string()
}

impl Task {
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn getter(tag: &str) -> GetterSpec {
        GetterSpec { tag: tag.to_string(), args: Value::Null }
    }

    #[test]
    fn normalize_scalar_evaluator() {
        let spec = EvaluatorSpec {
            func: ScalarOrList::Scalar("eq".to_string()),
            conj: Conjunction::And,
            result: ScalarOrList::Scalar(getter("get_file_exists")),
            expected: None,
            options: None,
            postconfig: vec![],
        };
        let entries = spec.normalize().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].func, "eq");
        assert!(entries[0].expected.is_none());
    }

    #[test]
    fn normalize_list_evaluator_with_missing_expected() {
        let spec = EvaluatorSpec {
            func: ScalarOrList::List(vec!["a".into(), "b".into()]),
            conj: Conjunction::And,
            result: ScalarOrList::List(vec![getter("g1"), getter("g2")]),
            expected: Some(ScalarOrList::List(vec![getter("e1")])),
            options: None,
            postconfig: vec![],
        };
        let entries = spec.normalize().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].expected.is_some());
        assert!(entries[1].expected.is_none());
    }

    #[test]
    fn normalize_rejects_length_mismatch() {
        let spec = EvaluatorSpec {
            func: ScalarOrList::List(vec!["a".into(), "b".into()]),
            conj: Conjunction::And,
            result: ScalarOrList::List(vec![getter("g1"), getter("g2"), getter("g3")]),
            expected: None,
            options: None,
            postconfig: vec![],
        };
        assert!(matches!(
            spec.normalize(),
            Err(Error::MismatchedEvaluatorLists { .. })
        ));
    }

    #[test]
    fn is_infeasible_detects_special_case() {
        let spec = EvaluatorSpec {
            func: ScalarOrList::Scalar("infeasible".to_string()),
            conj: Conjunction::And,
            result: ScalarOrList::Scalar(getter("noop")),
            expected: None,
            options: None,
            postconfig: vec![],
        };
        assert!(spec.is_infeasible());
    }

    #[test]
    fn task_default_snapshot() {
        let json = serde_json::json!({
            "id": "t1",
            "instruction": "do a thing",
            "evaluator": {
                "func": "infeasible",
                "result": {"type": "noop"},
            }
        });
        let task: Task = serde_json::from_value(json).unwrap();
        assert_eq!(task.snapshot, "init_state");
    }
}
