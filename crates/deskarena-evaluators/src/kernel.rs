//! The and/or evaluation kernel (§4.5 Algorithm): resolves an
//! `EvaluatorSpec` to concrete getters/metrics, applies `postconfig`, and
//! folds each tuple's score according to the spec's `conj`.

use crate::error::Result;
use crate::registry::{resolve_getter, resolve_metric};
use crate::traits::GetterValue;
use deskarena_guestio::{setup, GuestClient};
use deskarena_types::task::{Conjunction, EvaluatorSpec};

/// Runs one task's evaluator against a live guest connection and returns
/// the final score in `[0.0, 1.0]`.
pub async fn evaluate(client: &GuestClient, spec: &EvaluatorSpec) -> Result<f64> {
    setup::apply_all(client, &spec.postconfig).await?;

    if spec.is_infeasible() {
        return Ok(1.0);
    }

    let entries = spec.normalize()?;
    let mut scores = Vec::with_capacity(entries.len());

    for entry in &entries {
        let getter = resolve_getter(&entry.result.tag)?;
        let result = match getter.get(client, &entry.result.args).await {
            Ok(value) => value,
            Err(_) => GetterValue::Null,
        };

        let expected = match &entry.expected {
            Some(spec) => {
                let getter = resolve_getter(&spec.tag)?;
                getter.get(client, &spec.args).await.ok()
            }
            None => None,
        };

        let metric = resolve_metric(&entry.func)?;
        let score = metric.evaluate(&result, expected.as_ref(), &entry.options).await?;
        let score = if (0.0..=1.0).contains(&score) { score } else { score.clamp(0.0, 1.0) };

        match spec.conj {
            Conjunction::And if score == 0.0 => return Ok(0.0),
            Conjunction::Or if score == 1.0 => return Ok(1.0),
            _ => {}
        }
        scores.push(score);
    }

    if scores.is_empty() {
        return Ok(0.0);
    }

    Ok(match spec.conj {
        Conjunction::And => scores.iter().sum::<f64>() / scores.len() as f64,
        Conjunction::Or => scores.iter().cloned().fold(0.0, f64::max),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskarena_types::task::Task;

    #[test]
    fn infeasible_spec_is_detected_before_normalization() {
        let json = r#"{
            "id": "t1",
            "instruction": "do nothing",
            "config": [],
            "evaluator": {"func": "infeasible", "result": {"type": "file_exists", "path": "x"}}
        }"#;
        let task = Task::from_json_str(json).unwrap();
        assert!(task.evaluator.is_infeasible());
    }
}
