//! Sample `Task` JSON covering the worked scenarios, so engine/evaluator
//! integration tests can load a task the same way a worker would off
//! disk instead of hand-building `Task` literals inline.

use deskarena_types::task::Task;

/// Scenario 1: `evaluator.func = "infeasible"` -- scores 1.0 iff the
/// agent's last action is `FAIL`.
pub fn infeasible_task() -> Task {
    Task::from_json_str(
        r#"{
            "id": "infeasible-detection",
            "instruction": "Delete the system32 folder.",
            "evaluator": {"func": "infeasible", "result": {"type": "file_exists", "path": "C:\\nonexistent"}}
        }"#,
    )
    .expect("fixture JSON is well-formed")
}

/// Scenario 2: registry equality. Pair with `FakeGuestServer::set_registry`
/// to control whether this scores 1.0 or 0.0.
pub fn registry_equality_task() -> Task {
    Task::from_json_str(
        r#"{
            "id": "registry-equality",
            "instruction": "Set the registry value Val under HKCU:\\Software\\Test to 42.",
            "evaluator": {
                "func": "registry_eq",
                "result": {"type": "registry", "key": "HKCU\\Software\\Test\\Val"},
                "expected": {"type": "literal", "value": "42"}
            }
        }"#,
    )
    .expect("fixture JSON is well-formed")
}

/// Scenario 3: file-presence conjunction over two `file_exists` getters.
/// Pre-seed zero, one, or both paths on a `FakeGuestServer` to drive the
/// three cases the scenario calls out.
pub fn file_presence_conjunction_task() -> Task {
    Task::from_json_str(
        r#"{
            "id": "file-presence-conjunction",
            "instruction": "Create report.docx and summary.txt on the desktop.",
            "evaluator": {
                "func": ["is_true", "is_true"],
                "conj": "and",
                "result": [
                    {"type": "file_exists", "path": "C:\\Users\\user\\Desktop\\report.docx"},
                    {"type": "file_exists", "path": "C:\\Users\\user\\Desktop\\summary.txt"}
                ]
            }
        }"#,
    )
    .expect("fixture JSON is well-formed")
}

/// Scenario 4: world-clock probe, matched against `.*{city}, {country}.*`.
pub fn world_clock_task() -> Task {
    Task::from_json_str(
        r#"{
            "id": "world-clock-probe",
            "instruction": "Add a world clock for Munich, Germany.",
            "evaluator": {
                "func": "world_clock_exists",
                "result": {"type": "world_clock", "city": "Munich", "country": "Germany"},
                "options": {"city": "Munich", "country": "Germany"}
            }
        }"#,
    )
    .expect("fixture JSON is well-formed")
}

/// Scenario 5: a step-budget task with no natural termination -- the
/// agent under test should never emit `DONE`, so the episode runs exactly
/// `max_steps` predictions before falling through to EVALUATE.
pub fn step_budget_task() -> Task {
    Task::from_json_str(
        r#"{
            "id": "step-budget",
            "instruction": "Keep clicking forever.",
            "evaluator": {"func": "is_true", "result": {"type": "file_exists", "path": "C:\\never.txt"}}
        }"#,
    )
    .expect("fixture JSON is well-formed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_fixtures_parse() {
        infeasible_task();
        registry_equality_task();
        file_presence_conjunction_task();
        world_clock_task();
        step_budget_task();
    }
}
