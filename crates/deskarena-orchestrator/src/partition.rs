//! Task partitioning (§4.7): flattens the `test_all_meta` map into an
//! ordered `(domain, task_id)` list and splits it evenly across workers,
//! giving the remainder to the lowest-indexed workers.

use serde_json::Value;
use std::collections::BTreeMap;

pub type TestAllMeta = BTreeMap<String, Vec<String>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRef {
    pub domain: String,
    pub task_id: String,
}

/// Flattens `{domain: [task_id, ...]}` to an ordered list, domains in
/// sorted order (a `BTreeMap` gives this for free) and task ids within a
/// domain in their original array order.
pub fn flatten(meta: &TestAllMeta) -> Vec<TaskRef> {
    meta.iter()
        .flat_map(|(domain, task_ids)| {
            task_ids.iter().map(move |task_id| TaskRef { domain: domain.clone(), task_id: task_id.clone() })
        })
        .collect()
}

/// Parses a raw `test_all.json` document (a JSON object of
/// `domain -> [task_id, ...]`) filtered to an optional single domain.
pub fn parse_meta(raw: &Value, domain_filter: Option<&str>) -> TestAllMeta {
    let mut meta = TestAllMeta::new();
    if let Value::Object(map) = raw {
        for (domain, tasks) in map {
            if let Some(filter) = domain_filter {
                if domain != filter {
                    continue;
                }
            }
            if let Some(list) = tasks.as_array() {
                let ids = list.iter().filter_map(Value::as_str).map(str::to_string).collect();
                meta.insert(domain.clone(), ids);
            }
        }
    }
    meta
}

/// Returns the slice of `tasks` assigned to `worker_id` out of
/// `num_workers`. `len % num_workers != 0` distributes the remainder to
/// the lowest-indexed workers (worker 0 first).
pub fn partition_for_worker(tasks: &[TaskRef], worker_id: usize, num_workers: usize) -> Vec<TaskRef> {
    assert!(num_workers > 0, "num_workers must be positive");
    assert!(worker_id < num_workers, "worker_id out of range");

    let len = tasks.len();
    let base = len / num_workers;
    let remainder = len % num_workers;

    let start = worker_id * base + worker_id.min(remainder);
    let this_len = base + usize::from(worker_id < remainder);
    tasks[start..start + this_len].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(n: usize) -> Vec<TaskRef> {
        (0..n).map(|i| TaskRef { domain: "d".to_string(), task_id: format!("t{i}") }).collect()
    }

    #[test]
    fn even_split_gives_equal_shares() {
        let tasks = refs(9);
        for worker in 0..3 {
            assert_eq!(partition_for_worker(&tasks, worker, 3).len(), 3);
        }
    }

    #[test]
    fn remainder_goes_to_lowest_indexed_workers() {
        let tasks = refs(10);
        assert_eq!(partition_for_worker(&tasks, 0, 3).len(), 4);
        assert_eq!(partition_for_worker(&tasks, 1, 3).len(), 3);
        assert_eq!(partition_for_worker(&tasks, 2, 3).len(), 3);
    }

    #[test]
    fn partitions_cover_the_whole_set_without_overlap() {
        let tasks = refs(11);
        let mut seen = Vec::new();
        for worker in 0..4 {
            seen.extend(partition_for_worker(&tasks, worker, 4));
        }
        assert_eq!(seen.len(), tasks.len());
        let mut ids: Vec<_> = seen.iter().map(|t| t.task_id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), tasks.len());
    }

    #[test]
    fn flatten_preserves_domain_order_and_task_order() {
        let mut meta = TestAllMeta::new();
        meta.insert("b_domain".to_string(), vec!["b1".to_string()]);
        meta.insert("a_domain".to_string(), vec!["a1".to_string(), "a2".to_string()]);
        let flat = flatten(&meta);
        assert_eq!(
            flat,
            vec![
                TaskRef { domain: "a_domain".to_string(), task_id: "a1".to_string() },
                TaskRef { domain: "a_domain".to_string(), task_id: "a2".to_string() },
                TaskRef { domain: "b_domain".to_string(), task_id: "b1".to_string() },
            ]
        );
    }
}
