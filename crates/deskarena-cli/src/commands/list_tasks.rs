//! `deskarena list-tasks`: a read-only helper printing the flattened,
//! per-worker partitioned task list so operators can verify the
//! partitioning law (§8 scenario 6) against a real meta file without
//! spinning up any VMs.

use anyhow::{Context, Result};
use deskarena_orchestrator::{flatten, parse_meta, partition_for_worker};

pub fn execute(test_all_meta_path: String, domain: Option<String>, num_workers: usize) -> Result<()> {
    let raw = std::fs::read_to_string(&test_all_meta_path)
        .with_context(|| format!("reading test_all_meta_path {test_all_meta_path}"))?;
    let meta = parse_meta(&serde_json::from_str(&raw)?, domain.as_deref());
    let tasks = flatten(&meta);

    for worker_id in 0..num_workers {
        for task_ref in partition_for_worker(&tasks, worker_id, num_workers) {
            println!("{worker_id}\t{}\t{}", task_ref.domain, task_ref.task_id);
        }
    }

    Ok(())
}
