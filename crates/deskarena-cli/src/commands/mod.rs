mod list_tasks;
mod run_experiments;
mod run_worker;

use crate::args::{Cli, Commands};
use anyhow::Result;

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::RunExperiments { manifest, config, on_unresolved } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_experiments::execute(manifest, config, on_unresolved))
        }

        Commands::RunWorker {
            worker_id,
            num_workers,
            result_dir,
            test_all_meta_path,
            tasks_dir,
            agent_name,
            model,
            action_space,
            observation_type,
            trial_id,
            domain,
            config,
            max_steps,
            sleep_after_execution,
            screen_width,
            screen_height,
            emulator_ip,
            guest_port,
            a11y_backend,
            som_origin,
            diff_lvl,
            vmctl_host,
            vmctl_port,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(run_worker::execute(
                worker_id,
                num_workers,
                result_dir,
                test_all_meta_path,
                tasks_dir,
                agent_name,
                model,
                action_space,
                observation_type,
                trial_id,
                domain,
                config,
                max_steps,
                sleep_after_execution,
                screen_width,
                screen_height,
                emulator_ip,
                guest_port,
                a11y_backend,
                som_origin,
                diff_lvl,
                vmctl_host,
                vmctl_port,
            ))
        }

        Commands::ListTasks { test_all_meta_path, domain, num_workers } => {
            list_tasks::execute(test_all_meta_path, domain, num_workers)
        }
    }
}
