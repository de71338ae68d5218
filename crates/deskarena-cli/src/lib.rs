mod args;
mod commands;
mod logging;

pub use args::Cli;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    logging::init(cli.log_level, cli.log_format);
    commands::run(cli)
}
