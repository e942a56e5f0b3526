mod cli;
mod workflow;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    gitpick::logging::init_tracing()?;

    let cli_args = cli::Cli::parse();

    // Delegate the main application logic to the workflow module
    workflow::run_gitpick(cli_args)
}
