//! `away` command-line entry point.
use anyhow::Result;
use clap::Parser;

use away::cli::Cli;
use away::{commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    if let Some(shell) = args.completions {
        commands::completions(shell);
        return Ok(());
    }

    logging::init_subscriber(args.verbose, "away");
    let log = logging::Logger::new("away");
    commands::run(&args, &log)
}
