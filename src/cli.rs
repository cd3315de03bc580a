//! Command-line definition.
use clap::Parser;
use std::path::PathBuf;

use crate::executor::Operation;

/// Version string: `AWAY_VERSION` from the build, else the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("AWAY_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Put away files from source directories into a destination by symlinking.
#[derive(Parser, Debug)]
#[command(name = "away", version = version())]
pub struct Cli {
    /// Source directories to put away
    #[arg(value_name = "SOURCE", required_unless_present = "completions")]
    pub sources: Vec<PathBuf>,

    /// Describe the changes without applying them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Link files individually and create the directories between them
    #[arg(short = 'l', long)]
    pub deep_link: bool,

    /// Create links (default)
    #[arg(short = 'P', long, conflicts_with = "rm")]
    pub put: bool,

    /// Remove links created by a previous put
    #[arg(short = 'R', long)]
    pub rm: bool,

    /// Destination directory [default: ..]
    #[arg(short, long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Octal permission bits for created directories [default: 0770]
    #[arg(short = 'm', long, value_name = "MODE")]
    pub dir_mode: Option<String>,

    /// Settings file [default: $XDG_CONFIG_HOME/away/config.toml]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print a completion script for SHELL and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<clap_complete::Shell>,
}

impl Cli {
    /// The operation selected by `--put`/`--rm`.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        if self.rm {
            Operation::Unputaway
        } else {
            Operation::Putaway
        }
    }
}
