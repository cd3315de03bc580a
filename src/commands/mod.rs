//! Command orchestration: settings, the per-source pipeline, and output.
use anyhow::{Context as _, Result};
use std::io;
use std::path::Path;

use crate::cli::Cli;
use crate::config::{self, Settings};
use crate::error::{AwayError, ExecuteError};
use crate::executor::{Description, Operation, Outcome, Report, Stats};
use crate::logging::{Logger, Mark, SourceStatus};
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::plan::{Plan, PlanOptions};

/// Result of running the pipeline for one source.
#[derive(Debug)]
pub enum Processed {
    /// Dry run: what would happen.
    Described(Description),
    /// Real run: what did happen.
    Executed(Report),
}

impl Processed {
    /// Counters for the summary line.
    #[must_use]
    pub fn stats(&self) -> Stats {
        match self {
            Self::Described(description) => description.stats(),
            Self::Executed(report) => report.stats(),
        }
    }
}

/// Plan `source` against `dest` and run `operation` on it.
///
/// With `options.dry_run` only the description is produced and nothing is
/// mutated; otherwise the plan is executed through `fs`.
///
/// # Errors
///
/// Returns [`AwayError::Plan`] if the plan cannot be built and
/// [`AwayError::Execute`] if any node failed to mutate.
pub fn process(
    source: &Path,
    dest: &Path,
    operation: Operation,
    options: PlanOptions,
    fs: &dyn FileSystemOps,
) -> Result<Processed, AwayError> {
    let mut plan = Plan::new(source, dest, options)?;
    plan.find_nodes()?;
    let executor = operation.executor();
    if plan.options().dry_run {
        return Ok(Processed::Described(executor.describe(&plan)));
    }
    Ok(Processed::Executed(executor.execute(&plan, fs)?))
}

/// Run `away` for every source named on the command line.
///
/// Sources are processed in order; the first one that fails stops the run.
/// The summary is logged either way.
///
/// # Errors
///
/// Returns an error if the settings file is invalid or any source failed.
pub fn run(cli: &Cli, log: &Logger) -> Result<()> {
    let settings_path = cli.config.clone().unwrap_or_else(config::default_path);
    let settings = Settings::load(&settings_path)
        .with_context(|| format!("loading settings from {}", settings_path.display()))?;
    log.debug(&format!("settings: {}", settings_path.display()));

    let resolved = settings.resolve(cli.dest.as_deref(), cli.dir_mode.as_deref(), cli.deep_link);
    let options = PlanOptions {
        dry_run: cli.dry_run,
        link_files_only: resolved.deep_link,
        dir_mode: Some(resolved.dir_mode),
    };
    let operation = cli.operation();
    log.debug(&format!(
        "{}: dest {}, dir mode {:o}, deep link {}",
        operation.executor().name(),
        resolved.dest.display(),
        resolved.dir_mode,
        resolved.deep_link
    ));

    for source in &cli.sources {
        let name = source.display().to_string();
        log.stage(&format!("{} {name}", operation.verb()));
        let result = process(
            source,
            &resolved.dest,
            operation,
            options,
            &SystemFileSystemOps,
        );
        if !record(log, &name, result, options.dry_run) {
            break;
        }
    }

    log.print_summary();
    let failures = log.failure_count();
    if failures > 0 {
        anyhow::bail!("{failures} source(s) failed");
    }
    Ok(())
}

/// Print a completion script for `shell` to stdout.
pub fn completions(shell: clap_complete::Shell) {
    use clap::CommandFactory as _;
    clap_complete::generate(shell, &mut Cli::command(), "away", &mut io::stdout());
}

/// Log the outcome of one source and record it for the summary.
///
/// Returns `false` when the source failed.
fn record(log: &Logger, name: &str, result: Result<Processed, AwayError>, dry_run: bool) -> bool {
    match result {
        Ok(processed) => {
            match &processed {
                Processed::Described(description) => {
                    for step in description.steps() {
                        log.dry_run(&step.to_string());
                    }
                }
                Processed::Executed(report) => log_report(log, report),
            }
            let summary = processed.stats().summary(dry_run);
            log.info(&summary);
            let status = if dry_run {
                SourceStatus::DryRun
            } else {
                SourceStatus::Ok
            };
            log.record_source(name, status, Some(&summary));
            true
        }
        Err(AwayError::Execute(ExecuteError::NodesFailed {
            failed,
            total,
            report,
        })) => {
            log_report(log, &report);
            let message = format!("{failed} of {total} node(s) failed");
            log.error(&format!("{name}: {message}"));
            log.record_source(name, SourceStatus::Failed, Some(&message));
            false
        }
        Err(e) => {
            log.error(&format!("{name}: {e}"));
            log.record_source(name, SourceStatus::Failed, Some(&e.to_string()));
            false
        }
    }
}

fn log_report(log: &Logger, report: &Report) {
    for entry in report.entries() {
        let mark = match entry.outcome {
            Outcome::Linked | Outcome::Removed => Mark::Changed,
            Outcome::AlreadyLinked => Mark::Unchanged,
            Outcome::Skipped(_) => Mark::Skipped,
            Outcome::Failed(_) => Mark::Failed,
        };
        log.mark(mark, &entry.to_string());
    }
}
