//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{Mark, SourceEntry, SourceStatus};
use super::utils::log_file_path;

/// Structured logger with dry-run awareness and summary collection.
///
/// Holds no output state of its own besides the per-source results; every
/// message goes through [`tracing`], which also copies it to
/// `$XDG_CACHE_HOME/away/<command>.log` whatever the console verbosity.
#[derive(Debug)]
pub struct Logger {
    sources: Mutex<Vec<SourceEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display in the run summary. The file
    /// itself is created by [`init_subscriber`](super::subscriber::init_subscriber).
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            sources: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded source entries (test-only).
    #[cfg(test)]
    pub fn source_entries(&self) -> Vec<SourceEntry> {
        self.sources.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Record a source result for the summary.
    pub fn record_source(&self, name: &str, status: SourceStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.sources.lock() {
            guard.push(SourceEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed sources.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.sources.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|s| s.status == SourceStatus::Failed)
                .count()
        })
    }

    /// Log the summary: one marked row per source, the totals, and where
    /// the log file is.
    pub fn print_summary(&self) {
        let sources = match self.sources.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => return,
        };
        if sources.is_empty() {
            return;
        }

        self.stage("Summary");
        let (mut ok, mut dry_run, mut failed) = (0u32, 0u32, 0u32);
        for source in &sources {
            match source.status {
                SourceStatus::Ok => ok += 1,
                SourceStatus::DryRun => dry_run += 1,
                SourceStatus::Failed => failed += 1,
            }
            let line = source.message.as_ref().map_or_else(
                || source.name.clone(),
                |msg| format!("{} ({msg})", source.name),
            );
            self.mark(source.status.mark(), &line);
        }

        let total = ok + dry_run + failed;
        self.info(&format!(
            "{total} source(s): {ok} ok, {dry_run} dry-run, {failed} failed"
        ));
        if let Some(path) = &self.log_file {
            self.info(&format!("log: {}", path.display()));
        }
    }
}

// Display methods only go through the tracing dispatcher.
#[allow(clippy::unused_self)]
impl Logger {
    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Log a result line tagged with `mark`.
    ///
    /// Failures go out as errors and skips as warnings so they reach stderr;
    /// unchanged lines are debug-only on the console.
    pub fn mark(&self, mark: Mark, msg: &str) {
        let label = mark.label();
        match mark {
            Mark::Failed => tracing::error!(mark = label, "{msg}"),
            Mark::Skipped => tracing::warn!(mark = label, "{msg}"),
            Mark::Unchanged => tracing::debug!(mark = label, "{msg}"),
            Mark::Changed | Mark::Planned => tracing::info!(mark = label, "{msg}"),
        }
    }
}
