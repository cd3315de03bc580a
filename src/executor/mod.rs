//! Executors that turn a completed [`Plan`] into filesystem changes.
//!
//! There are exactly two: [`Putaway`](putaway::Putaway) creates links and
//! [`Unputaway`](unputaway::Unputaway) removes them. Both expose the same
//! [`Executor`] capability, selected through the closed [`Operation`] enum.
//!
//! Executors never print. [`Executor::describe`] returns a [`Description`]
//! (the dry-run text) and [`Executor::execute`] returns a [`Report`] of
//! per-node outcomes; the command layer decides what to show.
//!
//! Both methods re-inspect the destination for every node instead of trusting
//! whatever the walk saw, since the destination may have changed in between.

pub mod putaway;
pub mod unputaway;

use std::fmt;
use std::path::PathBuf;

use crate::error::{Conflict, ExecuteError};
use crate::operations::FileSystemOps;
use crate::plan::{Node, Plan};

/// Shared capability of the apply and reverse executors.
pub trait Executor: fmt::Debug {
    /// Short lowercase name used in logs.
    fn name(&self) -> &'static str;

    /// Describe what [`execute`](Self::execute) would do, without mutating
    /// anything.
    fn describe(&self, plan: &Plan) -> Description;

    /// Carry out the plan through `fs`.
    ///
    /// Every node is attempted. Failures are collected rather than aborting
    /// the batch.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError::NodesFailed`] carrying the full report if any
    /// node failed.
    fn execute(&self, plan: &Plan, fs: &dyn FileSystemOps) -> Result<Report, ExecuteError>;
}

/// Which executor to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Operation {
    /// Create links (the default).
    #[default]
    Putaway,
    /// Remove links previously created by [`Operation::Putaway`].
    Unputaway,
}

impl Operation {
    /// The executor implementing this operation.
    #[must_use]
    pub const fn executor(self) -> &'static dyn Executor {
        match self {
            Self::Putaway => &putaway::Putaway,
            Self::Unputaway => &unputaway::Unputaway,
        }
    }

    /// Progressive verb for stage headers.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Putaway => "Putting away",
            Self::Unputaway => "Removing",
        }
    }
}

/// Why a node is left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The destination slot is occupied by something this node does not own.
    Conflict(Conflict),
    /// Nothing links to this node, so there is nothing to remove.
    NotLinked,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict(conflict) => write!(f, "{conflict}"),
            Self::NotLinked => f.write_str("not linked"),
        }
    }
}

impl From<Conflict> for SkipReason {
    fn from(conflict: Conflict) -> Self {
        Self::Conflict(conflict)
    }
}

/// One line of a [`Description`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// An intermediate directory would be created.
    Mkdir(PathBuf),
    /// A link would be created at `link` pointing to `target`.
    Link {
        /// Planned link path.
        link: PathBuf,
        /// Source path the link points at.
        target: PathBuf,
    },
    /// The link already exists and is left as is.
    Keep {
        /// Planned link path.
        link: PathBuf,
        /// Source path the link points at.
        target: PathBuf,
    },
    /// The link at `link` would be removed.
    Remove {
        /// Link path.
        link: PathBuf,
    },
    /// The node would be left alone.
    Skip {
        /// Planned link path.
        link: PathBuf,
        /// Why.
        reason: SkipReason,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mkdir(dir) => write!(f, "MKDIR: {}", dir.display()),
            Self::Link { link, target } => {
                write!(f, "LINK:  {} => {}", link.display(), target.display())
            }
            Self::Keep { link, target } => {
                write!(f, "OK:    {} => {}", link.display(), target.display())
            }
            Self::Remove { link } => write!(f, "RM:    {}", link.display()),
            Self::Skip { link, reason } => write!(f, "SKIP:  {} - {reason}", link.display()),
        }
    }
}

/// Side-effect-free account of what an executor would do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Description(Vec<Step>);

impl Description {
    /// Steps in plan order.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.0
    }

    /// Counters for the summary line. Directory creation is not counted.
    #[must_use]
    pub fn stats(&self) -> Stats {
        let mut stats = Stats::default();
        for step in &self.0 {
            match step {
                Step::Mkdir(_) => {}
                Step::Link { .. } | Step::Remove { .. } => stats.changed += 1,
                Step::Keep { .. } => stats.already_ok += 1,
                Step::Skip { .. } => stats.skipped += 1,
            }
        }
        stats
    }

    fn push(&mut self, step: Step) {
        self.0.push(step);
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.0 {
            writeln!(f, "{step}")?;
        }
        Ok(())
    }
}

/// What happened to one node during [`Executor::execute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A link was created.
    Linked,
    /// The correct link was already in place.
    AlreadyLinked,
    /// The link was removed.
    Removed,
    /// The node was left alone.
    Skipped(SkipReason),
    /// A filesystem call failed; holds the rendered error.
    Failed(String),
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linked => f.write_str("linked"),
            Self::AlreadyLinked => f.write_str("already linked"),
            Self::Removed => f.write_str("removed"),
            Self::Skipped(reason) => write!(f, "skipped ({reason})"),
            Self::Failed(error) => write!(f, "failed ({error})"),
        }
    }
}

/// Outcome for one node, with the paths it concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeOutcome {
    /// Absolute source path of the node.
    pub source: PathBuf,
    /// Planned link path under the destination.
    pub link: PathBuf,
    /// What happened.
    pub outcome: Outcome,
}

impl fmt::Display for NodeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.link.display(), self.outcome)
    }
}

/// Per-node results of one [`Executor::execute`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    entries: Vec<NodeOutcome>,
}

impl Report {
    /// Outcomes in plan order.
    #[must_use]
    pub fn entries(&self) -> &[NodeOutcome] {
        &self.entries
    }

    /// Number of failed nodes.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.outcome, Outcome::Failed(_)))
            .count()
    }

    /// Return `true` if no node failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }

    /// Counters for the summary line.
    #[must_use]
    pub fn stats(&self) -> Stats {
        let mut stats = Stats::default();
        for entry in &self.entries {
            match entry.outcome {
                Outcome::Linked | Outcome::Removed => stats.changed += 1,
                Outcome::AlreadyLinked => stats.already_ok += 1,
                Outcome::Skipped(_) => stats.skipped += 1,
                Outcome::Failed(_) => stats.failed += 1,
            }
        }
        stats
    }

    fn push(&mut self, plan: &Plan, node: &Node, outcome: Outcome) {
        self.entries.push(NodeOutcome {
            source: node.path().to_path_buf(),
            link: node.planned_path(plan),
            outcome,
        });
    }

    /// `Ok(self)` if every node succeeded, otherwise the aggregate error.
    fn into_result(self) -> Result<Self, ExecuteError> {
        if self.is_success() {
            return Ok(self);
        }
        Err(ExecuteError::NodesFailed {
            failed: self.failures(),
            total: self.entries.len(),
            report: self,
        })
    }
}

/// Counters behind the one-line summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Links created or removed (or that would be).
    pub changed: u32,
    /// Links that were already correct.
    pub already_ok: u32,
    /// Nodes left alone.
    pub skipped: u32,
    /// Nodes whose mutation failed.
    pub failed: u32,
}

impl Stats {
    /// Format the counters as a one-line summary.
    ///
    /// Skipped and failed counts are only included when non-zero.
    ///
    /// ```
    /// use away::executor::Stats;
    ///
    /// let stats = Stats { changed: 2, already_ok: 1, skipped: 0, failed: 0 };
    /// assert_eq!(stats.summary(false), "2 changed, 1 already ok");
    /// assert_eq!(stats.summary(true), "2 would change, 1 already ok");
    /// ```
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        let mut summary = format!("{} {verb}, {} already ok", self.changed, self.already_ok);
        if self.skipped > 0 {
            summary.push_str(&format!(", {} skipped", self.skipped));
        }
        if self.failed > 0 {
            summary.push_str(&format!(", {} failed", self.failed));
        }
        summary
    }
}

/// Directory that must exist before `node` can be linked in link-files-only
/// mode, or `None` when the node sits directly under the destination root.
fn intermediate_dir(plan: &Plan, node: &Node) -> Option<PathBuf> {
    let relative = node.relative_to(plan.source());
    let parent = relative.parent().filter(|p| !p.as_os_str().is_empty())?;
    Some(plan.dest().join(parent))
}
