//! Per-source summary entries and the marks that tag result lines.

/// Result of processing one source directory, for the run summary.
#[derive(Debug, Clone)]
pub struct SourceEntry {
    /// Source directory as given on the command line.
    pub name: String,
    /// Final status of the source.
    pub status: SourceStatus,
    /// Counters or error description.
    pub message: Option<String>,
}

/// Status of a processed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStatus {
    /// Every node was handled without a failure.
    Ok,
    /// Only described; nothing was changed.
    DryRun,
    /// The plan could not be built or some node failed.
    Failed,
}

impl SourceStatus {
    /// Mark shown next to the source in the summary.
    #[must_use]
    pub const fn mark(self) -> Mark {
        match self {
            Self::Ok => Mark::Changed,
            Self::DryRun => Mark::Planned,
            Self::Failed => Mark::Failed,
        }
    }
}

/// Tag carried by a result line: one node outcome or one summary row.
///
/// Travels through tracing as the `mark` field so the console can colour
/// the line and the log file can keep the symbol without escape codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    /// Something was created or removed.
    Changed,
    /// Already in the desired state.
    Unchanged,
    /// Left alone on purpose.
    Skipped,
    /// A mutation failed.
    Failed,
    /// Would change, but this is a dry run.
    Planned,
}

impl Mark {
    /// Every mark, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Changed,
        Self::Unchanged,
        Self::Skipped,
        Self::Failed,
        Self::Planned,
    ];

    /// Field value used on tracing events.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Changed => "changed",
            Self::Unchanged => "unchanged",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
            Self::Planned => "planned",
        }
    }

    /// Inverse of [`label`](Self::label).
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.label() == label)
    }

    /// Single-character symbol printed before the line.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Changed => '✓',
            Self::Unchanged => '=',
            Self::Skipped => '-',
            Self::Failed => '✗',
            Self::Planned => '~',
        }
    }

    /// SGR colour code for the console.
    pub(super) const fn color(self) -> &'static str {
        match self {
            Self::Changed => "32",
            Self::Unchanged => "2",
            Self::Skipped | Self::Planned => "33",
            Self::Failed => "31",
        }
    }
}
