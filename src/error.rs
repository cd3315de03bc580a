//! Domain-specific error types for the away engine.
//!
//! This module provides a structured error hierarchy using [`thiserror`].
//! The planning and execution core returns typed errors (e.g. [`PlanError`],
//! [`ExecuteError`]) while the command layer at the CLI boundary converts them
//! to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! AwayError
//! ├── Plan(PlanError)        : bad roots, unreadable source entries
//! │   └── Node(NodeError)    : path resolution, inspection
//! ├── Execute(ExecuteError)  : one or more nodes failed to mutate
//! └── Config(ConfigError)    : settings file I/O and parsing
//!
//! Conflict                   : per-node destination classification
//! ```
//!
//! [`Conflict`] is not part of [`AwayError`]: it steers whether a node is
//! acted on and never aborts a run.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::executor::Report;

/// Top-level error type for the away engine.
#[derive(Error, Debug)]
pub enum AwayError {
    /// The plan could not be built.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// The plan was executed but some nodes failed.
    #[error(transparent)]
    Execute(#[from] ExecuteError),

    /// The settings file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while constructing a [`Node`](crate::plan::Node).
#[derive(Error, Debug)]
pub enum NodeError {
    /// The absolute form of the path could not be computed.
    #[error("could not resolve absolute path for {}: {source}", .path.display())]
    PathResolution {
        /// Path as given by the caller.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The entry could not be inspected (missing, permission denied, ...).
    #[error("cannot inspect {}: {source}", .path.display())]
    Inspection {
        /// Absolute path of the entry.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors raised while constructing a [`Plan`](crate::plan::Plan) or walking
/// its source tree.
#[derive(Error, Debug)]
pub enum PlanError {
    /// A source or destination root is unusable.
    #[error("invalid root {}: {reason}", .path.display())]
    InvalidRoot {
        /// Root path as given by the caller.
        path: PathBuf,
        /// Why the root was rejected.
        reason: String,
    },

    /// An entry under the source root could not be turned into a node.
    #[error(transparent)]
    Node(#[from] NodeError),

    /// The source tree could not be traversed.
    #[error("walking source tree: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Kind of entry that occupies a destination slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A real directory (not a symlink to one).
    Directory,
    /// A fifo, socket, device or anything else that is not a link.
    Other,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Other => "entry",
        })
    }
}

/// Why a node's destination slot cannot be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// Something other than a symlink already lives at the destination.
    #[error("{} is occupied by an existing {kind}", .path.display())]
    EntryExists {
        /// Destination path.
        path: PathBuf,
        /// What occupies it.
        kind: EntryKind,
    },

    /// A symlink lives at the destination but its target cannot be read.
    #[error("cannot read symlink {}: {reason}", .path.display())]
    UnreadableLink {
        /// Destination path.
        path: PathBuf,
        /// Rendered I/O error.
        reason: String,
    },

    /// A symlink lives at the destination but points somewhere else.
    #[error(
        "{} links to {} instead of {}",
        .path.display(),
        .actual.display(),
        .expected.display()
    )]
    WrongLink {
        /// Destination path.
        path: PathBuf,
        /// Resolved target of the existing link.
        actual: PathBuf,
        /// Source path the link should point at.
        expected: PathBuf,
    },

    /// The destination could not be inspected at all.
    #[error("cannot inspect {}: {reason}", .path.display())]
    Inaccessible {
        /// Destination path.
        path: PathBuf,
        /// Rendered I/O error.
        reason: String,
    },
}

impl Conflict {
    /// Return `true` when the slot is held by a real directory, which the
    /// walk merges into instead of linking over.
    #[must_use]
    pub const fn is_existing_dir(&self) -> bool {
        matches!(
            self,
            Self::EntryExists {
                kind: EntryKind::Directory,
                ..
            }
        )
    }
}

/// Errors raised by an [`Executor`](crate::executor::Executor) run.
#[derive(Error, Debug)]
pub enum ExecuteError {
    /// At least one eligible node could not be mutated.
    ///
    /// The full per-node report travels with the error so callers can still
    /// show what was created, removed or skipped.
    #[error("{failed} of {total} node(s) failed")]
    NodesFailed {
        /// Number of failed nodes.
        failed: usize,
        /// Number of nodes in the plan.
        total: usize,
        /// Per-node outcomes, including the failures.
        report: Report,
    },
}

/// Errors that arise from loading the settings file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("IO error reading config file {}: {source}", .path.display())]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid settings TOML.
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        /// Path to the file that failed to parse.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}
