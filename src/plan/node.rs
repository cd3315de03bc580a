//! A single source entry and the classification of its destination slot.
use std::fs::{self, Metadata};
use std::io;
use std::path::{Component, Path, PathBuf};

use super::Plan;
use crate::error::{Conflict, EntryKind, NodeError};

/// What a node's source entry was when it was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// A symlink; it is never followed, the link itself is the node.
    Symlink,
    /// Anything else (fifo, socket, device).
    Other,
}

impl NodeKind {
    fn of(metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// A destination slot that an action may proceed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Nothing exists at the planned path.
    Vacant,
    /// A symlink at the planned path already points at this node.
    Linked,
}

/// One discovered filesystem entry under a plan's source root.
///
/// The metadata is a snapshot taken at construction and never refreshed.
/// The destination, on the other hand, is re-inspected on every call to
/// [`Node::check`]; callers must not assume its answer still holds later.
#[derive(Debug, Clone)]
pub struct Node {
    path: PathBuf,
    metadata: Metadata,
}

impl Node {
    /// Resolve `path` to an absolute path and snapshot its metadata without
    /// following a trailing symlink.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::PathResolution`] if the absolute path cannot be
    /// computed and [`NodeError::Inspection`] if the entry cannot be
    /// inspected.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, NodeError> {
        let path = path.as_ref();
        let absolute = std::path::absolute(path).map_err(|source| NodeError::PathResolution {
            path: path.to_path_buf(),
            source,
        })?;
        let metadata = fs::symlink_metadata(&absolute).map_err(|source| NodeError::Inspection {
            path: absolute.clone(),
            source,
        })?;
        Ok(Self {
            path: absolute,
            metadata,
        })
    }

    /// Absolute path of the source entry.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Kind of the source entry.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        NodeKind::of(&self.metadata)
    }

    /// Return `true` if the source entry is a real directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind() == NodeKind::Directory
    }

    /// The node's path expressed relative to `root`.
    ///
    /// `root` is expected to be an ancestor; otherwise the absolute path is
    /// returned unchanged.
    #[must_use]
    pub fn relative_to(&self, root: &Path) -> PathBuf {
        self.path
            .strip_prefix(root)
            .map_or_else(|_| self.path.clone(), Path::to_path_buf)
    }

    /// Where the link for this node lives under the plan's destination.
    #[must_use]
    pub fn planned_path(&self, plan: &Plan) -> PathBuf {
        plan.dest().join(self.relative_to(plan.source()))
    }

    /// Inspect the destination at [`planned_path`](Self::planned_path) and
    /// classify it.
    ///
    /// # Errors
    ///
    /// Returns the [`Conflict`] that blocks the slot. A conflict is an outcome,
    /// not a failure of the check itself.
    pub fn check(&self, plan: &Plan) -> Result<Slot, Conflict> {
        self.check_at(&self.planned_path(plan))
    }

    fn check_at(&self, planned: &Path) -> Result<Slot, Conflict> {
        let metadata = match fs::symlink_metadata(planned) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Slot::Vacant),
            Err(e) => {
                return Err(Conflict::Inaccessible {
                    path: planned.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        let file_type = metadata.file_type();
        if !file_type.is_symlink() {
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                EntryKind::Other
            };
            return Err(Conflict::EntryExists {
                path: planned.to_path_buf(),
                kind,
            });
        }

        let target = fs::read_link(planned).map_err(|e| Conflict::UnreadableLink {
            path: planned.to_path_buf(),
            reason: e.to_string(),
        })?;
        let actual = resolve_link_target(planned, &target);
        if paths_equal(&actual, &self.path) {
            Ok(Slot::Linked)
        } else {
            Err(Conflict::WrongLink {
                path: planned.to_path_buf(),
                actual,
                expected: self.path.clone(),
            })
        }
    }
}

/// Absolute form of a link's target: relative targets are taken from the
/// link's own directory.
fn resolve_link_target(link: &Path, target: &Path) -> PathBuf {
    if target.is_absolute() {
        return normalize(target);
    }
    let base = link.parent().unwrap_or_else(|| Path::new("/"));
    normalize(&base.join(target))
}

/// Collapse `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Compare two paths, ignoring the `\\?\` prefix Windows puts on
/// canonicalized paths.
fn paths_equal(a: &Path, b: &Path) -> bool {
    dunce::simplified(a) == dunce::simplified(b)
}
