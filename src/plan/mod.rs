//! Planning: walk a source tree and pick the minimal set of nodes to link.
//!
//! A single link to a directory stands in for everything beneath it, so the
//! walk records the shallowest entries that need action and prunes the rest.
//! Directories already present at the destination are merged into rather than
//! linked over, which is what lets several sources share a destination.

mod node;

pub use node::{Node, NodeKind, Slot};

use std::fmt;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::PlanError;

/// Permission bits for intermediate directories when none are configured.
pub const DEFAULT_DIR_MODE: u32 = 0o770;

/// Knobs that shape a plan and how it is carried out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanOptions {
    /// Only describe; never mutate the destination.
    pub dry_run: bool,
    /// Link leaf entries individually and create the directories between
    /// them, instead of linking whole directories.
    pub link_files_only: bool,
    /// Permission bits for created directories; [`DEFAULT_DIR_MODE`] if unset.
    pub dir_mode: Option<u32>,
}

/// The ordered nodes that need action for one source/destination pair.
#[derive(Debug)]
pub struct Plan {
    source: PathBuf,
    dest: PathBuf,
    options: PlanOptions,
    nodes: Vec<Node>,
}

/// What the walk does with a directory entry.
enum DirVisit {
    /// Record the directory as a node and skip its contents.
    Record,
    /// Leave the directory out and walk its contents.
    Descend,
}

impl Plan {
    /// Create an empty plan over `source` and `dest`.
    ///
    /// Both roots are canonicalized so that links point at real absolute
    /// source paths.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::InvalidRoot`] if either root does not exist, is
    /// not a directory, or both roots are the same directory.
    pub fn new(
        source: impl AsRef<Path>,
        dest: impl AsRef<Path>,
        options: PlanOptions,
    ) -> Result<Self, PlanError> {
        let source = resolve_root(source.as_ref())?;
        let dest = resolve_root(dest.as_ref())?;
        if source == dest {
            return Err(PlanError::InvalidRoot {
                path: dest,
                reason: "source and destination are the same directory".to_string(),
            });
        }
        let options = PlanOptions {
            dir_mode: Some(options.dir_mode.unwrap_or(DEFAULT_DIR_MODE)),
            ..options
        };
        Ok(Self {
            source,
            dest,
            options,
            nodes: Vec::new(),
        })
    }

    /// Canonical source root.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Canonical destination root.
    #[must_use]
    pub fn dest(&self) -> &Path {
        &self.dest
    }

    /// Options with defaults filled in.
    #[must_use]
    pub const fn options(&self) -> &PlanOptions {
        &self.options
    }

    /// Permission bits used for directories created under the destination.
    #[must_use]
    pub fn dir_mode(&self) -> u32 {
        self.options.dir_mode.unwrap_or(DEFAULT_DIR_MODE)
    }

    /// Nodes found by the last successful [`find_nodes`](Self::find_nodes),
    /// in walk order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Walk the source tree in sorted pre-order and record the nodes that
    /// need action.
    ///
    /// The walk only reads the filesystem. Calling it again re-walks from
    /// scratch; on error no partial node list is kept.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Walk`] if a directory cannot be read and
    /// [`PlanError::Node`] if an entry cannot be inspected.
    pub fn find_nodes(&mut self) -> Result<(), PlanError> {
        self.nodes.clear();
        self.nodes = self.walk()?;
        Ok(())
    }

    fn walk(&self) -> Result<Vec<Node>, PlanError> {
        let mut nodes = Vec::new();
        let mut entries = WalkDir::new(&self.source)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = entries.next() {
            let node = Node::new(entry?.path())?;
            if !node.is_dir() {
                nodes.push(node);
                continue;
            }
            match self.visit_dir(&node) {
                DirVisit::Record => {
                    entries.skip_current_dir();
                    nodes.push(node);
                }
                DirVisit::Descend => {}
            }
        }
        Ok(nodes)
    }

    /// A correct link is always recorded. Otherwise link-files-only mode
    /// always descends, so any conflict surfaces on the leaves; whole
    /// directory mode records the directory unless a real directory is
    /// there to merge into.
    fn visit_dir(&self, node: &Node) -> DirVisit {
        match node.check(self) {
            Ok(Slot::Linked) => DirVisit::Record,
            _ if self.options.link_files_only => DirVisit::Descend,
            Ok(Slot::Vacant) => DirVisit::Record,
            Err(conflict) if conflict.is_existing_dir() => DirVisit::Descend,
            Err(_) => DirVisit::Record,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ({} node(s))",
            self.source.display(),
            self.dest.display(),
            self.nodes.len()
        )
    }
}

fn resolve_root(path: &Path) -> Result<PathBuf, PlanError> {
    let resolved = dunce::canonicalize(path).map_err(|e| PlanError::InvalidRoot {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !resolved.is_dir() {
        return Err(PlanError::InvalidRoot {
            path: path.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }
    Ok(resolved)
}
