// Shared helpers for integration tests.
//
// Provides a temporary source/destination pair and a fluent builder so each
// integration test can lay out an isolated tree without repeating
// filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use away::plan::{Plan, PlanOptions};
use walkdir::WalkDir;

/// A canonical `src/` and `dest/` pair inside a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct TestTree {
    root: tempfile::TempDir,
    /// Canonical source root.
    pub src: PathBuf,
    /// Canonical destination root.
    pub dest: PathBuf,
}

impl TestTree {
    /// Create empty source and destination roots.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        let base = dunce::canonicalize(root.path()).expect("canonicalize temp dir");
        let src = base.join("src");
        let dest = base.join("dest");
        fs::create_dir(&src).expect("create src");
        fs::create_dir(&dest).expect("create dest");
        Self { root, src, dest }
    }

    /// Path to the temporary directory holding both roots.
    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    /// Build a plan over the two roots and walk it.
    pub fn plan(&self, options: PlanOptions) -> Plan {
        let mut plan = Plan::new(&self.src, &self.dest, options).expect("construct plan");
        plan.find_nodes().expect("find nodes");
        plan
    }

    /// Replace the absolute roots in `text` with `[SRC]` and `[DEST]`.
    pub fn redact(&self, text: &str) -> String {
        text.replace(&self.src.display().to_string(), "[SRC]")
            .replace(&self.dest.display().to_string(), "[DEST]")
    }

    /// Sorted listing of the destination, one entry per line.
    ///
    /// Directories end in `/`; symlinks show their target.
    pub fn layout(&self) -> String {
        let mut lines = Vec::new();
        for entry in WalkDir::new(&self.dest).min_depth(1).sort_by_file_name() {
            let entry = entry.expect("walk dest");
            let rel = entry
                .path()
                .strip_prefix(&self.dest)
                .expect("entry under dest")
                .to_string_lossy()
                .replace('\\', "/");
            let file_type = entry.file_type();
            if file_type.is_symlink() {
                let target = fs::read_link(entry.path()).expect("read link");
                lines.push(format!("{rel} -> {}", target.display()));
            } else if file_type.is_dir() {
                lines.push(format!("{rel}/"));
            } else {
                lines.push(rel);
            }
        }
        self.redact(&lines.join("\n"))
    }
}

/// Fluent builder for [`TestTree`].
pub struct TestTreeBuilder {
    tree: TestTree,
}

impl TestTreeBuilder {
    /// Begin building from empty roots.
    pub fn new() -> Self {
        Self {
            tree: TestTree::new(),
        }
    }

    /// Create `src/<rel>` as a file, with parent directories.
    pub fn with_file(self, rel: &str) -> Self {
        write_file(&self.tree.src.join(rel), rel);
        self
    }

    /// Create `src/<rel>` as an empty directory.
    pub fn with_dir(self, rel: &str) -> Self {
        fs::create_dir_all(self.tree.src.join(rel)).expect("create source dir");
        self
    }

    /// Create `dest/<rel>` as a file, with parent directories.
    pub fn with_dest_file(self, rel: &str) -> Self {
        write_file(&self.tree.dest.join(rel), "occupied");
        self
    }

    /// Create `dest/<rel>` as a directory.
    pub fn with_dest_dir(self, rel: &str) -> Self {
        fs::create_dir_all(self.tree.dest.join(rel)).expect("create dest dir");
        self
    }

    /// Create `dest/<rel>` as a symlink to `target`.
    #[cfg(unix)]
    pub fn with_dest_symlink(self, rel: &str, target: &Path) -> Self {
        std::os::unix::fs::symlink(target, self.tree.dest.join(rel)).expect("create symlink");
        self
    }

    /// Finish building and return the tree.
    pub fn build(self) -> TestTree {
        self.tree
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, content).expect("write file");
}
