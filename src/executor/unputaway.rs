//! Reverse executor: remove links that point at planned nodes.
use super::{Description, Executor, Outcome, Report, SkipReason, Step};
use crate::error::ExecuteError;
use crate::operations::FileSystemOps;
use crate::plan::{Node, Plan, Slot};

/// Removes the link at each node's planned path.
///
/// A link is only removed while it points at exactly this node. Every other
/// state of the slot (vacant, a real entry, a foreign or unreadable link)
/// makes the node a skip.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unputaway;

/// Whether a node may be removed right now, re-checked at the call site.
fn removable(plan: &Plan, node: &Node) -> Result<(), SkipReason> {
    match node.check(plan) {
        Ok(Slot::Linked) => Ok(()),
        Ok(Slot::Vacant) => Err(SkipReason::NotLinked),
        Err(conflict) => Err(conflict.into()),
    }
}

impl Executor for Unputaway {
    fn name(&self) -> &'static str {
        "unputaway"
    }

    fn describe(&self, plan: &Plan) -> Description {
        let mut description = Description::default();
        for node in plan.nodes() {
            let link = node.planned_path(plan);
            description.push(match removable(plan, node) {
                Ok(()) => Step::Remove { link },
                Err(reason) => Step::Skip { link, reason },
            });
        }
        description
    }

    fn execute(&self, plan: &Plan, fs: &dyn FileSystemOps) -> Result<Report, ExecuteError> {
        let mut report = Report::default();
        for node in plan.nodes() {
            let outcome = match removable(plan, node) {
                Ok(()) => match fs.remove_symlink(&node.planned_path(plan)) {
                    Ok(()) => Outcome::Removed,
                    Err(e) => Outcome::Failed(e.to_string()),
                },
                Err(reason) => Outcome::Skipped(reason),
            };
            report.push(plan, node, outcome);
        }
        report.into_result()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::error::Conflict;
    use crate::executor::putaway::Putaway;
    use crate::operations::{Call, MockFileSystemOps, SystemFileSystemOps};
    use crate::plan::PlanOptions;
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Canonical `src/` with `files` and an empty `dest/`.
    fn roots(files: &[&str]) -> (tempfile::TempDir, PathBuf, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let root = dunce::canonicalize(tmp.path()).unwrap();
        let (src, dest) = (root.join("src"), root.join("dest"));
        fs::create_dir(&src).unwrap();
        fs::create_dir(&dest).unwrap();
        for file in files {
            fs::write(src.join(file), file).unwrap();
        }
        (tmp, src, dest)
    }

    fn plan(src: &Path, dest: &Path) -> Plan {
        let mut plan = Plan::new(src, dest, PlanOptions::default()).unwrap();
        plan.find_nodes().unwrap();
        plan
    }

    #[test]
    fn describe_skips_unlinked_nodes() {
        let (_tmp, src, dest) = roots(&["A"]);
        let description = Unputaway.describe(&plan(&src, &dest));
        assert_eq!(
            description.steps(),
            [Step::Skip {
                link: dest.join("A"),
                reason: SkipReason::NotLinked,
            }]
        );
    }

    #[test]
    fn execute_skips_plain_file() {
        let (_tmp, src, dest) = roots(&["A"]);
        fs::write(dest.join("A"), "mine").unwrap();
        let mock = MockFileSystemOps::new();
        let report = Unputaway.execute(&plan(&src, &dest), &mock).unwrap();
        assert!(matches!(
            report.entries()[0].outcome,
            Outcome::Skipped(SkipReason::Conflict(Conflict::EntryExists { .. }))
        ));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn execute_skips_directory_in_place_of_file() {
        let (_tmp, src, dest) = roots(&["A"]);
        fs::create_dir(dest.join("A")).unwrap();
        let report = Unputaway
            .execute(&plan(&src, &dest), &SystemFileSystemOps)
            .unwrap();
        assert_eq!(report.stats().skipped, 1);
        assert!(dest.join("A").is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn execute_removes_own_links_only() {
        let (tmp, src, dest) = roots(&["A", "B", "C"]);
        Putaway
            .execute(&plan(&src, &dest), &SystemFileSystemOps)
            .unwrap();
        fs::remove_file(dest.join("B")).unwrap();
        std::os::unix::fs::symlink(tmp.path(), dest.join("B")).unwrap();

        let plan = plan(&src, &dest);
        assert_eq!(
            Unputaway.describe(&plan).to_string(),
            format!(
                "RM:    {}\nSKIP:  {} - {} links to {} instead of {}\nRM:    {}\n",
                dest.join("A").display(),
                dest.join("B").display(),
                dest.join("B").display(),
                tmp.path().display(),
                src.join("B").display(),
                dest.join("C").display(),
            )
        );

        let report = Unputaway.execute(&plan, &SystemFileSystemOps).unwrap();
        assert_eq!(report.stats().changed, 2);
        assert!(fs::symlink_metadata(dest.join("A")).is_err());
        assert!(fs::symlink_metadata(dest.join("C")).is_err());
        assert!(fs::symlink_metadata(dest.join("B")).unwrap().is_symlink());
        assert!(src.join("A").exists());
    }

    #[cfg(unix)]
    #[test]
    fn execute_collects_removal_failures() {
        let (_tmp, src, dest) = roots(&["A", "B"]);
        Putaway
            .execute(&plan(&src, &dest), &SystemFileSystemOps)
            .unwrap();
        let mock = MockFileSystemOps::new().fail_on(dest.join("A"));
        let err = Unputaway.execute(&plan(&src, &dest), &mock).unwrap_err();

        let ExecuteError::NodesFailed { failed, report, .. } = err;
        assert_eq!(failed, 1);
        assert_eq!(report.entries()[1].outcome, Outcome::Removed);
        assert_eq!(
            mock.calls(),
            [
                Call::RemoveSymlink(dest.join("A")),
                Call::RemoveSymlink(dest.join("B")),
            ]
        );
    }
}
