//! Apply executor: link every planned node into the destination.
use std::collections::HashSet;
use std::path::PathBuf;

use super::{Description, Executor, Outcome, Report, Step, intermediate_dir};
use crate::error::ExecuteError;
use crate::operations::FileSystemOps;
use crate::plan::{Node, Plan, Slot};

/// Creates a symlink at each node's planned path pointing at the node.
///
/// Occupied slots are never overwritten; they are reported as skips. In
/// link-files-only mode the directories between the destination root and
/// each leaf are created first with the plan's directory mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct Putaway;

impl Executor for Putaway {
    fn name(&self) -> &'static str {
        "putaway"
    }

    fn describe(&self, plan: &Plan) -> Description {
        let mut description = Description::default();
        let mut announced = HashSet::new();
        for node in plan.nodes() {
            let link = node.planned_path(plan);
            let target = node.path().to_path_buf();
            match node.check(plan) {
                Ok(Slot::Vacant) => {
                    if let Some(dir) = missing_dir(plan, node, &mut announced) {
                        description.push(Step::Mkdir(dir));
                    }
                    description.push(Step::Link { link, target });
                }
                Ok(Slot::Linked) => description.push(Step::Keep { link, target }),
                Err(conflict) => description.push(Step::Skip {
                    link,
                    reason: conflict.into(),
                }),
            }
        }
        description
    }

    fn execute(&self, plan: &Plan, fs: &dyn FileSystemOps) -> Result<Report, ExecuteError> {
        let mut report = Report::default();
        for node in plan.nodes() {
            let outcome = match node.check(plan) {
                Ok(Slot::Vacant) => link(plan, node, fs),
                Ok(Slot::Linked) => Outcome::AlreadyLinked,
                Err(conflict) => Outcome::Skipped(conflict.into()),
            };
            report.push(plan, node, outcome);
        }
        report.into_result()
    }
}

fn link(plan: &Plan, node: &Node, fs: &dyn FileSystemOps) -> Outcome {
    if plan.options().link_files_only
        && let Some(dir) = intermediate_dir(plan, node)
        && let Err(e) = fs.create_dir_all(&dir, plan.dir_mode())
    {
        return Outcome::Failed(format!("creating directory {}: {e}", dir.display()));
    }
    match fs.symlink(node.path(), &node.planned_path(plan)) {
        Ok(()) => Outcome::Linked,
        Err(e) => Outcome::Failed(e.to_string()),
    }
}

/// The intermediate directory `node` needs, if it does not exist yet and has
/// not been announced already. Announcing a directory also covers its
/// ancestors under the destination root.
fn missing_dir(plan: &Plan, node: &Node, announced: &mut HashSet<PathBuf>) -> Option<PathBuf> {
    if !plan.options().link_files_only {
        return None;
    }
    let dir = intermediate_dir(plan, node)?;
    if announced.contains(&dir) || dir.is_dir() {
        return None;
    }
    for ancestor in dir.ancestors().take_while(|a| *a != plan.dest()) {
        announced.insert(ancestor.to_path_buf());
    }
    Some(dir)
}
