#![cfg(unix)]
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for removing links created by a put.
//!
//! Removal must only ever touch links that point at the node being removed;
//! everything else in the destination is reported as a skip and left alone.

mod common;

use std::fs;
use std::path::Path;

use away::commands::{Processed, process};
use away::error::Conflict;
use away::executor::{
    Executor, Operation, Outcome, SkipReason, putaway::Putaway, unputaway::Unputaway,
};
use away::operations::SystemFileSystemOps;
use away::plan::PlanOptions;
use common::TestTreeBuilder;

const DEEP: PlanOptions = PlanOptions {
    dry_run: false,
    link_files_only: true,
    dir_mode: None,
};

/// Put two files away, then remove both links.
#[test]
fn put_then_remove() {
    let tree = TestTreeBuilder::new().with_file("A").with_file("B").build();
    Putaway
        .execute(&tree.plan(PlanOptions::default()), &SystemFileSystemOps)
        .unwrap();

    let plan = tree.plan(PlanOptions::default());
    insta::assert_snapshot!(tree.redact(Unputaway.describe(&plan).to_string().trim_end()), @r"
    RM:    [DEST]/A
    RM:    [DEST]/B
    ");

    let report = Unputaway.execute(&plan, &SystemFileSystemOps).unwrap();
    assert!(report.entries().iter().all(|e| e.outcome == Outcome::Removed));
    assert_eq!(tree.layout(), "");
    assert!(tree.src.join("A").is_file());
    assert!(tree.src.join("B").is_file());
}

/// Linked directories are removed as a single link.
#[test]
fn removes_directory_links() {
    let tree = TestTreeBuilder::new().with_file("X/Y/z").build();
    Putaway
        .execute(&tree.plan(PlanOptions::default()), &SystemFileSystemOps)
        .unwrap();
    assert_eq!(tree.layout(), "X -> [SRC]/X");

    let plan = tree.plan(PlanOptions::default());
    assert_eq!(plan.nodes().len(), 1);
    Unputaway.execute(&plan, &SystemFileSystemOps).unwrap();
    assert_eq!(tree.layout(), "");
    assert!(tree.src.join("X/Y/z").is_file());
}

/// Plain files, directories and foreign links are never removed.
#[test]
fn skips_everything_it_does_not_own() {
    let tree = TestTreeBuilder::new()
        .with_file("A")
        .with_file("B")
        .with_file("C")
        .with_file("D")
        .with_dest_file("A")
        .with_dest_dir("B")
        .with_dest_symlink("C", Path::new("nowhere"))
        .build();

    let plan = tree.plan(PlanOptions::default());
    insta::assert_snapshot!(tree.redact(Unputaway.describe(&plan).to_string().trim_end()), @r"
    SKIP:  [DEST]/A - [DEST]/A is occupied by an existing file
    SKIP:  [DEST]/B - [DEST]/B is occupied by an existing directory
    SKIP:  [DEST]/C - [DEST]/C links to [DEST]/nowhere instead of [SRC]/C
    SKIP:  [DEST]/D - not linked
    ");

    let report = Unputaway.execute(&plan, &SystemFileSystemOps).unwrap();
    assert_eq!(report.stats().skipped, 4);
    insta::assert_snapshot!(tree.layout(), @r"
    A
    B/
    C -> nowhere
    ");
}

/// Deep-linked leaves are removed; the directories created for them stay.
#[test]
fn deep_link_removal_keeps_directories() {
    let tree = TestTreeBuilder::new().with_file("X/Y/z").with_file("X/w").build();
    Putaway.execute(&tree.plan(DEEP), &SystemFileSystemOps).unwrap();

    let processed = process(
        &tree.src,
        &tree.dest,
        Operation::Unputaway,
        DEEP,
        &SystemFileSystemOps,
    )
    .unwrap();
    assert!(matches!(processed, Processed::Executed(_)));
    assert_eq!(processed.stats().summary(false), "2 changed, 0 already ok");
    insta::assert_snapshot!(tree.layout(), @r"
    X/
    X/Y/
    ");
}

/// Removing twice is harmless: the second run only reports skips.
#[test]
fn remove_is_idempotent() {
    let tree = TestTreeBuilder::new().with_file("A").build();
    Putaway
        .execute(&tree.plan(PlanOptions::default()), &SystemFileSystemOps)
        .unwrap();
    Unputaway
        .execute(&tree.plan(PlanOptions::default()), &SystemFileSystemOps)
        .unwrap();

    let report = Unputaway
        .execute(&tree.plan(PlanOptions::default()), &SystemFileSystemOps)
        .unwrap();
    assert_eq!(
        report.entries()[0].to_string().rsplit(": ").next(),
        Some("skipped (not linked)")
    );
}

/// A link replaced after planning is no longer ours and survives removal.
#[test]
fn rechecks_link_at_execution() {
    let tree = TestTreeBuilder::new().with_file("A").build();
    Putaway
        .execute(&tree.plan(PlanOptions::default()), &SystemFileSystemOps)
        .unwrap();
    let plan = tree.plan(PlanOptions::default());
    assert_eq!(
        tree.redact(Unputaway.describe(&plan).to_string().trim_end()),
        "RM:    [DEST]/A"
    );

    let foreign = tree.root_path().join("foreign");
    fs::remove_file(tree.dest.join("A")).unwrap();
    std::os::unix::fs::symlink(&foreign, tree.dest.join("A")).unwrap();

    let report = Unputaway.execute(&plan, &SystemFileSystemOps).unwrap();
    assert!(matches!(
        &report.entries()[0].outcome,
        Outcome::Skipped(SkipReason::Conflict(Conflict::WrongLink { .. }))
    ));
    assert_eq!(fs::read_link(tree.dest.join("A")).unwrap(), foreign);
}
