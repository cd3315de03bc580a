//! Put away files by symlinking.
//!
//! `away` links the contents of a source directory into a destination
//! directory, in the manner of stow: a single link to a directory stands in
//! for everything beneath it, and existing destination directories are merged
//! into rather than replaced.
//!
//! The public API is organised into these layers:
//!
//! - **[`plan`]**: walk a source tree and choose the minimal set of nodes to link
//! - **[`executor`]**: describe or carry out a plan (put away, or remove)
//! - **[`operations`]**: the filesystem mutations executors perform
//! - **[`config`]**: the optional settings file and option precedence
//! - **[`commands`]**: the per-source pipeline and command-line orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod operations;
pub mod plan;
