//! Thin wrapper around the `git` client, used to snapshot and diff a target tree.

mod git;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use git::{Git, InitOutcome};

/// Metadata directory whose presence marks an initialized tree
pub const GIT_DIR: &str = ".git";
/// Ignore-list file written by `Git::init`
pub const GITIGNORE_FILENAME: &str = ".gitignore";

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("failed to run git {args}: {source}")]
    Spawn {
        args: String,
        #[source]
        source: io::Error,
    },
    #[error("git {args} failed ({status}): {stderr}")]
    Failed {
        args: String,
        status: String,
        stderr: String,
    },
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("git {args} produced non-UTF-8 output")]
    NonUtf8 { args: String },
}
