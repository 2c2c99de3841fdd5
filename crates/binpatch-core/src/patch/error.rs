use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::vcs::VcsError;

/// A patch that could not be applied, reversed, or written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchFailure {
    pub patch: String,
    pub reason: String,
}

impl PatchFailure {
    pub fn new(patch: impl Into<String>, reason: impl ToString) -> Self {
        PatchFailure {
            patch: patch.into(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for PatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.patch, self.reason)
    }
}

/// Error type for patch-state operations.
#[derive(Debug, Error)]
pub enum PatchError {
    /// An expected directory or file could not be read or written
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Authoring needs a git working copy in the target tree
    #[error("git repository not initialized in {}; run `binpatch init` first", .dir.display())]
    NotInitialized { dir: PathBuf },
    /// Previously applied patches could not all be reversed. The snapshot is
    /// left in place and the target tree is in a mixed state.
    #[error(
        "reverse failed for {} previously applied patch(es): {}",
        .failures.len(),
        names(.failures)
    )]
    ReverseFailed {
        failures: Vec<PatchFailure>,
        /// Failures from the apply pass that ran after the reverse pass
        apply_failures: Vec<PatchFailure>,
    },
    /// One or more canonical patches did not apply cleanly
    #[error("apply failed for {} patch(es): {}", .failures.len(), names(.failures))]
    ApplyFailed { failures: Vec<PatchFailure> },
    #[error(transparent)]
    Vcs(#[from] VcsError),
    #[error("invalid config {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },
}

impl PatchError {
    /// Adapter for `map_err` that attaches the path being touched.
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> PatchError {
        let path = path.into();
        move |source| PatchError::Io { path, source }
    }

    /// Per-patch failures carried by this error, if any.
    pub fn failures(&self) -> &[PatchFailure] {
        match self {
            PatchError::ReverseFailed { failures, .. } | PatchError::ApplyFailed { failures } => {
                failures
            }
            _ => &[],
        }
    }
}

fn names(failures: &[PatchFailure]) -> String {
    failures
        .iter()
        .map(|f| f.patch.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
