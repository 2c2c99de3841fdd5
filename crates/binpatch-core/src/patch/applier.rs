//! Applying a single unified diff to a directory.
//!
//! [`DiffApplier`] is the only way the state manager touches file contents.
//! [`GitApplier`] shells out to `git apply`, which handles fuzz, whitespace
//! repair, and reject files for hunks that do not fit.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ApplyDiffError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to stage diff for apply: {0}")]
    Io(#[source] io::Error),
    #[error("{program} exited with {status}: {stderr}")]
    Rejected {
        program: String,
        status: String,
        stderr: String,
    },
}

/// Applies (or reverses) diff text against a base directory.
///
/// Paths inside the diff are resolved relative to `base`, never to the
/// process working directory.
pub trait DiffApplier {
    fn apply_diff(&self, base: &Path, diff: &str, reverse: bool) -> Result<(), ApplyDiffError>;
}

/// [`DiffApplier`] backed by `git apply --reject`.
#[derive(Debug, Clone)]
pub struct GitApplier {
    program: PathBuf,
}

impl GitApplier {
    pub fn new() -> Self {
        Self::with_program("git")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        GitApplier {
            program: program.into(),
        }
    }

    fn args(reverse: bool, patch_path: &Path) -> Vec<String> {
        let mut args = vec!["apply".to_string()];
        if reverse {
            args.push("-R".to_string());
        }
        args.extend(
            ["--reject", "--whitespace=fix", "--unsafe-paths"]
                .iter()
                .map(|s| s.to_string()),
        );
        args.push(patch_path.to_string_lossy().to_string());
        args
    }
}

impl Default for GitApplier {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffApplier for GitApplier {
    fn apply_diff(&self, base: &Path, diff: &str, reverse: bool) -> Result<(), ApplyDiffError> {
        // git apply wants a file; the temp file lives until the end of this call
        let mut patch_file = tempfile::Builder::new()
            .prefix("binpatch-")
            .suffix(".patch")
            .tempfile()
            .map_err(ApplyDiffError::Io)?;
        patch_file
            .write_all(diff.as_bytes())
            .and_then(|()| patch_file.flush())
            .map_err(ApplyDiffError::Io)?;

        let args = Self::args(reverse, patch_file.path());
        let program = self.program.display().to_string();
        debug!(base = %base.display(), ?args, "running {program}");

        let output = Command::new(&self.program)
            .current_dir(base)
            .args(&args)
            .output()
            .map_err(|source| ApplyDiffError::Spawn {
                program: program.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        Err(ApplyDiffError::Rejected {
            program,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
