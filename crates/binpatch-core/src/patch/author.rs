//! Turning local edits in a git-initialized target tree into canonical patches.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::patch::constants::PATCH_EXTENSION;
use crate::patch::error::{PatchError, PatchFailure};
use crate::vcs::Git;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateReport {
    /// The working copy has no local edits
    NoChanges,
    Written {
        written: Vec<PathBuf>,
        /// Files skipped because their diff could not be produced or written
        failures: Vec<PatchFailure>,
    },
}

/// Write one patch per locally modified file into `patches_dir`.
///
/// Existing patches with the same name are overwritten. A file that fails is
/// logged and skipped; it never stops the others.
pub fn create_patches(
    target_dir: &Path,
    patches_dir: &Path,
    git: &Git,
) -> Result<CreateReport, PatchError> {
    if !git.is_initialized(target_dir) {
        return Err(PatchError::NotInitialized {
            dir: target_dir.to_path_buf(),
        });
    }

    let changed = git.diff_name_only(target_dir)?;
    if changed.is_empty() {
        info!("no changes detected");
        return Ok(CreateReport::NoChanges);
    }

    fs::create_dir_all(patches_dir).map_err(PatchError::io(patches_dir))?;

    let mut written = Vec::new();
    let mut failures = Vec::new();
    for file in &changed {
        match write_patch(target_dir, patches_dir, git, file) {
            Ok(path) => {
                info!(patch = %path.display(), "created/updated patch");
                written.push(path);
            }
            Err(e) => {
                warn!(file = %file, error = %e, "failed to create patch");
                failures.push(PatchFailure::new(file.as_str(), e));
            }
        }
    }

    Ok(CreateReport::Written { written, failures })
}

fn write_patch(
    target_dir: &Path,
    patches_dir: &Path,
    git: &Git,
    file: &str,
) -> Result<PathBuf, PatchError> {
    let diff = git.diff_file(target_dir, file)?;
    let path = patches_dir.join(patch_name(file));
    fs::write(&path, normalize_headers(&diff)).map_err(PatchError::io(&path))?;
    Ok(path)
}

/// Rewrite `a/`/`b/` file markers to the `./` form the applier resolves
/// against the target root, and end the text with exactly one newline.
///
/// Only header lines are touched; hunk bodies pass through unchanged, including
/// the carriage returns of CRLF files.
pub fn normalize_headers(diff: &str) -> String {
    let mut out = String::with_capacity(diff.len());
    let mut in_header = true;
    for line in diff.trim_end_matches('\n').split('\n') {
        if line.starts_with("diff ") {
            in_header = true;
        } else if line.starts_with("@@") {
            in_header = false;
        }

        let rewritten = if in_header {
            line.strip_prefix("--- a/")
                .map(|rest| ("--- ./", rest))
                .or_else(|| line.strip_prefix("+++ b/").map(|rest| ("+++ ./", rest)))
        } else {
            None
        };
        match rewritten {
            Some((marker, rest)) => {
                out.push_str(marker);
                out.push_str(rest);
            }
            None => out.push_str(line),
        }
        out.push('\n');
    }
    out
}

/// Patch file name for a tree-relative path: separators flattened to `-`,
/// last extension dropped.
///
/// `browser/chrome/content/tabs.js` becomes `browser-chrome-content-tabs.patch`.
pub fn patch_name(file: &str) -> String {
    let flat = file.replace(['/', '\\'], "-");
    let stem = match flat.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => stem,
        _ => flat.as_str(),
    };
    format!("{stem}{PATCH_EXTENSION}")
}
