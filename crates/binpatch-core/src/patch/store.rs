//! On-disk patch directories: the canonical store and the applied snapshot.
//!
//! The canonical store is owned by authors and never written by the applier.
//! The snapshot holds byte-identical copies of the canonical patches that the
//! last apply pass got into the target tree, so the next run knows exactly
//! which text to reverse even if the canonical patch has since changed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::patch::constants::PATCH_EXTENSION;
use crate::patch::error::PatchError;

/// A unified-diff file identified by its file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    name: String,
    path: PathBuf,
}

impl Patch {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> Result<String, PatchError> {
        fs::read_to_string(&self.path).map_err(PatchError::io(&self.path))
    }
}

#[derive(Debug, Clone)]
pub struct PatchFileStore {
    patches_dir: PathBuf,
    snapshot_dir: PathBuf,
}

impl PatchFileStore {
    pub fn new(patches_dir: impl Into<PathBuf>, snapshot_dir: impl Into<PathBuf>) -> Self {
        PatchFileStore {
            patches_dir: patches_dir.into(),
            snapshot_dir: snapshot_dir.into(),
        }
    }

    pub fn patches_dir(&self) -> &Path {
        &self.patches_dir
    }

    pub fn snapshot_dir(&self) -> &Path {
        &self.snapshot_dir
    }

    /// List the canonical patch set in application order.
    ///
    /// A missing store is an error: packaging creates it, not this code.
    pub fn list_canonical(&self) -> Result<Vec<Patch>, PatchError> {
        list_patches(&self.patches_dir)
    }

    /// List the patches recorded as applied, or `None` when nothing is applied.
    pub fn list_applied(&self) -> Result<Option<Vec<Patch>>, PatchError> {
        if !self.snapshot_dir.is_dir() {
            return Ok(None);
        }
        list_patches(&self.snapshot_dir).map(Some)
    }

    pub fn ensure_snapshot(&self) -> Result<(), PatchError> {
        fs::create_dir_all(&self.snapshot_dir).map_err(PatchError::io(&self.snapshot_dir))
    }

    /// Copy a canonical patch into the snapshot.
    ///
    /// Only call this once the patch is known to be in the target tree.
    pub fn record_applied(&self, patch: &Patch) -> Result<(), PatchError> {
        let dest = self.snapshot_dir.join(patch.name());
        fs::copy(patch.path(), &dest).map_err(PatchError::io(&dest))?;
        Ok(())
    }

    /// Remove the snapshot directory and everything in it.
    ///
    /// Only call this once every recorded patch has been reversed.
    pub fn clear_snapshot(&self) -> Result<(), PatchError> {
        match fs::remove_dir_all(&self.snapshot_dir) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PatchError::io(&self.snapshot_dir)(e)),
        }
    }
}

/// Patch files directly inside `dir`, sorted by file name.
fn list_patches(dir: &Path) -> Result<Vec<Patch>, PatchError> {
    let mut patches = Vec::new();

    for entry in fs::read_dir(dir).map_err(PatchError::io(dir))? {
        let entry = entry.map_err(PatchError::io(dir))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            warn!(path = %path.display(), "skipping entry with a non-UTF-8 name");
            continue;
        };
        if name.ends_with(PATCH_EXTENSION) {
            patches.push(Patch { name, path });
        }
    }

    patches.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(patches)
}
