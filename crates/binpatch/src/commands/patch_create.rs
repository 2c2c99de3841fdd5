use std::path::Path;

use binpatch_core::config::Layout;
use binpatch_core::patch::{create_patches, CreateReport, PatchError};
use binpatch_core::vcs::Git;

/// Write canonical patches for the local edits in a git-initialized target tree.
pub fn run(layout: &Layout, target_dir: &Path) -> Result<CreateReport, PatchError> {
    create_patches(target_dir, &layout.patches_dir, &Git::new())
}
