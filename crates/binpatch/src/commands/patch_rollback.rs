use std::path::Path;

use binpatch_core::config::Layout;
use binpatch_core::patch::{GitApplier, PatchError, PatchStateManager};

/// Reverse previously applied patches and drop the snapshot.
///
/// Nothing is reapplied. Returns the reversed patch names, last applied first.
pub fn run(layout: &Layout, target_dir: &Path) -> Result<Vec<String>, PatchError> {
    PatchStateManager::new(layout.store(), GitApplier::new()).reverse_patches(target_dir)
}
