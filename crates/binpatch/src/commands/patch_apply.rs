use std::path::Path;

use binpatch_core::config::Layout;
use binpatch_core::patch::{ApplyReport, GitApplier, PatchError, PatchStateManager};

/// Apply the canonical patch set to a target tree.
///
/// Workflow:
/// 1. Reverse every patch the snapshot records, last applied first
/// 2. Clear the snapshot if all reversals succeeded
/// 3. Apply each canonical patch, recording it in the snapshot on success
/// 4. Report a reverse failure ahead of an apply failure
pub fn run(layout: &Layout, target_dir: &Path) -> Result<ApplyReport, PatchError> {
    PatchStateManager::new(layout.store(), GitApplier::new()).apply_patches(target_dir)
}
