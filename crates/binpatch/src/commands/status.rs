use binpatch_core::config::Layout;
use binpatch_core::patch::{GitApplier, PatchError, PatchStateManager, StatusReport};

pub fn run(layout: &Layout) -> Result<StatusReport, PatchError> {
    PatchStateManager::new(layout.store(), GitApplier::new()).status()
}
