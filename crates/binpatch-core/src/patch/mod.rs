pub mod applier;
pub mod author;
mod constants;
mod error;
pub mod manager;
pub mod status;
pub mod store;

// Re-export public items
pub use applier::{ApplyDiffError, DiffApplier, GitApplier};
pub use author::{create_patches, normalize_headers, patch_name, CreateReport};
pub use constants::{PATCHES_DIR, PATCH_EXTENSION, SNAPSHOT_DIR};
pub use error::{PatchError, PatchFailure};
pub use manager::{ApplyReport, PatchStateManager, PhaseReport};
pub use status::{PatchState, PatchStatus, StatusReport};
pub use store::{Patch, PatchFileStore};
