/// Suffix shared by canonical patches and their snapshot copies
pub const PATCH_EXTENSION: &str = ".patch";
/// Canonical patch store, relative to the project root
pub const PATCHES_DIR: &str = "scripts/git-patches/patches";
/// Copies of the patches currently applied to the target tree, relative to the project root
pub const SNAPSHOT_DIR: &str = "_dist/bin/applied_patches";
