//! Patch-state tracking for extracted binary trees.
//!
//! A canonical set of unified diffs lives in the project's patch store. Applying
//! it to a target tree first reverses whatever the previous run applied (as
//! recorded in the snapshot directory), then applies the canonical set in
//! order, recording each success as it happens.

pub mod config;
pub mod patch;
pub mod utils;
pub mod vcs;

#[cfg(test)]
mod test_support;
