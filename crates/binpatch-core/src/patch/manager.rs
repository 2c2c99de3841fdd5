//! Two-phase patch application against a target tree.
//!
//! Phase 1 reverses every patch recorded in the snapshot, last applied first.
//! Phase 2 applies the canonical set and records each patch in the snapshot
//! as soon as it lands.
//! Both phases attempt every patch; failures are collected and only turned
//! into an error once both phases have run.

use std::fmt;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::patch::applier::DiffApplier;
use crate::patch::error::{PatchError, PatchFailure};
use crate::patch::status::{self, StatusReport};
use crate::patch::store::{Patch, PatchFileStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Reverse,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "apply"),
            Direction::Reverse => write!(f, "reverse"),
        }
    }
}

/// Outcome of one pass over a list of patches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhaseReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<PatchFailure>,
}

impl PhaseReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A fully successful `apply_patches` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Patches reversed from the previous run's snapshot
    pub reversed: Vec<String>,
    /// Canonical patches applied and recorded, in order
    pub applied: Vec<String>,
}

pub struct PatchStateManager<A> {
    store: PatchFileStore,
    applier: A,
}

impl<A: DiffApplier> PatchStateManager<A> {
    pub fn new(store: PatchFileStore, applier: A) -> Self {
        PatchStateManager { store, applier }
    }

    pub fn store(&self) -> &PatchFileStore {
        &self.store
    }

    /// Bring `target_dir` to "canonical patch set applied in order".
    ///
    /// Anything the snapshot says is applied is reversed first. The snapshot
    /// is cleared only if every reversal succeeded. The apply pass runs in
    /// every case. A reverse failure is reported ahead of an apply failure.
    pub fn apply_patches(&self, target_dir: &Path) -> Result<ApplyReport, PatchError> {
        let reversed = self.reverse_applied(target_dir)?;
        let applied = self.apply_canonical(target_dir);
        settle(reversed, applied)
    }

    /// Reverse everything the snapshot records and drop the snapshot.
    ///
    /// On failure the snapshot stays in place and nothing is reapplied.
    pub fn reverse_patches(&self, target_dir: &Path) -> Result<Vec<String>, PatchError> {
        match self.reverse_applied(target_dir)? {
            None => Ok(Vec::new()),
            Some(report) if report.is_clean() => Ok(report.succeeded),
            Some(report) => Err(PatchError::ReverseFailed {
                failures: report.failed,
                apply_failures: Vec::new(),
            }),
        }
    }

    /// Compare the canonical store with the snapshot without touching either.
    pub fn status(&self) -> Result<StatusReport, PatchError> {
        status::status(&self.store)
    }

    fn reverse_applied(&self, target_dir: &Path) -> Result<Option<PhaseReport>, PatchError> {
        let Some(applied) = self.store.list_applied()? else {
            debug!("no applied patches recorded, skipping reverse pass");
            return Ok(None);
        };

        // Later patches may sit on context introduced by earlier ones
        let mut report = PhaseReport::default();
        for patch in applied.iter().rev() {
            match self.run_step(patch, target_dir, Direction::Reverse) {
                Ok(()) => report.succeeded.push(patch.name().to_string()),
                Err(failure) => report.failed.push(failure),
            }
        }

        if report.is_clean() {
            self.store.clear_snapshot()?;
        } else {
            warn!(
                snapshot = %self.store.snapshot_dir().display(),
                "leaving applied-patch snapshot in place after reverse failure"
            );
        }

        Ok(Some(report))
    }

    fn apply_canonical(&self, target_dir: &Path) -> Result<PhaseReport, PatchError> {
        let patches = self.store.list_canonical()?;
        self.store.ensure_snapshot()?;

        let mut report = PhaseReport::default();
        for patch in &patches {
            match self.run_step(patch, target_dir, Direction::Forward) {
                Ok(()) => match self.store.record_applied(patch) {
                    Ok(()) => report.succeeded.push(patch.name().to_string()),
                    Err(e) => {
                        // Applied but unrecorded: the next run cannot reverse it
                        warn!(patch = patch.name(), error = %e, "failed to record applied patch");
                        report.failed.push(PatchFailure::new(patch.name(), e));
                    }
                },
                Err(failure) => report.failed.push(failure),
            }
        }

        Ok(report)
    }

    fn run_step(
        &self,
        patch: &Patch,
        target_dir: &Path,
        direction: Direction,
    ) -> Result<(), PatchFailure> {
        let outcome = patch.read().map_err(|e| e.to_string()).and_then(|diff| {
            self.applier
                .apply_diff(target_dir, &diff, direction == Direction::Reverse)
                .map_err(|e| e.to_string())
        });

        match outcome {
            Ok(()) => {
                info!(patch = patch.name(), "{direction} ok");
                Ok(())
            }
            Err(reason) => {
                warn!(patch = %patch.path().display(), %reason, "failed to {direction} patch");
                Err(PatchFailure::new(patch.name(), reason))
            }
        }
    }
}

/// Fold both phase outcomes into the single result callers see.
fn settle(
    reversed: Option<PhaseReport>,
    applied: Result<PhaseReport, PatchError>,
) -> Result<ApplyReport, PatchError> {
    let reversed = reversed.unwrap_or_default();

    if !reversed.is_clean() {
        let apply_failures = match applied {
            Ok(report) => report.failed,
            Err(e) => {
                warn!(error = %e, "apply pass aborted after reverse failure");
                Vec::new()
            }
        };
        return Err(PatchError::ReverseFailed {
            failures: reversed.failed,
            apply_failures,
        });
    }

    let applied = applied?;
    if !applied.is_clean() {
        return Err(PatchError::ApplyFailed {
            failures: applied.failed,
        });
    }

    Ok(ApplyReport {
        reversed: reversed.succeeded,
        applied: applied.succeeded,
    })
}
