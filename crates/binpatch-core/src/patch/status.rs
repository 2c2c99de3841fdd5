//! Read-only comparison of the canonical store against the applied snapshot.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;

use crate::patch::error::PatchError;
use crate::patch::store::{Patch, PatchFileStore};
use crate::utils::hash::hash_bytes;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchState {
    /// Snapshot copy matches the canonical patch
    Applied,
    /// Snapshot copy differs from the canonical patch
    Stale,
    /// Canonical patch with no snapshot copy
    Pending,
    /// Snapshot copy with no canonical patch
    Orphaned,
}

impl fmt::Display for PatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PatchState::Applied => "applied",
            PatchState::Stale => "stale",
            PatchState::Pending => "pending",
            PatchState::Orphaned => "orphaned",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchStatus {
    pub name: String,
    pub state: PatchState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub snapshot_present: bool,
    /// Canonical patches in application order, then orphans
    pub entries: Vec<PatchStatus>,
}

impl StatusReport {
    pub fn is_clean(&self) -> bool {
        self.entries.iter().all(|e| e.state == PatchState::Applied)
    }

    pub fn count(&self, state: PatchState) -> usize {
        self.entries.iter().filter(|e| e.state == state).count()
    }
}

pub fn status(store: &PatchFileStore) -> Result<StatusReport, PatchError> {
    let canonical = store.list_canonical()?;
    let applied = store.list_applied()?;
    let snapshot_present = applied.is_some();

    let mut recorded: BTreeMap<String, String> = BTreeMap::new();
    for patch in applied.unwrap_or_default() {
        recorded.insert(patch.name().to_string(), content_hash(&patch)?);
    }

    let mut entries = Vec::with_capacity(canonical.len());
    for patch in &canonical {
        let state = match recorded.remove(patch.name()) {
            None => PatchState::Pending,
            Some(hash) => {
                if hash == content_hash(patch)? {
                    PatchState::Applied
                } else {
                    PatchState::Stale
                }
            }
        };
        entries.push(PatchStatus {
            name: patch.name().to_string(),
            state,
        });
    }

    entries.extend(recorded.into_keys().map(|name| PatchStatus {
        name,
        state: PatchState::Orphaned,
    }));

    Ok(StatusReport {
        snapshot_present,
        entries,
    })
}

fn content_hash(patch: &Patch) -> Result<String, PatchError> {
    let data = fs::read(patch.path()).map_err(PatchError::io(patch.path()))?;
    Ok(hash_bytes(&data))
}
