//! Apply/reverse cycles driven through the real `git apply`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use binpatch_core::patch::{
    GitApplier, PatchError, PatchFileStore, PatchStateManager,
};
use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};

const ADD_X: &str = "--- ./f.txt\n+++ ./f.txt\n@@ -1 +1,2 @@\n base\n+X\n";
const ADD_Y_AFTER_X: &str = "--- ./f.txt\n+++ ./f.txt\n@@ -1,2 +1,3 @@\n base\n X\n+Y\n";
const ADD_Z_TO_G: &str = "--- ./sub/g.txt\n+++ ./sub/g.txt\n@@ -1 +1,2 @@\n one\n+Z\n";

fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

struct Project {
    root: TempDir,
}

impl Project {
    fn new(patches: &[(&str, &str)]) -> Self {
        let root = tempdir().unwrap();
        let project = Project { root };
        fs::create_dir_all(project.patches_dir()).unwrap();
        fs::create_dir_all(project.target().join("sub")).unwrap();
        fs::write(project.target().join("f.txt"), "base\n").unwrap();
        fs::write(project.target().join("sub/g.txt"), "one\n").unwrap();
        for (name, text) in patches {
            project.write_patch(name, text);
        }
        project
    }

    fn patches_dir(&self) -> PathBuf {
        self.root.path().join("scripts/git-patches/patches")
    }

    fn snapshot_dir(&self) -> PathBuf {
        self.root.path().join("_dist/bin/applied_patches")
    }

    fn target(&self) -> PathBuf {
        self.root.path().join("_dist/bin/tree")
    }

    fn write_patch(&self, name: &str, text: &str) {
        fs::write(self.patches_dir().join(name), text).unwrap();
    }

    fn manager(&self) -> PatchStateManager<GitApplier> {
        PatchStateManager::new(
            PatchFileStore::new(self.patches_dir(), self.snapshot_dir()),
            GitApplier::new(),
        )
    }

    fn read(&self, file: &str) -> String {
        fs::read_to_string(self.target().join(file)).unwrap()
    }

    fn snapshot(&self) -> Option<Vec<String>> {
        self.manager()
            .store()
            .list_applied()
            .unwrap()
            .map(|p| p.iter().map(|p| p.name().to_string()).collect())
    }
}

fn names(names: &[&str]) -> Option<Vec<String>> {
    Some(names.iter().map(|n| n.to_string()).collect())
}

#[test]
fn dependent_patches_apply_in_order_and_reapply_cleanly() {
    if !git_available() {
        return;
    }
    let project = Project::new(&[("a.patch", ADD_X), ("b.patch", ADD_Y_AFTER_X)]);

    let first = project.manager().apply_patches(&project.target()).unwrap();

    assert_eq!(first.applied, vec!["a.patch", "b.patch"]);
    assert_eq!(project.read("f.txt"), "base\nX\nY\n");
    assert_eq!(project.snapshot(), names(&["a.patch", "b.patch"]));

    let second = project.manager().apply_patches(&project.target()).unwrap();

    assert_eq!(second.reversed, vec!["b.patch", "a.patch"]);
    assert_eq!(second.applied, vec!["a.patch", "b.patch"]);
    assert_eq!(project.read("f.txt"), "base\nX\nY\n");
    assert_eq!(project.snapshot(), names(&["a.patch", "b.patch"]));
}

#[test]
fn apply_then_reverse_restores_pristine_tree() {
    if !git_available() {
        return;
    }
    let project = Project::new(&[("a.patch", ADD_X), ("g.patch", ADD_Z_TO_G)]);
    let manager = project.manager();

    manager.apply_patches(&project.target()).unwrap();
    assert_eq!(project.read("sub/g.txt"), "one\nZ\n");

    let reversed = manager.reverse_patches(&project.target()).unwrap();

    assert_eq!(reversed, vec!["g.patch", "a.patch"]);
    assert_eq!(project.read("f.txt"), "base\n");
    assert_eq!(project.read("sub/g.txt"), "one\n");
    assert!(!project.snapshot_dir().exists());
}

#[test]
fn snapshot_mirrors_canonical_set_after_success() {
    if !git_available() {
        return;
    }
    let project = Project::new(&[("g.patch", ADD_Z_TO_G), ("a.patch", ADD_X)]);
    let manager = project.manager();

    manager.apply_patches(&project.target()).unwrap();

    let canonical: Vec<String> = manager
        .store()
        .list_canonical()
        .unwrap()
        .iter()
        .map(|p| p.name().to_string())
        .collect();
    assert_eq!(project.snapshot(), Some(canonical));
}

#[test]
fn failing_patch_records_prefix_and_reports_apply_error() {
    if !git_available() {
        return;
    }
    // b depends on a context line that never appears
    let broken = "--- ./f.txt\n+++ ./f.txt\n@@ -1,2 +1,3 @@\n base\n missing\n+W\n";
    let project = Project::new(&[
        ("a.patch", ADD_X),
        ("b.patch", broken),
        ("c.patch", "--- ./f.txt\n+++ ./f.txt\n@@ -1,2 +1,3 @@\n base\n missing\n+V\n"),
    ]);

    let err = project
        .manager()
        .apply_patches(&project.target())
        .unwrap_err();

    match &err {
        PatchError::ApplyFailed { failures } => {
            let failed: Vec<&str> = failures.iter().map(|f| f.patch.as_str()).collect();
            assert_eq!(failed, vec!["b.patch", "c.patch"]);
        }
        other => panic!("expected ApplyFailed, got {other:?}"),
    }
    assert_eq!(project.snapshot(), names(&["a.patch"]));
    assert_eq!(project.read("f.txt"), "base\nX\n");
}

#[test]
fn reverse_failure_wins_over_apply_failure() {
    if !git_available() {
        return;
    }
    let project = Project::new(&[("a.patch", ADD_X)]);
    let manager = project.manager();
    manager.apply_patches(&project.target()).unwrap();

    // Someone edits the tree behind our back, so X can no longer be reversed,
    // and the canonical patch is replaced by one that cannot apply either.
    fs::write(project.target().join("f.txt"), "rewritten\n").unwrap();
    project.write_patch("a.patch", "--- ./f.txt\n+++ ./f.txt\n@@ -1 +1,2 @@\n base\n+Q\n");

    let err = manager.apply_patches(&project.target()).unwrap_err();

    match &err {
        PatchError::ReverseFailed {
            failures,
            apply_failures,
        } => {
            assert_eq!(failures[0].patch, "a.patch");
            assert_eq!(apply_failures[0].patch, "a.patch");
        }
        other => panic!("expected ReverseFailed, got {other:?}"),
    }
    // The apply pass still ran: the stale snapshot entry is still there and
    // reject files were left behind for inspection.
    assert_eq!(project.snapshot(), names(&["a.patch"]));
    assert!(rejects(&project.target()).contains(&"f.txt.rej".to_string()));
}

#[test]
fn first_run_without_snapshot_only_applies() {
    if !git_available() {
        return;
    }
    let project = Project::new(&[("a.patch", ADD_X)]);
    assert!(!project.snapshot_dir().exists());

    let report = project.manager().apply_patches(&project.target()).unwrap();

    assert!(report.reversed.is_empty());
    assert_eq!(project.read("f.txt"), "base\nX\n");
}

#[test]
fn changed_canonical_patch_is_swapped_on_next_run() {
    if !git_available() {
        return;
    }
    let project = Project::new(&[("a.patch", ADD_X)]);
    let manager = project.manager();
    manager.apply_patches(&project.target()).unwrap();

    project.write_patch("a.patch", "--- ./f.txt\n+++ ./f.txt\n@@ -1 +1,2 @@\n base\n+X2\n");
    manager.apply_patches(&project.target()).unwrap();

    assert_eq!(project.read("f.txt"), "base\nX2\n");
    assert!(manager.status().unwrap().is_clean());
}

#[test]
fn applies_relative_to_target_not_working_directory() {
    if !git_available() {
        return;
    }
    let project = Project::new(&[("a.patch", ADD_X)]);
    // A decoy f.txt in the process working directory must stay untouched
    let cwd_file = Path::new("f.txt");
    let decoy_existed = cwd_file.exists();

    project.manager().apply_patches(&project.target()).unwrap();

    assert_eq!(project.read("f.txt"), "base\nX\n");
    assert_eq!(cwd_file.exists(), decoy_existed);
}

fn rejects(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|n| n.ends_with(".rej"))
        .collect()
}
