use std::process::{Command, Stdio};

/// Tests that drive the real `git` binary return early without it.
pub(crate) fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
