use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use super::{VcsError, GITIGNORE_FILENAME, GIT_DIR};

/// Identity for the audit commit; the repository never leaves the machine.
const COMMIT_IDENTITY: [&str; 6] = [
    "-c",
    "user.name=binpatch",
    "-c",
    "user.email=binpatch@localhost",
    "-c",
    "commit.gpgsign=false",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    AlreadyInitialized,
}

#[derive(Debug, Clone)]
pub struct Git {
    program: PathBuf,
}

impl Default for Git {
    fn default() -> Self {
        Self::new()
    }
}

impl Git {
    pub fn new() -> Self {
        Self::with_program("git")
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Git {
            program: program.into(),
        }
    }

    pub fn is_initialized(&self, dir: &Path) -> bool {
        dir.join(GIT_DIR).exists()
    }

    /// Turn `dir` into a repository whose first commit is the pristine tree.
    ///
    /// Does nothing if `dir` already has git metadata.
    pub fn init(&self, dir: &Path, ignore_lines: &[String]) -> Result<InitOutcome, VcsError> {
        if self.is_initialized(dir) {
            info!(dir = %dir.display(), "git repository already initialized");
            return Ok(InitOutcome::AlreadyInitialized);
        }

        info!(dir = %dir.display(), "initializing git repository");
        let ignore_path = dir.join(GITIGNORE_FILENAME);
        let mut ignore = ignore_lines.join("\n");
        ignore.push('\n');
        fs::write(&ignore_path, ignore).map_err(|source| VcsError::Io {
            path: ignore_path,
            source,
        })?;

        self.run(dir, &["init", "-q"])?;
        self.run(dir, &["add", "."])?;
        let mut commit: Vec<&str> = COMMIT_IDENTITY.to_vec();
        commit.extend(["commit", "-q", "--no-verify", "-m", "initialize"]);
        self.run(dir, &commit)?;

        info!(dir = %dir.display(), "git repository initialized");
        Ok(InitOutcome::Created)
    }

    /// Paths (relative to `dir`) of tracked files with local edits.
    pub fn diff_name_only(&self, dir: &Path) -> Result<Vec<String>, VcsError> {
        let out = self.run(dir, &["diff", "--name-only", "-z"])?;
        Ok(out
            .split('\0')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Unified diff of the local edits to one file.
    pub fn diff_file(&self, dir: &Path, path: &str) -> Result<String, VcsError> {
        self.run(
            dir,
            &[
                "diff",
                "--no-color",
                "--no-ext-diff",
                "--src-prefix=a/",
                "--dst-prefix=b/",
                "--",
                path,
            ],
        )
    }

    fn run(&self, dir: &Path, args: &[&str]) -> Result<String, VcsError> {
        let shown = args.join(" ");
        debug!(dir = %dir.display(), args = %shown, "running git");

        let out = Command::new(&self.program)
            .current_dir(dir)
            .args(args)
            .output()
            .map_err(|source| VcsError::Spawn {
                args: shown.clone(),
                source,
            })?;

        if !out.status.success() {
            return Err(VcsError::Failed {
                args: shown,
                status: out.status.to_string(),
                stderr: String::from_utf8_lossy(&out.stderr).trim().to_string(),
            });
        }

        String::from_utf8(out.stdout).map_err(|_| VcsError::NonUtf8 { args: shown })
    }
}
