//! Child processes owned by a dev session.
//!
//! The session is the single owner of every process it starts. Shutdown asks
//! each child to stop by writing a control byte to its stdin, then waits for
//! it, newest child first.

use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};

use binpatch_core::config::ChildCommand;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tracing::{debug, info, warn};

/// Byte a child reads on stdin as the request to shut down
pub const SHUTDOWN_BYTE: &[u8] = b"s";

struct Tracked {
    name: String,
    child: Child,
    stdin: Option<ChildStdin>,
}

#[derive(Default)]
pub struct DevSession {
    children: Vec<Tracked>,
    shutting_down: bool,
}

impl DevSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Start `command` in `cwd` with a piped stdin and inherited output.
    pub fn spawn(&mut self, command: &ChildCommand, cwd: &Path) -> io::Result<()> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;
        let stdin = child.stdin.take();

        info!(name = %command.name, pid = ?child.id(), "started");
        self.children.push(Tracked {
            name: command.name.clone(),
            child,
            stdin,
        });
        Ok(())
    }

    /// Resolves once every child has exited on its own.
    pub async fn wait_all(&mut self) {
        for tracked in &mut self.children {
            match tracked.child.wait().await {
                Ok(status) => info!(name = %tracked.name, %status, "exited"),
                Err(e) => warn!(name = %tracked.name, error = %e, "failed to wait for child"),
            }
        }
    }

    /// Stop every child, newest first, and return their exit statuses in that order.
    ///
    /// Only the first call does anything.
    pub async fn shutdown(&mut self) -> Vec<(String, Option<ExitStatus>)> {
        if self.shutting_down {
            return Vec::new();
        }
        self.shutting_down = true;

        let mut stopped = Vec::with_capacity(self.children.len());
        while let Some(mut tracked) = self.children.pop() {
            info!(name = %tracked.name, "start shutdown");
            if let Some(mut stdin) = tracked.stdin.take() {
                // The child may already be gone; a broken pipe is expected then
                if let Err(e) = stdin.write_all(SHUTDOWN_BYTE).await {
                    debug!(name = %tracked.name, error = %e, "could not signal child");
                }
            }

            let status = match tracked.child.wait().await {
                Ok(status) => Some(status),
                Err(e) => {
                    warn!(name = %tracked.name, error = %e, "failed to wait for child");
                    None
                }
            };
            info!(name = %tracked.name, "end shutdown");
            stopped.push((tracked.name, status));
        }

        info!("cleanup complete");
        stopped
    }
}
