use std::io;
use std::path::Path;

use binpatch_core::config::{Layout, ProjectConfig};
use binpatch_core::patch::{ApplyReport, PatchError};
use thiserror::Error;
use tracing::info;

use crate::commands::patch_apply;
use crate::session::DevSession;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error("failed to start {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Apply patches, then keep the configured dev processes running until
/// Ctrl-C or until they all exit.
///
/// A patch failure aborts before anything is started.
pub async fn run(
    config: &ProjectConfig,
    layout: &Layout,
    target_dir: &Path,
) -> Result<ApplyReport, RunError> {
    let report = patch_apply::run(layout, target_dir)?;

    let mut session = DevSession::new();
    for command in &config.run.commands {
        if let Err(source) = session.spawn(command, &layout.root) {
            session.shutdown().await;
            return Err(RunError::Spawn {
                name: command.name.clone(),
                source,
            });
        }
    }
    if session.is_empty() {
        info!("no run commands configured");
        return Ok(report);
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("interrupted"),
        _ = session.wait_all() => info!("all processes exited"),
    }
    session.shutdown().await;

    Ok(report)
}
