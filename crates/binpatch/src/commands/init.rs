use std::path::{Path, PathBuf};

use binpatch_core::config::ProjectConfig;
use binpatch_core::patch::PatchError;
use binpatch_core::vcs::{Git, InitOutcome};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    pub outcome: InitOutcome,
    /// Set when no config file existed and the effective one was written out
    pub config_written: Option<PathBuf>,
}

/// Snapshot the pristine target tree into its own git repository, and write
/// `config` to `config_path` if that file does not exist yet.
pub fn run(
    config: &ProjectConfig,
    config_path: &Path,
    target_dir: &Path,
) -> Result<InitReport, PatchError> {
    let outcome = Git::new().init(target_dir, &config.git_ignore)?;

    let config_written = if config_path.exists() {
        None
    } else {
        config.save(config_path)?;
        info!(path = %config_path.display(), "wrote project config");
        Some(config_path.to_path_buf())
    };

    Ok(InitReport {
        outcome,
        config_written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::git_available;
    use binpatch_core::config::CONFIG_FILENAME;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn writes_configured_ignore_list() {
        if !git_available() {
            return;
        }
        let root = tempdir().unwrap();
        let target = root.path().join("tree");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("application.ini"), "[App]\n").unwrap();
        let config = ProjectConfig::default();
        let config_path = root.path().join(CONFIG_FILENAME);

        let report = run(&config, &config_path, &target).unwrap();

        assert_eq!(report.outcome, InitOutcome::Created);
        let ignore = fs::read_to_string(target.join(".gitignore")).unwrap();
        assert!(ignore.lines().eq(config.git_ignore.iter().map(String::as_str)));

        let again = run(&config, &config_path, &target).unwrap();
        assert_eq!(again.outcome, InitOutcome::AlreadyInitialized);
    }

    #[test]
    fn writes_config_only_when_missing() {
        let root = tempdir().unwrap();
        let target = root.path().join("tree");
        // Existing git metadata keeps this test free of the git binary
        fs::create_dir_all(target.join(".git")).unwrap();
        let config_path = root.path().join(CONFIG_FILENAME);
        let mut config = ProjectConfig::default();
        config.branding.base_name = "noraneko".to_string();

        let first = run(&config, &config_path, &target).unwrap();

        assert_eq!(first.config_written, Some(config_path.clone()));
        assert_eq!(ProjectConfig::load(&config_path).unwrap(), config);

        let second = run(&ProjectConfig::default(), &config_path, &target).unwrap();

        assert_eq!(second.config_written, None);
        assert_eq!(ProjectConfig::load(&config_path).unwrap(), config);
    }
}
