//! Project configuration (`binpatch.json`) and the resolved directory layout.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::patch::{PatchError, PatchFileStore, PATCHES_DIR, SNAPSHOT_DIR};

/// Filename for the optional project configuration
pub const CONFIG_FILENAME: &str = "binpatch.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub patches_dir: PathBuf,
    pub snapshot_dir: PathBuf,
    /// Overrides the platform-dependent location of the extracted tree
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_dir: Option<PathBuf>,
    pub branding: Branding,
    /// Lines written to the target tree's ignore file on `init`
    pub git_ignore: Vec<String>,
    pub run: RunConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    pub base_name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub commands: Vec<ChildCommand>,
}

/// A long-running process started by the dev session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildCommand {
    pub name: String,
    pub program: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl Default for Branding {
    fn default() -> Self {
        Branding {
            base_name: "floorp".to_string(),
            display_name: "Floorp".to_string(),
        }
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            patches_dir: PathBuf::from(PATCHES_DIR),
            snapshot_dir: PathBuf::from(SNAPSHOT_DIR),
            bin_dir: None,
            branding: Branding::default(),
            git_ignore: vec![
                "/noraneko-dev/".to_string(),
                "/browser/chrome/browser/res/activity-stream/data/content/abouthomecache/"
                    .to_string(),
            ],
            run: RunConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Load configuration from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<ProjectConfig, PatchError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ProjectConfig::default()),
            Err(e) => return Err(PatchError::io(path)(e)),
        };
        serde_json::from_str(&content).map_err(|e| PatchError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), PatchError> {
        let content = serde_json::to_string_pretty(self).map_err(|e| PatchError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        fs::write(path, content).map_err(PatchError::io(path))
    }

    /// Extracted tree location, relative to the project root.
    pub fn bin_dir(&self) -> PathBuf {
        if let Some(dir) = &self.bin_dir {
            return dir.clone();
        }
        let base = Path::new("_dist/bin").join(&self.branding.base_name);
        if cfg!(target_os = "macos") {
            base.join(format!("{}.app", self.branding.display_name))
                .join("Contents/Resources")
        } else {
            base
        }
    }

    pub fn layout(&self, root: &Path) -> Layout {
        Layout {
            root: root.to_path_buf(),
            patches_dir: root.join(&self.patches_dir),
            snapshot_dir: root.join(&self.snapshot_dir),
            bin_dir: root.join(self.bin_dir()),
        }
    }
}

/// Configured directories resolved against a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub patches_dir: PathBuf,
    pub snapshot_dir: PathBuf,
    pub bin_dir: PathBuf,
}

impl Layout {
    pub fn store(&self) -> PatchFileStore {
        PatchFileStore::new(&self.patches_dir, &self.snapshot_dir)
    }
}
