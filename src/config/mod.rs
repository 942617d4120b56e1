//! Settings file for p4triage.
//!
//! Settings live in `~/.p4triage/config.yml`. Every field is optional:
//!
//! ```yaml
//! p4_program: /opt/perforce/bin/p4
//! project_dir: Project
//! content_dir: Content
//! display_limit: 15
//! spinner: true
//! ```
//!
//! A missing file means defaults. A malformed file is reported and also
//! means defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::storage::tool_home;

pub const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Program invoked for every `p4` call
    pub p4_program: String,

    /// Project folder, relative to the client root
    pub project_dir: String,

    /// Content folder, relative to the project folder
    pub content_dir: String,

    /// Rows shown per bucket in a scan listing
    pub display_limit: usize,

    /// Show the elapsed-time spinner during verbose scans
    pub spinner: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            p4_program: "p4".to_string(),
            project_dir: "Project".to_string(),
            content_dir: "Content".to_string(),
            display_limit: 15,
            spinner: true,
        }
    }
}

/// `~/.p4triage/config.yml`
pub fn config_path() -> Result<PathBuf> {
    Ok(tool_home()?.join(CONFIG_FILE))
}

impl Settings {
    pub fn parse(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }

    /// Never fails: problems are logged and the defaults are used
    pub fn load_from(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings file at {}", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!("Cannot read {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match Self::parse(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring malformed {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load() -> Self {
        match config_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                warn!("{}", e);
                Self::default()
            }
        }
    }

    pub fn project_path(&self, client_root: &Path) -> PathBuf {
        client_root.join(&self.project_dir)
    }

    pub fn content_path(&self, client_root: &Path) -> PathBuf {
        self.project_path(client_root).join(&self.content_dir)
    }
}
