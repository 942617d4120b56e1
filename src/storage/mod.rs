//! JSON preference files under the tool home (`~/.p4triage`)

pub mod baseline;
pub mod recent;

pub use baseline::{Baseline, BaselineStore};
pub use recent::{RecentFolder, RecentFolders};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::{Error, Result};

pub const TOOL_DIR_NAME: &str = ".p4triage";

/// `~/.p4triage`
pub fn tool_home() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(TOOL_DIR_NAME))
        .ok_or_else(|| Error::Storage("Could not determine home directory".to_string()))
}

/// Pretty-printed JSON written through a sibling temp file and a rename
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_file = PathBuf::from(temp_name);

    let json = serde_json::to_string_pretty(value)?;
    fs::write(&temp_file, json)?;
    fs::rename(&temp_file, path)?;
    Ok(())
}

/// `None` when the file is missing, unreadable, or not valid JSON for `T`
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!("Cannot read {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&contents) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring corrupt {}: {}", path.display(), e);
            None
        }
    }
}
