use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{read_json, tool_home, write_json_atomic};
use crate::error::Result;

pub const BASELINE_FILE: &str = "baseline.json";

/// Opened files recorded at a moment the operator chose
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    pub timestamp: DateTime<Utc>,
    pub files: Vec<String>,
}

#[derive(Debug)]
pub struct BaselineStore {
    path: PathBuf,
}

impl BaselineStore {
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(tool_home()?.join(BASELINE_FILE)))
    }

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn capture(&self, files: Vec<String>) -> Result<Baseline> {
        let baseline = Baseline {
            timestamp: Utc::now(),
            files,
        };
        write_json_atomic(&self.path, &baseline)?;
        Ok(baseline)
    }

    /// `None` when no usable baseline has been captured
    pub fn load(&self) -> Option<Baseline> {
        read_json(&self.path)
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_capture_load_clear() {
        let dir = TempDir::new().unwrap();
        let store = BaselineStore::new(dir.path().join(BASELINE_FILE));
        assert!(store.load().is_none());

        let captured = store
            .capture(vec!["//depot/a.txt".to_string(), "//depot/b.txt".to_string()])
            .unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, captured);
        assert_eq!(loaded.files.len(), 2);

        store.clear().unwrap();
        assert!(store.load().is_none());
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_corrupt_baseline_is_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(BASELINE_FILE);
        fs::write(&path, "{\"timestamp\": 5}").unwrap();
        assert!(BaselineStore::new(path).load().is_none());
    }
}
