use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{read_json, tool_home, write_json_atomic};
use crate::error::Result;

pub const RECENT_FOLDERS_FILE: &str = "recent_folders.json";
pub const MAX_RECENT_FOLDERS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentFolder {
    pub path: String,
    pub last_used: DateTime<Utc>,
    pub use_count: u32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecentFoldersFile {
    #[serde(default)]
    recent_folders: Vec<RecentFolder>,
}

/// Most recently used scan folders, persisted on every change
#[derive(Debug)]
pub struct RecentFolders {
    path: PathBuf,
    entries: Vec<RecentFolder>,
}

impl RecentFolders {
    /// Load `~/.p4triage/recent_folders.json`
    pub fn open_default() -> Result<Self> {
        Ok(Self::load(tool_home()?.join(RECENT_FOLDERS_FILE)))
    }

    /// A missing or corrupt file starts an empty list
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_json::<RecentFoldersFile>(&path)
            .map(|file| file.recent_folders)
            .unwrap_or_default();
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[RecentFolder] {
        &self.entries
    }

    pub fn add(&mut self, folder: &str) -> Result<()> {
        self.add_at(folder, Utc::now())
    }

    /// Record a use of `folder` at `now`. Known folders are updated in
    /// place; new ones are appended and only the last ten are kept.
    pub fn add_at(&mut self, folder: &str, now: DateTime<Utc>) -> Result<()> {
        match self.entries.iter_mut().find(|entry| entry.path == folder) {
            Some(entry) => {
                entry.last_used = now;
                entry.use_count += 1;
            }
            None => {
                self.entries.push(RecentFolder {
                    path: folder.to_string(),
                    last_used: now,
                    use_count: 1,
                });
                if self.entries.len() > MAX_RECENT_FOLDERS {
                    let excess = self.entries.len() - MAX_RECENT_FOLDERS;
                    self.entries.drain(..excess);
                }
            }
        }
        self.save()
    }

    /// Most recently used first
    pub fn sorted(&self) -> Vec<RecentFolder> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.last_used.cmp(&a.last_used));
        sorted
    }

    fn save(&self) -> Result<()> {
        let file = RecentFoldersFile {
            recent_folders: self.entries.clone(),
        };
        write_json_atomic(&self.path, &file)
    }
}
