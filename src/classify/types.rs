//! Records produced by a workspace scan

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// What `p4` would open (or has opened) a file for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
    #[default]
    Edit,
    Add,
    Delete,
}

impl FileAction {
    pub fn as_str(self) -> &'static str {
        match self {
            FileAction::Edit => "edit",
            FileAction::Add => "add",
            FileAction::Delete => "delete",
        }
    }

    /// Upper-case tag used in listings, e.g. `EDIT`
    pub fn label(self) -> String {
        self.as_str().to_uppercase()
    }
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifiedFile {
    pub path: String,
    pub action: FileAction,
    pub has_changes: bool,
    pub is_opened: bool,
}

impl ModifiedFile {
    /// An opened file reported by `p4 diff -se` / `-sr`
    pub fn opened(path: impl Into<String>, has_changes: bool) -> Self {
        Self {
            path: path.into(),
            action: FileAction::Edit,
            has_changes,
            is_opened: true,
        }
    }

    /// A file that reconcile would open
    pub fn unopened(path: impl Into<String>, action: FileAction) -> Self {
        Self {
            path: path.into(),
            action,
            has_changes: true,
            is_opened: false,
        }
    }

    pub fn status_label(&self) -> &'static str {
        if self.is_opened {
            "OPENED"
        } else {
            "MODIFIED"
        }
    }
}

/// The three classification buckets of a single scan
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub opened_with_changes: Vec<ModifiedFile>,
    pub opened_without_changes: Vec<ModifiedFile>,
    pub not_opened_but_modified: Vec<ModifiedFile>,
    pub total: usize,
    pub duration: Duration,
}

impl ScanResult {
    pub fn new(
        opened_with_changes: Vec<ModifiedFile>,
        opened_without_changes: Vec<ModifiedFile>,
        not_opened_but_modified: Vec<ModifiedFile>,
        duration: Duration,
    ) -> Self {
        let total = opened_with_changes.len()
            + opened_without_changes.len()
            + not_opened_but_modified.len();
        Self {
            opened_with_changes,
            opened_without_changes,
            not_opened_but_modified,
            total,
            duration,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Files with real content changes, numbered for selection in this order.
    /// Hijacked files are excluded: there is nothing to restore for them.
    pub fn revert_candidates(&self) -> Vec<ModifiedFile> {
        self.opened_with_changes
            .iter()
            .chain(self.not_opened_but_modified.iter())
            .cloned()
            .collect()
    }

    /// Every file of every bucket, bucket by bucket
    pub fn all_files(&self) -> impl Iterator<Item = &ModifiedFile> {
        self.opened_with_changes
            .iter()
            .chain(self.opened_without_changes.iter())
            .chain(self.not_opened_but_modified.iter())
    }
}

/// What a scan should look at
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// File spec limiting the diff queries; `None` means the whole workspace
    pub scope: Option<String>,
    /// Folders for the reconcile preview; empty means the current directory
    pub folders: Vec<String>,
    pub opened_with_changes: bool,
    pub opened_without_changes: bool,
    pub not_opened: bool,
}

impl ScanOptions {
    /// All three categories over the whole workspace
    pub fn full(folders: Vec<String>) -> Self {
        Self {
            scope: None,
            folders,
            opened_with_changes: true,
            opened_without_changes: true,
            not_opened: true,
        }
    }

    /// Opened files only; no reconcile preview
    pub fn quick(scope: Option<String>) -> Self {
        Self {
            scope,
            folders: Vec::new(),
            opened_with_changes: true,
            opened_without_changes: true,
            not_opened: false,
        }
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Connection details reported by `p4 info`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub user_name: String,
    pub client_name: String,
    pub client_host: String,
    pub client_root: String,
    pub server_address: String,
    pub server_uptime: Option<String>,
    pub current_dir: PathBuf,
}

impl ClientInfo {
    /// Case-insensitive prefix check, matching how Windows clients report roots
    pub fn contains_current_dir(&self) -> bool {
        let current = self.current_dir.to_string_lossy().to_lowercase();
        current.starts_with(&self.client_root.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_result_total_and_candidates() {
        let result = ScanResult::new(
            vec![ModifiedFile::opened("/ws/a.txt", true)],
            vec![ModifiedFile::opened("/ws/b.txt", false)],
            vec![ModifiedFile::unopened("/ws/c.txt", FileAction::Add)],
            Duration::from_millis(5),
        );

        assert_eq!(result.total, 3);
        let candidates: Vec<_> = result
            .revert_candidates()
            .into_iter()
            .map(|f| f.path)
            .collect();
        assert_eq!(candidates, vec!["/ws/a.txt", "/ws/c.txt"]);
    }

    #[test]
    fn test_file_action_serde_is_lowercase() {
        let json = serde_json::to_string(&FileAction::Delete).unwrap();
        assert_eq!(json, "\"delete\"");
        assert_eq!(FileAction::default(), FileAction::Edit);
        assert_eq!(FileAction::Add.label(), "ADD");
    }

    #[test]
    fn test_contains_current_dir_ignores_case() {
        let info = ClientInfo {
            client_root: "C:\\Work\\Game".to_string(),
            current_dir: PathBuf::from("c:\\work\\game\\Project"),
            ..Default::default()
        };
        assert!(info.contains_current_dir());

        let outside = ClientInfo {
            client_root: "/ws".to_string(),
            current_dir: PathBuf::from("/home/me"),
            ..Default::default()
        };
        assert!(!outside.contains_current_dir());
    }
}
