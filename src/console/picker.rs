//! Interactive choice of what to scan

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::display::{format_recent_folders, RULE};
use super::prompt::UserPrompter;
use crate::error::Result;
use crate::storage::RecentFolders;
use crate::subprocess::p4::recursive_spec;

/// Directories listed per browse page
pub const BROWSE_LIMIT: usize = 20;

/// Recent folders offered by the folder picker
pub const RECENT_LIMIT: usize = 5;

const SKIPPED_DIRS: [&str; 3] = ["node_modules", "bin", "obj"];

/// Where a query should look
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Workspace,
    Dir(PathBuf),
}

impl Location {
    /// File spec for the diff queries; `None` is the whole workspace
    pub fn scope_spec(&self) -> Option<String> {
        match self {
            Location::Workspace => None,
            Location::Dir(dir) => Some(recursive_spec(&dir.to_string_lossy())),
        }
    }

    /// Folders for the reconcile preview
    pub fn folders(&self, client_root: &Path) -> Vec<String> {
        let dir = match self {
            Location::Workspace => client_root,
            Location::Dir(dir) => dir.as_path(),
        };
        vec![dir.to_string_lossy().into_owned()]
    }
}

/// Which buckets a scan fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Categories {
    pub opened_with_changes: bool,
    pub opened_without_changes: bool,
    pub not_opened: bool,
}

/// Parse `1,2,3`-style category answers. Any unknown token rejects the
/// whole answer, as does an empty one.
pub fn parse_categories(input: &str) -> Option<Categories> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut categories = Categories::default();
    for token in input.split(',').map(str::trim) {
        match token {
            "1" => categories.opened_with_changes = true,
            "2" => categories.opened_without_changes = true,
            "3" => categories.not_opened = true,
            _ => return None,
        }
    }
    Some(categories)
}

/// Subdirectory names of `dir`, sorted, without hidden and build folders
pub fn list_subdirectories(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || SKIPPED_DIRS.contains(&name.as_str()) {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}

fn parse_index(input: &str, count: usize) -> Option<usize> {
    input
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| *n >= 1 && *n <= count)
        .map(|n| n - 1)
}

/// Scope menu: entire workspace, project folder, current directory, browse,
/// or a custom path relative to the client root. `None` means cancelled.
pub async fn pick_location(
    prompter: &dyn UserPrompter,
    title: &str,
    client_root: &Path,
    project_dir: &Path,
) -> Result<Option<Location>> {
    println!("\n{RULE}\n{title}\n{RULE}");
    println!("  1. Entire workspace");
    println!("  2. Project folder only");
    println!("  3. Current directory only");
    println!("  4. Browse and select directory");
    println!("  5. Custom path (type manually)");
    println!("  6. Cancel");

    let choice = prompter.prompt_text("\nEnter choice (1-6): ").await?;
    let location = match choice.as_str() {
        "1" => Some(Location::Workspace),
        "2" => Some(Location::Dir(project_dir.to_path_buf())),
        "3" => Some(Location::Dir(std::env::current_dir()?)),
        "4" => browse_directories(prompter, client_root)
            .await?
            .map(Location::Dir),
        "5" => custom_path(prompter, client_root, "workspace root")
            .await?
            .map(Location::Dir),
        "6" | "" => None,
        _ => {
            println!("Invalid choice.");
            None
        }
    };
    Ok(location)
}

async fn custom_path(
    prompter: &dyn UserPrompter,
    base: &Path,
    base_name: &str,
) -> Result<Option<PathBuf>> {
    let input = prompter
        .prompt_text(&format!("\nEnter directory path (relative to {base_name}): "))
        .await?;
    if input.is_empty() {
        return Ok(None);
    }

    let path = base.join(&input);
    if !path.is_dir() {
        println!("Path does not exist: {}", path.display());
        return Ok(None);
    }
    Ok(Some(path))
}

/// Walk the tree below `root` one level at a time and pick a directory
pub async fn browse_directories(
    prompter: &dyn UserPrompter,
    root: &Path,
) -> Result<Option<PathBuf>> {
    let mut current = root.to_path_buf();

    loop {
        let dirs = match list_subdirectories(&current) {
            Ok(dirs) => dirs,
            Err(e) => {
                println!("Error reading directory: {e}");
                return Ok(None);
            }
        };

        let relative = current.strip_prefix(root).unwrap_or(current.as_path());
        println!("\n{RULE}\nCurrent: /{}\n{RULE}", relative.display());
        if dirs.is_empty() {
            println!("  (No subdirectories)");
        }
        for (i, dir) in dirs.iter().take(BROWSE_LIMIT).enumerate() {
            println!("  {}. {}", i + 1, dir);
        }
        if dirs.len() > BROWSE_LIMIT {
            println!("  ... and {} more", dirs.len() - BROWSE_LIMIT);
        }
        println!("\nCommands:");
        println!("  [1-{BROWSE_LIMIT}]  - Enter subdirectory");
        println!("  [s]     - Select this directory");
        println!("  [u]     - Go up one level");
        println!("  [c]     - Cancel");

        let input = prompter
            .prompt_text("\nEnter command: ")
            .await?
            .to_lowercase();
        match input.as_str() {
            "s" => return Ok(Some(current)),
            "c" | "" => return Ok(None),
            "u" => {
                if current != root {
                    current.pop();
                }
            }
            other => match parse_index(other, dirs.len().min(BROWSE_LIMIT)) {
                Some(i) => current.push(&dirs[i]),
                None => println!("Invalid choice."),
            },
        }
    }
}

fn remember(recent: &mut RecentFolders, folder: &str) {
    if let Err(e) = recent.add(folder) {
        warn!("Could not save recent folder {}: {}", folder, e);
    }
}

/// Folder picker over the content folder: recent folders, multi-select
/// browse, all of content, or a custom path. Every chosen folder is
/// recorded in `recent`. `None` means cancelled.
pub async fn pick_folders(
    prompter: &dyn UserPrompter,
    content_dir: &Path,
    recent: &mut RecentFolders,
) -> Result<Option<Vec<String>>> {
    loop {
        println!("\n{RULE}\nSELECT FOLDERS TO SCAN\n{RULE}");

        let recent_folders = recent.sorted();
        if !recent_folders.is_empty() {
            println!("Recent Folders:");
            print!("{}", format_recent_folders(&recent_folders, RECENT_LIMIT));
            println!();
        }

        println!("Options:");
        println!("  [b] Browse content subfolders");
        println!("  [r] Use recent folder");
        println!("  [a] Scan all of content");
        println!("  [c] Custom path");
        println!("  [q] Cancel");

        let choice = prompter
            .prompt_text("\nEnter choice: ")
            .await?
            .to_lowercase();
        match choice.as_str() {
            "b" => return toggle_subfolders(prompter, content_dir, recent).await,
            "r" if recent_folders.is_empty() => println!("No recent folders found."),
            "r" => {
                let count = recent_folders.len().min(RECENT_LIMIT);
                let input = prompter.prompt_text("\nEnter number: ").await?;
                return match parse_index(&input, count) {
                    Some(i) => {
                        let folder = recent_folders[i].path.clone();
                        remember(recent, &folder);
                        Ok(Some(vec![folder]))
                    }
                    None => {
                        println!("Invalid selection.");
                        Ok(None)
                    }
                };
            }
            "a" => {
                let folder = content_dir.to_string_lossy().into_owned();
                remember(recent, &folder);
                return Ok(Some(vec![folder]));
            }
            "c" => {
                return match custom_path(prompter, content_dir, "content folder").await? {
                    Some(path) => {
                        let folder = path.to_string_lossy().into_owned();
                        remember(recent, &folder);
                        Ok(Some(vec![folder]))
                    }
                    None => Ok(None),
                };
            }
            "q" | "" => return Ok(None),
            _ => println!("Invalid choice."),
        }
    }
}

async fn toggle_subfolders(
    prompter: &dyn UserPrompter,
    content_dir: &Path,
    recent: &mut RecentFolders,
) -> Result<Option<Vec<String>>> {
    let folders = match list_subdirectories(content_dir) {
        Ok(folders) if !folders.is_empty() => folders,
        Ok(_) => {
            println!("No subfolders found in {}.", content_dir.display());
            return Ok(None);
        }
        Err(e) => {
            println!("Error reading {}: {e}", content_dir.display());
            return Ok(None);
        }
    };

    let mut selected: BTreeSet<usize> = BTreeSet::new();
    loop {
        println!("\n{RULE}\nSELECT FOLDERS (multi-select)\n{RULE}");
        for (i, folder) in folders.iter().enumerate() {
            let mark = if selected.contains(&i) { "[x]" } else { "[ ]" };
            println!("  {}. {} {}", i + 1, mark, folder);
        }
        println!("\nSelected: {} folder(s)", selected.len());
        println!("Commands: [number] toggle, [a] all, [n] none, [done] confirm, [cancel] back");

        let input = prompter
            .prompt_text("\nEnter command: ")
            .await?
            .to_lowercase();
        match input.as_str() {
            "done" if selected.is_empty() => println!("No folders selected!"),
            "done" => {
                let paths: Vec<String> = selected
                    .iter()
                    .map(|&i| content_dir.join(&folders[i]).to_string_lossy().into_owned())
                    .collect();
                for path in &paths {
                    remember(recent, path);
                }
                return Ok(Some(paths));
            }
            "cancel" | "" => return Ok(None),
            "a" => selected.extend(0..folders.len()),
            "n" => selected.clear(),
            other => {
                if let Some(i) = parse_index(other, folders.len()) {
                    if !selected.remove(&i) {
                        selected.insert(i);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::prompt::ScriptedPrompter;
    use crate::storage::recent::RECENT_FOLDERS_FILE;
    use tempfile::TempDir;

    fn content_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        for name in ["Maps", "Characters", ".git", "node_modules", "bin", "obj", "Audio"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("readme.txt"), "x").unwrap();
        dir
    }

    #[test]
    fn test_list_subdirectories_skips_hidden_and_build_dirs() {
        let dir = content_tree();
        assert_eq!(
            list_subdirectories(dir.path()).unwrap(),
            vec!["Audio", "Characters", "Maps"]
        );
    }

    #[test]
    fn test_parse_categories() {
        assert_eq!(
            parse_categories("1,2"),
            Some(Categories {
                opened_with_changes: true,
                opened_without_changes: true,
                not_opened: false,
            })
        );
        assert!(parse_categories("1, 2, 3").unwrap().not_opened);
        assert_eq!(parse_categories(""), None);
        assert_eq!(parse_categories("1,4"), None);
    }

    #[test]
    fn test_location_specs() {
        let root = Path::new("/ws");
        assert_eq!(Location::Workspace.scope_spec(), None);
        assert_eq!(Location::Workspace.folders(root), vec!["/ws"]);

        let dir = Location::Dir(PathBuf::from("/ws/Project"));
        assert_eq!(dir.scope_spec().as_deref(), Some("/ws/Project/..."));
        assert_eq!(dir.folders(root), vec!["/ws/Project"]);
    }

    #[tokio::test]
    async fn test_toggle_and_confirm_records_recent() {
        let dir = content_tree();
        let home = TempDir::new().unwrap();
        let mut recent = RecentFolders::load(home.path().join(RECENT_FOLDERS_FILE));
        // Browse, toggle 3 and 1, untoggle 3, toggle 2, done
        let prompter = ScriptedPrompter::new(["b", "3", "1", "3", "2", "done"]);

        let folders = pick_folders(&prompter, dir.path(), &mut recent)
            .await
            .unwrap()
            .unwrap();

        let expected: Vec<String> = ["Audio", "Characters"]
            .iter()
            .map(|n| dir.path().join(n).to_string_lossy().into_owned())
            .collect();
        assert_eq!(folders, expected);
        assert_eq!(recent.entries().len(), 2);
    }

    #[tokio::test]
    async fn test_custom_path_must_exist() {
        let dir = content_tree();
        let home = TempDir::new().unwrap();
        let mut recent = RecentFolders::load(home.path().join(RECENT_FOLDERS_FILE));

        let prompter = ScriptedPrompter::new(["c", "Missing"]);
        let result = pick_folders(&prompter, dir.path(), &mut recent).await.unwrap();
        assert!(result.is_none());
        assert!(recent.entries().is_empty());

        let prompter = ScriptedPrompter::new(["c", "Maps"]);
        let result = pick_folders(&prompter, dir.path(), &mut recent).await.unwrap();
        assert_eq!(
            result,
            Some(vec![dir.path().join("Maps").to_string_lossy().into_owned()])
        );
    }

    #[tokio::test]
    async fn test_recent_folder_pick() {
        let dir = content_tree();
        let home = TempDir::new().unwrap();
        let mut recent = RecentFolders::load(home.path().join(RECENT_FOLDERS_FILE));
        recent.add("/ws/Project/Content/Maps").unwrap();

        let prompter = ScriptedPrompter::new(["r", "1"]);
        let result = pick_folders(&prompter, dir.path(), &mut recent).await.unwrap();
        assert_eq!(result, Some(vec!["/ws/Project/Content/Maps".to_string()]));
        assert_eq!(recent.entries()[0].use_count, 2);
    }

    #[tokio::test]
    async fn test_browse_enters_and_selects() {
        let dir = content_tree();
        fs::create_dir(dir.path().join("Maps").join("Arena")).unwrap();
        let prompter = ScriptedPrompter::new(["3", "1", "s"]);

        let picked = browse_directories(&prompter, dir.path()).await.unwrap();
        assert_eq!(picked, Some(dir.path().join("Maps").join("Arena")));
    }

    #[tokio::test]
    async fn test_browse_does_not_leave_root() {
        let dir = content_tree();
        let prompter = ScriptedPrompter::new(["u", "s"]);

        let picked = browse_directories(&prompter, dir.path()).await.unwrap();
        assert_eq!(picked, Some(dir.path().to_path_buf()));
    }

    #[tokio::test]
    async fn test_pick_location_project() {
        let prompter = ScriptedPrompter::new(["2"]);
        let location = pick_location(
            &prompter,
            "SELECT SCAN SCOPE",
            Path::new("/ws"),
            Path::new("/ws/Project"),
        )
        .await
        .unwrap();
        assert_eq!(location, Some(Location::Dir(PathBuf::from("/ws/Project"))));
    }
}
