//! Line parsers for `p4` text output.
//!
//! Everything here is pure string matching over the loosely structured text
//! `p4` prints; nothing touches a process. The reconcile heuristics are
//! deliberately shallow: a line is recognized by the markers it contains,
//! and the action by a plain substring search.

use std::path::{Path, PathBuf};

use super::types::{ClientInfo, FileAction, ModifiedFile};
use crate::error::{Error, Result};

/// Phrases that mark a reconcile-preview line as a file entry
const RECONCILE_MARKERS: [&str; 3] = [" - opened for ", " - reconcile to ", "- currently opened for"];

/// Stderr fragments `p4` uses when a query simply matched nothing
const NOTHING_MATCHED_MARKERS: [&str; 6] = [
    "not opened",
    "no file(s)",
    "file(s) not on client",
    "no such file",
    "up-to-date",
    "not in client view",
];

/// A file reported by `p4 reconcile -n`, before depot-to-local conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileEntry {
    pub depot_path: String,
    pub action: FileAction,
}

/// Non-empty, trimmed lines of a command's output
pub fn output_lines(output: &str) -> impl Iterator<Item = &str> {
    output.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// One `ModifiedFile` per line of `p4 diff -se` / `p4 diff -sr` output
pub fn parse_diff_output(output: &str, has_changes: bool) -> Vec<ModifiedFile> {
    output_lines(output)
        .map(|line| ModifiedFile::opened(line, has_changes))
        .collect()
}

/// Infer the action from anywhere in the line: `add` wins over `delete`,
/// anything else is an edit. A path such as `add_ons.txt` therefore reads
/// as an add.
pub fn infer_action(line: &str) -> FileAction {
    if line.contains("add") {
        FileAction::Add
    } else if line.contains("delete") {
        FileAction::Delete
    } else {
        FileAction::Edit
    }
}

/// Parse one line of `p4 reconcile -n` output.
///
/// Returns `None` for headers, blank lines, and error text.
pub fn parse_reconcile_line(line: &str) -> Option<ReconcileEntry> {
    let line = line.trim();
    if !line.contains("//") || !RECONCILE_MARKERS.iter().any(|m| line.contains(m)) {
        return None;
    }

    let depot_path = match line.split_once('#') {
        Some((before, _)) => before,
        None => line.split(" - ").next().unwrap_or_default(),
    }
    .trim();

    if depot_path.is_empty() {
        return None;
    }

    Some(ReconcileEntry {
        depot_path: depot_path.to_string(),
        action: infer_action(line),
    })
}

pub fn parse_reconcile_output(output: &str) -> Vec<ReconcileEntry> {
    output_lines(output).filter_map(parse_reconcile_line).collect()
}

/// Depot path of a `p4 opened` line such as
/// `//depot/path/file.txt#1 - edit default change (text)`
pub fn parse_opened_line(line: &str) -> Option<String> {
    let path = line.split('#').next()?.trim();
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

pub fn parse_opened_output(output: &str) -> Vec<String> {
    output_lines(output).filter_map(parse_opened_line).collect()
}

/// Changelist name and depot path of a `p4 opened` line.
///
/// `... - edit change 12345 (text)` belongs to `12345`;
/// `... - edit default change (text)` belongs to `default`.
pub fn parse_changelist_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if !line.contains(" - ") {
        return None;
    }

    let path = line.split('#').next().unwrap_or_default().to_string();
    let change = if line.contains("default change") {
        "default".to_string()
    } else {
        let fields: Vec<&str> = line.split_whitespace().collect();
        fields
            .iter()
            .position(|field| *field == "change")
            .and_then(|i| fields.get(i + 1))
            .map(|s| s.to_string())
            .unwrap_or_else(|| "default".to_string())
    };

    Some((change, path))
}

fn extract_value(line: &str) -> String {
    line.split_once(':')
        .map(|(_, value)| value.trim().to_string())
        .unwrap_or_default()
}

/// Parse `p4 info` output. Fails when no client name is reported, which is
/// how `p4` presents a workspace it cannot resolve.
pub fn parse_client_info(output: &str, current_dir: &Path) -> Result<ClientInfo> {
    let mut info = ClientInfo {
        current_dir: current_dir.to_path_buf(),
        ..Default::default()
    };

    for line in output_lines(output) {
        if line.starts_with("User name:") {
            info.user_name = extract_value(line);
        } else if line.starts_with("Client name:") {
            info.client_name = extract_value(line);
        } else if line.starts_with("Client host:") {
            info.client_host = extract_value(line);
        } else if line.starts_with("Client root:") {
            info.client_root = extract_value(line);
        } else if line.starts_with("Server address:") {
            info.server_address = extract_value(line);
        } else if line.starts_with("Server uptime:") {
            info.server_uptime = Some(extract_value(line)).filter(|v| !v.is_empty());
        }
    }

    if info.client_name.is_empty() {
        return Err(Error::NotConnected(
            "could not determine client name".to_string(),
        ));
    }

    Ok(info)
}

/// Fields of the first mapping line of `p4 where`: depot, client, local.
/// Exclusion mappings (leading `-`) are skipped.
fn where_fields(output: &str) -> Option<Vec<&str>> {
    output_lines(output)
        .find(|line| !line.starts_with('-'))
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .filter(|fields| fields.len() >= 3)
}

/// Local path reported by `p4 where`, normalized
pub fn parse_where_local(output: &str) -> Option<String> {
    let fields = where_fields(output)?;
    let local: PathBuf = Path::new(fields[2]).components().collect();
    Some(local.to_string_lossy().into_owned())
}

/// Depot path reported by `p4 where`
pub fn parse_where_depot(output: &str) -> Option<String> {
    where_fields(output).map(|fields| fields[0].to_string())
}

/// True when stderr only says that the query found nothing
pub fn is_nothing_matched(stderr: &str) -> bool {
    let lowered = stderr.to_lowercase();
    !lowered.trim().is_empty() && NOTHING_MATCHED_MARKERS.iter().any(|m| lowered.contains(m))
}
