use tracing::warn;

use super::parser;
use crate::subprocess::P4Runner;

pub const DEFAULT_CHANGELIST: &str = "default";

/// A pending changelist and the depot paths opened in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Changelist {
    pub name: String,
    pub files: Vec<String>,
}

impl Changelist {
    pub fn is_default(&self) -> bool {
        self.name == DEFAULT_CHANGELIST
    }
}

/// Group `p4 opened` output by changelist. Groups keep first-seen order,
/// except that the default changelist always comes first.
pub fn group_opened(output: &str) -> Vec<Changelist> {
    let mut groups: Vec<Changelist> = Vec::new();

    for (name, path) in parser::output_lines(output).filter_map(parser::parse_changelist_line) {
        match groups.iter_mut().find(|group| group.name == name) {
            Some(group) => group.files.push(path),
            None => groups.push(Changelist {
                name,
                files: vec![path],
            }),
        }
    }

    if let Some(pos) = groups.iter().position(Changelist::is_default) {
        let default = groups.remove(pos);
        groups.insert(0, default);
    }

    groups
}

/// Pending changelists of the current client. A failed query yields no
/// groups.
pub async fn list_changelists(p4: &dyn P4Runner) -> Vec<Changelist> {
    match p4.opened().await {
        Ok(output) if output.status.success() => group_opened(&output.stdout),
        Ok(output) => {
            warn!("p4 opened failed: {}", output.stderr.trim());
            Vec::new()
        }
        Err(e) => {
            warn!("p4 opened could not run: {}", e);
            Vec::new()
        }
    }
}
