//! Selection expressions over a 1-based numbered list.
//!
//! `all` picks everything, an empty answer or `cancel` backs out, and
//! anything else is a comma-separated list of `n` and `a-b` tokens.
//! Tokens that do not resolve to items are dropped without complaint;
//! overlapping tokens keep their duplicates.

use crate::classify::{FileAction, ModifiedFile};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Cancelled,
    /// Zero-based indices into the numbered list, in input order
    Items(Vec<usize>),
}

impl Selection {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Selection::Cancelled)
    }

    /// Resolve the selection against the list it was parsed for
    pub fn pick<'a, T>(&self, items: &'a [T]) -> Vec<&'a T> {
        match self {
            Selection::Cancelled => Vec::new(),
            Selection::Items(indices) => indices.iter().filter_map(|&i| items.get(i)).collect(),
        }
    }
}

pub fn parse_selection(input: &str, count: usize) -> Selection {
    let input = input.trim().to_lowercase();

    match input.as_str() {
        "" | "cancel" => return Selection::Cancelled,
        "all" => return Selection::Items((0..count).collect()),
        _ => {}
    }

    let mut indices = Vec::new();
    for token in input.split(',').map(str::trim) {
        if let Some((start, end)) = token.split_once('-') {
            let (Ok(start), Ok(end)) = (start.trim().parse::<usize>(), end.trim().parse::<usize>())
            else {
                continue;
            };
            if start >= 1 && start <= end && end <= count {
                indices.extend(start - 1..end);
            }
        } else if let Ok(n) = token.parse::<usize>() {
            if n >= 1 && n <= count {
                indices.push(n - 1);
            }
        }
    }

    Selection::Items(indices)
}

/// Narrowing applied to the candidate list before numbering it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionFilter {
    #[default]
    All,
    Edits,
    Adds,
    Deletes,
}

impl ActionFilter {
    /// Menu answer to filter: `1` edits, `2` adds, `3` deletes, anything
    /// else keeps every file
    pub fn from_choice(choice: &str) -> Self {
        match choice.trim() {
            "1" => ActionFilter::Edits,
            "2" => ActionFilter::Adds,
            "3" => ActionFilter::Deletes,
            _ => ActionFilter::All,
        }
    }

    pub fn matches(self, action: FileAction) -> bool {
        match self {
            ActionFilter::All => true,
            ActionFilter::Edits => action == FileAction::Edit,
            ActionFilter::Adds => action == FileAction::Add,
            ActionFilter::Deletes => action == FileAction::Delete,
        }
    }

    pub fn apply(self, files: &[ModifiedFile]) -> Vec<ModifiedFile> {
        files
            .iter()
            .filter(|file| self.matches(file.action))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_selects_everything_in_order() {
        assert_eq!(parse_selection("all", 5), Selection::Items(vec![0, 1, 2, 3, 4]));
        assert_eq!(parse_selection("  ALL ", 2), Selection::Items(vec![0, 1]));
    }

    #[test]
    fn test_comma_list() {
        assert_eq!(parse_selection("2,4", 5), Selection::Items(vec![1, 3]));
    }

    #[test]
    fn test_range() {
        assert_eq!(parse_selection("2-4", 5), Selection::Items(vec![1, 2, 3]));
    }

    #[test]
    fn test_out_of_range_tokens_are_skipped() {
        assert_eq!(parse_selection("0,6", 5), Selection::Items(vec![]));
        assert_eq!(parse_selection("4-6,1", 5), Selection::Items(vec![0]));
        assert_eq!(parse_selection("3-2", 5), Selection::Items(vec![]));
    }

    #[test]
    fn test_empty_and_cancel() {
        assert_eq!(parse_selection("", 5), Selection::Cancelled);
        assert_eq!(parse_selection("   ", 5), Selection::Cancelled);
        assert_eq!(parse_selection("Cancel", 5), Selection::Cancelled);
    }

    #[test]
    fn test_garbage_tokens_are_ignored() {
        assert_eq!(parse_selection("x, 2, -, a-b", 3), Selection::Items(vec![1]));
    }

    #[test]
    fn test_overlaps_keep_duplicates() {
        assert_eq!(parse_selection("1-2,2", 3), Selection::Items(vec![0, 1, 1]));
    }

    #[test]
    fn test_pick() {
        let items = ["a", "b", "c"];
        let picked = parse_selection("3,1", 3).pick(&items);
        assert_eq!(picked, vec![&"c", &"a"]);
        assert!(Selection::Cancelled.pick(&items).is_empty());
    }

    #[test]
    fn test_action_filter() {
        let files = vec![
            ModifiedFile::unopened("/ws/a", FileAction::Edit),
            ModifiedFile::unopened("/ws/b", FileAction::Add),
            ModifiedFile::unopened("/ws/c", FileAction::Delete),
        ];
        assert_eq!(ActionFilter::from_choice("2").apply(&files)[0].path, "/ws/b");
        assert_eq!(ActionFilter::Deletes.apply(&files).len(), 1);
        assert_eq!(ActionFilter::from_choice("").apply(&files).len(), 3);
    }
}
