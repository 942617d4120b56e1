//! Opened files that carry no content change.
//!
//! `p4 opened` lists depot paths while `p4 diff -sr` lists local ones, so the
//! unchanged side is mapped back to depot syntax with `p4 where` before the
//! two are compared.

use std::collections::HashSet;
use tracing::debug;

use super::parser;
use super::scanner::diff_query_text;
use crate::error::{Error, Result};
use crate::subprocess::{DiffFilter, P4Runner};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HijackedReport {
    /// Opened files with content changes, in `p4 opened` order
    pub real_changes: Vec<String>,
    /// Opened files identical to their have revision
    pub hijacked: Vec<String>,
}

impl HijackedReport {
    pub fn total(&self) -> usize {
        self.real_changes.len() + self.hijacked.len()
    }

    pub fn hijacked_percent(&self) -> f64 {
        percent(self.hijacked.len(), self.total())
    }

    pub fn real_percent(&self) -> f64 {
        percent(self.real_changes.len(), self.total())
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

/// Depot paths of every opened file. The query exits non-zero with nothing
/// on stdout when no files are opened, which reads as an empty list.
pub async fn opened_files(p4: &dyn P4Runner) -> Result<Vec<String>> {
    let output = p4
        .opened()
        .await
        .map_err(|e| Error::query_failed("p4 opened", e.to_string()))?;

    if !output.status.success() && output.stdout.trim().is_empty() {
        debug!("p4 opened reported nothing: {}", output.stderr.trim());
        return Ok(Vec::new());
    }

    Ok(parser::parse_opened_output(&output.stdout))
}

/// Local paths of opened files with no content change (`p4 diff -sr`)
pub async fn unchanged_files(p4: &dyn P4Runner) -> Result<Vec<String>> {
    let query = "p4 diff -sr";
    let output = p4
        .diff_summary(DiffFilter::Unchanged, None)
        .await
        .map_err(|e| Error::query_failed(query, e.to_string()))?;
    let text = diff_query_text(&output, query)?;
    Ok(parser::output_lines(&text).map(str::to_string).collect())
}

async fn depot_path(p4: &dyn P4Runner, local: &str) -> String {
    match p4.where_path(local).await {
        Ok(output) if output.status.success() => {
            parser::parse_where_depot(&output.stdout).unwrap_or_else(|| local.to_string())
        }
        _ => local.to_string(),
    }
}

/// Split the opened files into real changes and hijacked files
pub async fn hijacked_status(p4: &dyn P4Runner) -> Result<HijackedReport> {
    let opened = opened_files(p4).await?;
    let unchanged = unchanged_files(p4).await?;

    let mut unchanged_depot = HashSet::with_capacity(unchanged.len());
    for local in &unchanged {
        unchanged_depot.insert(depot_path(p4, local).await);
    }

    let (hijacked, real_changes): (Vec<String>, Vec<String>) = opened
        .into_iter()
        .partition(|path| unchanged_depot.contains(path));

    Ok(HijackedReport {
        real_changes,
        hijacked,
    })
}

/// Run `p4 revert -a` and return its trimmed output
pub async fn revert_unchanged(p4: &dyn P4Runner) -> Result<String> {
    let query = "p4 revert -a";
    let output = p4
        .revert_unchanged()
        .await
        .map_err(|e| Error::query_failed(query, e.to_string()))?;

    if !output.status.success() && !output.has_output() {
        return Err(Error::query_failed(query, "no output"));
    }

    Ok(output.combined().trim().to_string())
}
