use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use super::parser;
use super::types::{ModifiedFile, ScanOptions, ScanResult};
use crate::console::spinner::Spinner;
use crate::error::{Error, Result};
use crate::subprocess::{DiffFilter, P4Runner, ProcessError, ProcessOutput};

/// Decide what text a diff query produced.
///
/// Any stdout is parsed, whatever the exit code. With stdout empty, a
/// non-zero exit is still an empty result when stderr only says nothing
/// matched; otherwise the query failed.
pub fn diff_query_text(output: &ProcessOutput, query: &str) -> Result<String> {
    if !output.stdout.trim().is_empty() || output.status.success() {
        return Ok(output.stdout.clone());
    }

    if parser::is_nothing_matched(&output.stderr) {
        debug!("{} matched nothing: {}", query, output.stderr.trim());
        return Ok(String::new());
    }

    Err(failure(output, query))
}

/// Reconcile preview reports files on either stream, so both are parsed
/// together. A non-zero exit with no file entries is an empty result only
/// when stderr says nothing matched; otherwise the query failed.
pub fn reconcile_query_text(output: &ProcessOutput, query: &str) -> Result<String> {
    let text = output.combined();
    if output.status.success() || !parser::parse_reconcile_output(&text).is_empty() {
        return Ok(text);
    }

    if parser::is_nothing_matched(&output.stderr) {
        debug!("{} matched nothing: {}", query, output.stderr.trim());
        return Ok(String::new());
    }

    Err(failure(output, query))
}

fn failure(output: &ProcessOutput, query: &str) -> Error {
    let stderr = output.stderr.trim();
    let message = if stderr.is_empty() {
        match output.status.code() {
            Some(code) => format!("exit code {code} with no output"),
            None => "terminated with no output".to_string(),
        }
    } else {
        stderr.to_string()
    };
    Error::query_failed(query, message)
}

fn spawn_failure(err: ProcessError, query: &str) -> Error {
    Error::query_failed(query, err.to_string())
}

/// Runs the classification queries and partitions their output into the
/// three buckets of a [`ScanResult`].
pub struct Scanner {
    p4: Arc<dyn P4Runner>,
    spinner: bool,
}

impl Scanner {
    pub fn new(p4: Arc<dyn P4Runner>) -> Self {
        Self { p4, spinner: false }
    }

    /// Show an elapsed-time spinner while each query runs
    pub fn with_spinner(mut self, enabled: bool) -> Self {
        self.spinner = enabled;
        self
    }

    pub async fn scan(&self, options: &ScanOptions) -> Result<ScanResult> {
        let start = Instant::now();

        let opened_with_changes = if options.opened_with_changes {
            info!("Finding opened files with changes...");
            self.opened_files(DiffFilter::Changed, options.scope())
                .await?
        } else {
            Vec::new()
        };

        let opened_without_changes = if options.opened_without_changes {
            info!("Finding opened files without changes (hijacked)...");
            self.opened_files(DiffFilter::Unchanged, options.scope())
                .await?
        } else {
            Vec::new()
        };

        let not_opened_but_modified = if options.not_opened {
            info!("Finding modified files not yet opened...");
            self.unopened_files(&options.folders).await?
        } else {
            Vec::new()
        };

        let result = ScanResult::new(
            opened_with_changes,
            opened_without_changes,
            not_opened_but_modified,
            start.elapsed(),
        );

        debug!(
            "Scan found {} file(s) in {:.1}s",
            result.total,
            result.duration.as_secs_f64()
        );

        Ok(result)
    }

    /// Files opened for edit, with or without content changes
    pub async fn opened_files(
        &self,
        filter: DiffFilter,
        scope: Option<&str>,
    ) -> Result<Vec<ModifiedFile>> {
        let query = match scope {
            Some(scope) => format!("p4 diff {} {}", filter.flag(), scope),
            None => format!("p4 diff {}", filter.flag()),
        };
        debug!("Executing: {}", query);

        let spinner = Spinner::start(self.spinner, "Scanning...");
        let output = self.p4.diff_summary(filter, scope).await;
        spinner.finish();

        let output = output.map_err(|e| spawn_failure(e, &query))?;
        let text = diff_query_text(&output, &query)?;

        Ok(parser::parse_diff_output(
            &text,
            filter == DiffFilter::Changed,
        ))
    }

    /// Files modified on disk but not opened, per reconcile preview.
    /// An empty folder list previews the current directory.
    pub async fn unopened_files(&self, folders: &[String]) -> Result<Vec<ModifiedFile>> {
        let current = [".".to_string()];
        let folders = if folders.is_empty() { &current[..] } else { folders };

        let mut files = Vec::new();
        for folder in folders {
            files.extend(self.scan_folder(folder).await?);
        }
        Ok(files)
    }

    async fn scan_folder(&self, folder: &str) -> Result<Vec<ModifiedFile>> {
        let query = format!(
            "p4 reconcile -n {}",
            crate::subprocess::p4::recursive_spec(folder)
        );
        debug!("Executing: {}", query);

        let spinner = Spinner::start(self.spinner, "Scanning...");
        let output = self.p4.reconcile_preview(folder).await;
        spinner.finish();

        let output = output.map_err(|e| spawn_failure(e, &query))?;
        let text = reconcile_query_text(&output, &query)?;

        let mut files = Vec::new();
        for entry in parser::parse_reconcile_output(&text) {
            let path = self.local_path(&entry.depot_path).await;
            files.push(ModifiedFile::unopened(path, entry.action));
        }
        Ok(files)
    }

    /// Best-effort depot-to-local conversion; falls back to the input
    pub async fn local_path(&self, depot_path: &str) -> String {
        match self.p4.where_path(depot_path).await {
            Ok(output) if output.status.success() => parser::parse_where_local(&output.stdout)
                .unwrap_or_else(|| depot_path.to_string()),
            Ok(output) => {
                debug!(
                    "p4 where {} failed: {}",
                    depot_path,
                    output.stderr.trim()
                );
                depot_path.to_string()
            }
            Err(e) => {
                debug!("p4 where {} could not run: {}", depot_path, e);
                depot_path.to_string()
            }
        }
    }
}
