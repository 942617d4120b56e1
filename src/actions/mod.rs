//! Actions applied to selected files and folders.
//!
//! Every target is an independent `p4` call. A failing target is recorded
//! in the [`ActionReport`] and the loop moves on; nothing is rolled back.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::classify::hijacked;
use crate::console::prompt::UserPrompter;
use crate::error::Result;
use crate::subprocess::{P4Runner, ProcessError, ProcessOutput};

/// Number of paths listed before a force sync asks for confirmation
pub const CONFIRM_PREVIEW_LIMIT: usize = 10;

/// The exact answer that authorizes a force sync
pub const FORCE_SYNC_CONFIRMATION: &str = "YES";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Checkout,
    Reconcile,
    ForceSync,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Checkout => "Checkout",
            ActionKind::Reconcile => "Reconcile",
            ActionKind::ForceSync => "Force sync",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded { output: String },
    Failed { error: String, output: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetOutcome {
    pub target: String,
    pub outcome: Outcome,
}

impl TargetOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Succeeded { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    pub kind: ActionKind,
    pub outcomes: Vec<TargetOutcome>,
}

impl ActionReport {
    fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            outcomes: Vec::new(),
        }
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// What a reconcile's output says happened
pub fn reconcile_summary(output: &str) -> Option<&'static str> {
    if output.contains("opened for") {
        Some("Files have been opened for change")
    } else if output.contains("no file(s) to reconcile") {
        Some("No changes to reconcile")
    } else {
        None
    }
}

/// Prompt shown before a force sync: the first few paths, a count of the
/// rest, and the confirmation instruction
pub fn force_sync_prompt(paths: &[String]) -> String {
    let mut message = format!(
        "WARNING: This will discard local changes to {} file(s):\n",
        paths.len()
    );
    for path in paths.iter().take(CONFIRM_PREVIEW_LIMIT) {
        message.push_str(&format!("  {path}\n"));
    }
    if paths.len() > CONFIRM_PREVIEW_LIMIT {
        message.push_str(&format!(
            "  ... and {} more\n",
            paths.len() - CONFIRM_PREVIEW_LIMIT
        ));
    }
    message.push_str(&format!(
        "Type '{FORCE_SYNC_CONFIRMATION}' to confirm: "
    ));
    message
}

fn command_outcome(
    target: &str,
    result: std::result::Result<ProcessOutput, ProcessError>,
) -> TargetOutcome {
    let outcome = match result {
        Ok(output) if output.status.success() => Outcome::Succeeded {
            output: output.combined().trim().to_string(),
        },
        Ok(output) => {
            let error = match output.status.code() {
                Some(code) => format!("exit code {code}"),
                None => "terminated by signal".to_string(),
            };
            Outcome::Failed {
                error,
                output: output.combined().trim().to_string(),
            }
        }
        Err(e) => Outcome::Failed {
            error: e.to_string(),
            output: String::new(),
        },
    };

    if let Outcome::Failed { error, .. } = &outcome {
        warn!("{}: {}", target, error);
    }

    TargetOutcome {
        target: target.to_string(),
        outcome,
    }
}

/// Reconcile reports "nothing to do" through a non-zero exit, so only a
/// failure with no output at all counts against the folder
fn reconcile_outcome(
    folder: &str,
    result: std::result::Result<ProcessOutput, ProcessError>,
) -> TargetOutcome {
    match result {
        Ok(output) if output.has_output() => TargetOutcome {
            target: folder.to_string(),
            outcome: Outcome::Succeeded {
                output: output.combined().trim().to_string(),
            },
        },
        other => command_outcome(folder, other),
    }
}

pub struct ActionExecutor {
    p4: Arc<dyn P4Runner>,
}

impl ActionExecutor {
    pub fn new(p4: Arc<dyn P4Runner>) -> Self {
        Self { p4 }
    }

    /// `p4 edit` each path
    pub async fn checkout(&self, paths: &[String]) -> ActionReport {
        let mut report = ActionReport::new(ActionKind::Checkout);
        for path in paths {
            debug!("Checking out {}", path);
            let result = self.p4.edit(path).await;
            report.outcomes.push(command_outcome(path, result));
        }
        info!(
            "Checked out {} of {} file(s)",
            report.succeeded(),
            paths.len()
        );
        report
    }

    /// `p4 reconcile <folder>/...` for each folder
    pub async fn reconcile(&self, folders: &[String]) -> ActionReport {
        let mut report = ActionReport::new(ActionKind::Reconcile);
        for folder in folders {
            debug!("Reconciling {}", folder);
            let result = self.p4.reconcile(folder).await;
            report.outcomes.push(reconcile_outcome(folder, result));
        }
        report
    }

    /// Combined output of `p4 reconcile -n` for one folder, or `None` when
    /// it printed nothing
    pub async fn preview_reconcile(&self, folder: &str) -> Result<Option<String>> {
        let output = self.p4.reconcile_preview(folder).await?;
        let text = output.combined().trim().to_string();
        Ok(if text.is_empty() { None } else { Some(text) })
    }

    /// `p4 sync -f` each path once the operator types exactly `YES`.
    /// Returns `None` when the sync was not confirmed; no command runs then.
    pub async fn force_sync(
        &self,
        paths: &[String],
        prompter: &dyn UserPrompter,
    ) -> Result<Option<ActionReport>> {
        if paths.is_empty() {
            return Ok(None);
        }

        let answer = prompter.prompt_text(&force_sync_prompt(paths)).await?;
        if answer != FORCE_SYNC_CONFIRMATION {
            info!("Force sync cancelled");
            return Ok(None);
        }

        let mut report = ActionReport::new(ActionKind::ForceSync);
        for path in paths {
            debug!("Force syncing {}", path);
            let result = self.p4.sync_force(path).await;
            report.outcomes.push(command_outcome(path, result));
        }
        Ok(Some(report))
    }

    /// Ask once, then `p4 revert -a`. Returns the tool's output, or `None`
    /// when there was nothing to revert or the operator declined.
    pub async fn revert_unchanged(
        &self,
        hijacked_files: &[String],
        prompter: &dyn UserPrompter,
    ) -> Result<Option<String>> {
        if hijacked_files.is_empty() {
            return Ok(None);
        }
        if !prompter.prompt_yes_no("Proceed?").await? {
            return Ok(None);
        }
        hijacked::revert_unchanged(self.p4.as_ref()).await.map(Some)
    }
}
