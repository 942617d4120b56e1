use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use super::builder::ProcessCommandBuilder;
use super::error::ProcessError;
use super::runner::{ProcessOutput, ProcessRunner};

/// Which side of `p4 diff -s` to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffFilter {
    /// Opened files whose content differs from the have revision (`-se`)
    Changed,
    /// Opened files identical to the have revision (`-sr`)
    Unchanged,
}

impl DiffFilter {
    pub fn flag(self) -> &'static str {
        match self {
            DiffFilter::Changed => "-se",
            DiffFilter::Unchanged => "-sr",
        }
    }
}

/// Typed entry points for the `p4` subcommands the tool relies on.
///
/// Every method returns the raw [`ProcessOutput`]: `p4` reports "nothing
/// found" through non-zero exits and stderr text, so deciding what counts as
/// a failure is left to the caller.
#[async_trait]
pub trait P4Runner: Send + Sync {
    async fn info(&self) -> Result<ProcessOutput, ProcessError>;
    async fn opened(&self) -> Result<ProcessOutput, ProcessError>;
    async fn diff_summary(
        &self,
        filter: DiffFilter,
        scope: Option<&str>,
    ) -> Result<ProcessOutput, ProcessError>;
    async fn reconcile_preview(&self, folder: &str) -> Result<ProcessOutput, ProcessError>;
    async fn reconcile(&self, folder: &str) -> Result<ProcessOutput, ProcessError>;
    async fn edit(&self, path: &str) -> Result<ProcessOutput, ProcessError>;
    async fn sync_force(&self, path: &str) -> Result<ProcessOutput, ProcessError>;
    async fn where_path(&self, path: &str) -> Result<ProcessOutput, ProcessError>;
    async fn revert_unchanged(&self) -> Result<ProcessOutput, ProcessError>;
}

pub struct P4RunnerImpl {
    runner: Arc<dyn ProcessRunner>,
    program: String,
}

/// Turn a folder into a recursive depot-syntax file spec (`folder/...`).
/// Specs that already end in `...` are returned unchanged.
pub fn recursive_spec(folder: &str) -> String {
    if folder.ends_with("...") {
        return folder.to_string();
    }
    Path::new(folder).join("...").to_string_lossy().into_owned()
}

impl P4RunnerImpl {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self::with_program(runner, "p4")
    }

    pub fn with_program(runner: Arc<dyn ProcessRunner>, program: &str) -> Self {
        Self {
            runner,
            program: program.to_string(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<ProcessOutput, ProcessError> {
        self.runner
            .run(ProcessCommandBuilder::new(&self.program).args(args).build())
            .await
    }

    /// Reconcile runs from inside the folder when it exists locally, so
    /// relative client mappings resolve the same way they do in a shell.
    async fn run_in_folder(
        &self,
        args: &[&str],
        folder: &str,
    ) -> Result<ProcessOutput, ProcessError> {
        let mut builder = ProcessCommandBuilder::new(&self.program).args(args);
        let dir = Path::new(folder);
        if dir.is_dir() {
            builder = builder.current_dir(dir);
        }
        self.runner.run(builder.build()).await
    }
}

#[async_trait]
impl P4Runner for P4RunnerImpl {
    async fn info(&self) -> Result<ProcessOutput, ProcessError> {
        self.run(&["info"]).await
    }

    async fn opened(&self) -> Result<ProcessOutput, ProcessError> {
        self.run(&["opened"]).await
    }

    async fn diff_summary(
        &self,
        filter: DiffFilter,
        scope: Option<&str>,
    ) -> Result<ProcessOutput, ProcessError> {
        let scope = scope.filter(|s| !s.trim().is_empty());
        self.runner
            .run(
                ProcessCommandBuilder::new(&self.program)
                    .args(["diff", filter.flag()])
                    .arg_opt(scope)
                    .build(),
            )
            .await
    }

    async fn reconcile_preview(&self, folder: &str) -> Result<ProcessOutput, ProcessError> {
        let spec = recursive_spec(folder);
        self.run_in_folder(&["reconcile", "-n", &spec], folder).await
    }

    async fn reconcile(&self, folder: &str) -> Result<ProcessOutput, ProcessError> {
        let spec = recursive_spec(folder);
        self.run_in_folder(&["reconcile", &spec], folder).await
    }

    async fn edit(&self, path: &str) -> Result<ProcessOutput, ProcessError> {
        self.run(&["edit", path]).await
    }

    async fn sync_force(&self, path: &str) -> Result<ProcessOutput, ProcessError> {
        self.run(&["sync", "-f", path]).await
    }

    async fn where_path(&self, path: &str) -> Result<ProcessOutput, ProcessError> {
        self.run(&["where", path]).await
    }

    async fn revert_unchanged(&self) -> Result<ProcessOutput, ProcessError> {
        self.run(&["revert", "-a"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subprocess::MockProcessRunner;

    fn p4_with(mock: &MockProcessRunner) -> P4RunnerImpl {
        P4RunnerImpl::new(Arc::new(mock.clone()))
    }

    #[test]
    fn test_recursive_spec() {
        assert_eq!(recursive_spec("/ws/Project"), "/ws/Project/...");
        assert_eq!(recursive_spec("/ws/Project/..."), "/ws/Project/...");
    }

    #[tokio::test]
    async fn test_diff_summary_without_scope() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("p4")
            .with_args(|args| args == ["diff", "-se"])
            .returns_stdout("/ws/a.txt\n")
            .finish();

        let output = p4_with(&mock)
            .diff_summary(DiffFilter::Changed, None)
            .await
            .unwrap();
        assert_eq!(output.stdout, "/ws/a.txt\n");
    }

    #[tokio::test]
    async fn test_diff_summary_blank_scope_is_dropped() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("p4")
            .with_args(|args| args == ["diff", "-sr"])
            .finish();

        p4_with(&mock)
            .diff_summary(DiffFilter::Unchanged, Some("  "))
            .await
            .unwrap();
        assert!(mock.verify_called("p4", 1));
    }

    #[tokio::test]
    async fn test_reconcile_preview_uses_recursive_spec() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("p4")
            .with_args(|args| args == ["reconcile", "-n", "/nonexistent/ws/..."])
            .finish();

        p4_with(&mock)
            .reconcile_preview("/nonexistent/ws")
            .await
            .unwrap();

        let history = mock.get_call_history();
        assert_eq!(history.len(), 1);
        assert!(history[0].working_dir.is_none());
    }

    #[tokio::test]
    async fn test_custom_program_name() {
        let mut mock = MockProcessRunner::new();
        mock.expect_command("/opt/p4/bin/p4")
            .with_args(|args| args == ["sync", "-f", "/ws/a.txt"])
            .finish();

        let p4 = P4RunnerImpl::with_program(Arc::new(mock.clone()), "/opt/p4/bin/p4");
        p4.sync_force("/ws/a.txt").await.unwrap();
        assert!(mock.verify_called("/opt/p4/bin/p4", 1));
    }
}
