//! The interactive main loop

use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

use super::display::{
    format_action_report, format_baseline, format_capped, format_changelists,
    format_hijacked_report, format_numbered, format_scan_result, RULE,
};
use super::picker::{self, Location};
use super::prompt::UserPrompter;
use crate::actions::ActionExecutor;
use crate::classify::{self, hijacked, ClientInfo, ModifiedFile, ScanOptions, ScanResult, Scanner};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::selection::{parse_selection, ActionFilter, Selection};
use crate::storage::{BaselineStore, RecentFolders};
use crate::subprocess::P4Runner;

/// Hijacked files listed before `p4 revert -a` asks for confirmation
const REVERT_PREVIEW_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ViewChangelists,
    ScanAndTriage,
    ScanFolders,
    ReconcileProject,
    PreviewReconcile,
    HijackedStatus,
    RevertUnchanged,
    CaptureBaseline,
    ShowBaseline,
    ClearBaseline,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 11] = [
        MenuChoice::ViewChangelists,
        MenuChoice::ScanAndTriage,
        MenuChoice::ScanFolders,
        MenuChoice::ReconcileProject,
        MenuChoice::PreviewReconcile,
        MenuChoice::HijackedStatus,
        MenuChoice::RevertUnchanged,
        MenuChoice::CaptureBaseline,
        MenuChoice::ShowBaseline,
        MenuChoice::ClearBaseline,
        MenuChoice::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuChoice::ViewChangelists => "View pending changelists",
            MenuChoice::ScanAndTriage => "Scan & triage (choose scope, force sync files)",
            MenuChoice::ScanFolders => "Scan folders for modified files not opened",
            MenuChoice::ReconcileProject => "Reconcile all files in project folder",
            MenuChoice::PreviewReconcile => "Preview reconcile of content folder",
            MenuChoice::HijackedStatus => "Show hijacked files (opened with no changes)",
            MenuChoice::RevertUnchanged => "Revert unchanged files",
            MenuChoice::CaptureBaseline => "Capture baseline of opened files",
            MenuChoice::ShowBaseline => "Show baseline",
            MenuChoice::ClearBaseline => "Clear baseline",
            MenuChoice::Exit => "Exit",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        let n: usize = input.trim().parse().ok()?;
        Self::ALL.get(n.checked_sub(1)?).copied()
    }
}

pub fn format_menu() -> String {
    let mut out = format!("\n{RULE}\nMAIN MENU\n{RULE}\n");
    for (i, choice) in MenuChoice::ALL.iter().enumerate() {
        out.push_str(&format!("  {:>2}. {}\n", i + 1, choice.label()));
    }
    out
}

fn is_end_of_input(err: &Error) -> bool {
    matches!(err, Error::Io(e) if e.kind() == ErrorKind::UnexpectedEof)
}

/// One operator session against a connected client
pub struct Session {
    p4: Arc<dyn P4Runner>,
    prompter: Arc<dyn UserPrompter>,
    settings: Settings,
    client: ClientInfo,
    recent: RecentFolders,
    baseline: BaselineStore,
    spinner: bool,
}

impl Session {
    pub fn new(
        p4: Arc<dyn P4Runner>,
        prompter: Arc<dyn UserPrompter>,
        settings: Settings,
        client: ClientInfo,
        recent: RecentFolders,
        baseline: BaselineStore,
    ) -> Self {
        Self {
            p4,
            prompter,
            settings,
            client,
            recent,
            baseline,
            spinner: false,
        }
    }

    pub fn with_spinner(mut self, enabled: bool) -> Self {
        self.spinner = enabled && self.settings.spinner;
        self
    }

    fn client_root(&self) -> PathBuf {
        PathBuf::from(&self.client.client_root)
    }

    fn executor(&self) -> ActionExecutor {
        ActionExecutor::new(Arc::clone(&self.p4))
    }

    /// Loop until the operator exits or input ends
    pub async fn run(&mut self) -> Result<()> {
        loop {
            print!("{}", format_menu());
            let answer = match self
                .prompter
                .prompt_text(&format!("\nEnter choice (1-{}): ", MenuChoice::ALL.len()))
                .await
            {
                Ok(answer) => answer,
                Err(e) if is_end_of_input(&e) => return Ok(()),
                Err(e) => return Err(e),
            };

            let Some(choice) = MenuChoice::parse(&answer) else {
                println!("Invalid choice.");
                continue;
            };
            if choice == MenuChoice::Exit {
                println!("Exiting.");
                return Ok(());
            }

            match self.dispatch(choice).await {
                Ok(()) => {}
                Err(e) if is_end_of_input(&e) => return Ok(()),
                Err(e) => {
                    warn!("{:?} failed: {}", choice, e);
                    println!("Error: {e}");
                }
            }
        }
    }

    pub async fn dispatch(&mut self, choice: MenuChoice) -> Result<()> {
        debug!("Menu choice: {:?}", choice);
        match choice {
            MenuChoice::ViewChangelists => self.view_changelists().await,
            MenuChoice::ScanAndTriage => self.scan_and_triage().await,
            MenuChoice::ScanFolders => self.scan_folders().await,
            MenuChoice::ReconcileProject => self.reconcile_project().await,
            MenuChoice::PreviewReconcile => self.preview_reconcile().await,
            MenuChoice::HijackedStatus => self.hijacked_status().await,
            MenuChoice::RevertUnchanged => self.revert_unchanged().await,
            MenuChoice::CaptureBaseline => self.capture_baseline().await,
            MenuChoice::ShowBaseline => {
                self.show_baseline();
                Ok(())
            }
            MenuChoice::ClearBaseline => self.clear_baseline(),
            MenuChoice::Exit => Ok(()),
        }
    }

    async fn view_changelists(&self) -> Result<()> {
        let groups = classify::list_changelists(self.p4.as_ref()).await;
        print!("{}", format_changelists(&groups));
        Ok(())
    }

    async fn scan(&self, options: &ScanOptions) -> Result<ScanResult> {
        let result = Scanner::new(Arc::clone(&self.p4))
            .with_spinner(self.spinner)
            .scan(options)
            .await?;
        print!("{}", format_scan_result(&result, self.settings.display_limit));
        Ok(result)
    }

    /// Number `files`, read a selection, and resolve it. Prints why nothing
    /// was picked when that happens.
    async fn select(&self, files: &[ModifiedFile], title: &str) -> Result<Vec<ModifiedFile>> {
        println!("\n{title}");
        print!("{}", format_numbered(files));
        println!("\nEnter selection: single (1), list (1,3,5), range (1-5), all, or cancel");

        let input = self.prompter.prompt_text("Your choice: ").await?;
        let selection = parse_selection(&input, files.len());
        if selection == Selection::Cancelled {
            println!("Cancelled.");
            return Ok(Vec::new());
        }

        let picked: Vec<ModifiedFile> = selection.pick(files).into_iter().cloned().collect();
        if picked.is_empty() {
            println!("No valid files selected.");
        }
        Ok(picked)
    }

    async fn force_sync(&self, files: &[ModifiedFile]) -> Result<()> {
        let paths: Vec<String> = files.iter().map(|f| f.path.clone()).collect();
        match self
            .executor()
            .force_sync(&paths, self.prompter.as_ref())
            .await?
        {
            Some(report) => println!("{}", format_action_report(&report)),
            None => println!("Cancelled."),
        }
        Ok(())
    }

    async fn scan_and_triage(&mut self) -> Result<()> {
        let root = self.client_root();
        let project = self.settings.project_path(&root);

        let Some(scope) = picker::pick_location(
            self.prompter.as_ref(),
            "SELECT SCAN SCOPE",
            &root,
            &project,
        )
        .await?
        else {
            println!("Cancelled.");
            return Ok(());
        };

        println!("\nChoose what to include in the scan:");
        println!("  1. Opened files with changes");
        println!("  2. Opened files without changes (hijacked)");
        println!("  3. Modified files not opened yet");
        println!("  Quick: 1,2   Full: 1,2,3");
        let answer = self.prompter.prompt_text("\nYour choice: ").await?;
        let Some(categories) = picker::parse_categories(&answer) else {
            println!("No valid selections made.");
            return Ok(());
        };

        let folders = if categories.not_opened {
            match picker::pick_location(
                self.prompter.as_ref(),
                "SELECT SCAN DIRECTORY",
                &root,
                &project,
            )
            .await?
            {
                Some(location) => location.folders(&root),
                None => {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
        } else {
            Vec::new()
        };

        let options = ScanOptions {
            scope: scope.scope_spec(),
            folders,
            opened_with_changes: categories.opened_with_changes,
            opened_without_changes: categories.opened_without_changes,
            not_opened: categories.not_opened,
        };
        let result = self.scan(&options).await?;
        if result.is_empty() {
            return Ok(());
        }

        let candidates = result.revert_candidates();
        if candidates.is_empty() {
            println!("No files with actual modifications to revert.");
            return Ok(());
        }

        println!("\nFORCE GET REVISION (p4 sync -f)");
        println!("WARNING: This will DISCARD your local changes!");
        let picked = self
            .select(&candidates, "Select files to force sync (restore from P4):")
            .await?;
        if picked.is_empty() {
            return Ok(());
        }
        self.force_sync(&picked).await
    }

    async fn scan_folders(&mut self) -> Result<()> {
        let content = self.settings.content_path(&self.client_root());
        let Some(folders) =
            picker::pick_folders(self.prompter.as_ref(), &content, &mut self.recent).await?
        else {
            println!("Cancelled.");
            return Ok(());
        };

        for folder in &folders {
            println!("  - {folder}");
        }
        let options = ScanOptions {
            folders: folders.clone(),
            not_opened: true,
            ..Default::default()
        };
        let result = self.scan(&options).await?;
        let files = result.not_opened_but_modified;

        println!("\n{RULE}\nActions:");
        println!("  1. Filter by action (add/edit/delete)");
        println!("  2. Checkout selected files");
        println!("  3. Reconcile all in these folders");
        println!("  4. Revert files (force sync)");
        println!("  5. Back to main menu");

        let choice = self.prompter.prompt_text("\nEnter choice (1-5): ").await?;
        match choice.as_str() {
            "1" => self.filter_and_act(&files).await,
            "2" => self.checkout(&files).await,
            "3" => {
                let report = self.executor().reconcile(&folders).await;
                println!("{}", format_action_report(&report));
                Ok(())
            }
            "4" => self.revert_selected(&files).await,
            _ => Ok(()),
        }
    }

    async fn filter_and_act(&self, files: &[ModifiedFile]) -> Result<()> {
        println!("\nFilter by action type:");
        println!("  1. Show only Edits");
        println!("  2. Show only Adds");
        println!("  3. Show only Deletes");
        println!("  4. Show All");
        let choice = self.prompter.prompt_text("\nEnter choice (1-4): ").await?;
        let filter = ActionFilter::from_choice(&choice);
        let filtered = filter.apply(files);

        println!("\n{:?}: {} file(s)", filter, filtered.len());
        print!("{}", format_numbered(&filtered));
        println!("\nOptions:\n  1. Checkout these files\n  2. Revert these files\n  3. Back");

        match self.prompter.prompt_text("\nEnter choice: ").await?.as_str() {
            "1" => self.checkout(&filtered).await,
            "2" => self.revert_selected(&filtered).await,
            _ => Ok(()),
        }
    }

    async fn checkout(&self, files: &[ModifiedFile]) -> Result<()> {
        if files.is_empty() {
            println!("No files to checkout.");
            return Ok(());
        }
        let picked = self
            .select(files, "Select files to checkout:")
            .await?;
        if picked.is_empty() {
            return Ok(());
        }

        println!("\nChecking out {} file(s)...", picked.len());
        let paths: Vec<String> = picked.into_iter().map(|f| f.path).collect();
        let report = self.executor().checkout(&paths).await;
        println!("{}", format_action_report(&report));
        Ok(())
    }

    async fn revert_selected(&self, files: &[ModifiedFile]) -> Result<()> {
        if files.is_empty() {
            println!("No files to revert.");
            return Ok(());
        }
        println!("\nWARNING: REVERT FILES");
        println!("This will PERMANENTLY DELETE your local changes and restore files from P4!");
        let picked = self.select(files, "Select files to revert:").await?;
        if picked.is_empty() {
            return Ok(());
        }
        self.force_sync(&picked).await
    }

    async fn reconcile_project(&self) -> Result<()> {
        let project = self.settings.project_path(&self.client_root());
        println!("\nReconciling {}...", project.display());
        let report = self
            .executor()
            .reconcile(&[project.to_string_lossy().into_owned()])
            .await;
        println!("{}", format_action_report(&report));
        Ok(())
    }

    async fn preview_reconcile(&self) -> Result<()> {
        let content = self.settings.content_path(&self.client_root());
        println!("\nReconcile preview for {}:\n{RULE}", content.display());
        match self
            .executor()
            .preview_reconcile(&content.to_string_lossy())
            .await?
        {
            Some(text) => println!("{text}\n{RULE}"),
            None => println!("No files would be reconciled."),
        }
        Ok(())
    }

    async fn hijacked_status(&self) -> Result<()> {
        let report = hijacked::hijacked_status(self.p4.as_ref()).await?;
        print!("{}", format_hijacked_report(&report));
        Ok(())
    }

    async fn revert_unchanged(&self) -> Result<()> {
        println!("\nFinding hijacked files (opened but unchanged)...\n{RULE}");
        let files = hijacked::unchanged_files(self.p4.as_ref()).await?;
        if files.is_empty() {
            println!("✓ No hijacked files found. All opened files have changes!");
            return Ok(());
        }

        println!("Found {} hijacked file(s):", files.len());
        print!("{}", format_capped(&files, REVERT_PREVIEW_LIMIT));
        println!("\nThis will revert {} unchanged file(s)", files.len());

        match self
            .executor()
            .revert_unchanged(&files, self.prompter.as_ref())
            .await?
        {
            Some(output) => {
                println!("{output}");
                println!("\n✓ Done! Hijacked files have been reverted.");
            }
            None => println!("Cancelled."),
        }
        Ok(())
    }

    async fn capture_baseline(&self) -> Result<()> {
        let files = hijacked::opened_files(self.p4.as_ref()).await?;
        let baseline = self.baseline.capture(files)?;
        println!("✓ Captured {} opened file(s)", baseline.files.len());
        println!("  Saved to: {}", self.baseline.path().display());
        print!("{}", format_baseline(&baseline));
        Ok(())
    }

    fn show_baseline(&self) {
        match self.baseline.load() {
            Some(baseline) => print!("{}", format_baseline(&baseline)),
            None => println!("No baseline found. Capture one first."),
        }
    }

    fn clear_baseline(&self) -> Result<()> {
        self.baseline.clear()?;
        println!("✓ Baseline cleared");
        Ok(())
    }
}
