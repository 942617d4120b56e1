//! Classify, select, and act against a scripted `p4`

use std::sync::Arc;

use p4triage::actions::{ActionExecutor, ActionKind};
use p4triage::classify::{FileAction, ScanOptions, Scanner};
use p4triage::console::ScriptedPrompter;
use p4triage::selection::{parse_selection, ActionFilter, Selection};
use p4triage::subprocess::{MockProcessRunner, P4Runner, P4RunnerImpl};

fn p4_with(mock: &MockProcessRunner) -> Arc<dyn P4Runner> {
    Arc::new(P4RunnerImpl::new(Arc::new(mock.clone())))
}

fn workspace_mock() -> MockProcessRunner {
    let mut mock = MockProcessRunner::new();
    mock.expect_command("p4")
        .with_args(|args| args == ["diff", "-se"])
        .returns_stdout("/ws/Content/Hero.uasset\n")
        .finish();
    mock.expect_command("p4")
        .with_args(|args| args == ["diff", "-sr"])
        .returns_stdout("/ws/Content/Untouched.uasset\n")
        .finish();
    mock.expect_command("p4")
        .with_args_prefix(&["reconcile", "-n"])
        .returns_stdout(
            "//depot/Content/New.uasset - reconcile to add\n\
             //depot/Content/Old.uasset#3 - reconcile to delete\n",
        )
        .finish();
    mock.expect_command("p4")
        .with_args(|args| args == ["where", "//depot/Content/New.uasset"])
        .returns_stdout("//depot/Content/New.uasset //ws/Content/New.uasset /ws/Content/New.uasset\n")
        .finish();
    mock.expect_command("p4")
        .with_args(|args| args == ["where", "//depot/Content/Old.uasset"])
        .returns_exit_code(1)
        .returns_stderr("//depot/Content/Old.uasset - file(s) not in client view.\n")
        .finish();
    mock
}

#[tokio::test]
async fn test_scan_select_force_sync() {
    let mut mock = workspace_mock();
    mock.expect_command("p4")
        .with_args_prefix(&["sync", "-f"])
        .returns_stdout("//depot/Content/Hero.uasset#7 - refreshing\n")
        .finish();
    let p4 = p4_with(&mock);

    let result = Scanner::new(Arc::clone(&p4))
        .scan(&ScanOptions::full(vec!["/nonexistent/ws/Content".to_string()]))
        .await
        .unwrap();
    assert_eq!(result.total, 4);

    let candidates = result.revert_candidates();
    let paths: Vec<&str> = candidates.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "/ws/Content/Hero.uasset",
            "/ws/Content/New.uasset",
            "//depot/Content/Old.uasset",
        ]
    );

    let picked: Vec<String> = parse_selection("1,3", candidates.len())
        .pick(&candidates)
        .into_iter()
        .map(|f| f.path.clone())
        .collect();

    let prompter = ScriptedPrompter::new(["YES"]);
    let report = ActionExecutor::new(Arc::clone(&p4))
        .force_sync(&picked, &prompter)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(report.kind, ActionKind::ForceSync);
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.outcomes[1].target, "//depot/Content/Old.uasset");

    let synced: Vec<String> = mock
        .get_call_history()
        .into_iter()
        .filter(|cmd| cmd.args.first().map(String::as_str) == Some("sync"))
        .map(|cmd| cmd.args[2].clone())
        .collect();
    assert_eq!(synced, picked);
    assert!(prompter.prompts()[0].contains("2 file(s)"));
}

#[tokio::test]
async fn test_cancelled_selection_makes_no_calls() {
    let mock = workspace_mock();
    let p4 = p4_with(&mock);

    let result = Scanner::new(Arc::clone(&p4))
        .scan(&ScanOptions::full(vec!["/nonexistent/ws/Content".to_string()]))
        .await
        .unwrap();
    let calls_after_scan = mock.get_call_history().len();

    let candidates = result.revert_candidates();
    assert_eq!(parse_selection("cancel", candidates.len()), Selection::Cancelled);
    assert_eq!(parse_selection("", candidates.len()), Selection::Cancelled);

    let nothing = parse_selection("0,9", candidates.len());
    assert!(nothing.pick(&candidates).is_empty());
    assert_eq!(mock.get_call_history().len(), calls_after_scan);
}

#[tokio::test]
async fn test_filter_adds_then_checkout() {
    let mut mock = workspace_mock();
    mock.expect_command("p4")
        .with_args(|args| args == ["edit", "/ws/Content/New.uasset"])
        .returns_stdout("//depot/Content/New.uasset#1 - opened for edit\n")
        .finish();
    let p4 = p4_with(&mock);

    let options = ScanOptions {
        folders: vec!["/nonexistent/ws/Content".to_string()],
        not_opened: true,
        ..Default::default()
    };
    let result = Scanner::new(Arc::clone(&p4)).scan(&options).await.unwrap();
    assert_eq!(mock.count_subcommand("diff"), 0);

    let adds = ActionFilter::Adds.apply(&result.not_opened_but_modified);
    assert_eq!(adds.len(), 1);
    assert_eq!(adds[0].action, FileAction::Add);

    let report = ActionExecutor::new(Arc::clone(&p4))
        .checkout(&[adds[0].path.clone()])
        .await;
    assert_eq!(report.succeeded(), 1);
}
