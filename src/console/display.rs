//! Text rendering for the console. Everything returns a `String` so the menu
//! decides where it goes.

use std::fmt::{self, Write as _};

use crate::actions::{reconcile_summary, ActionKind, ActionReport, Outcome};
use crate::classify::{Changelist, ClientInfo, HijackedReport, ModifiedFile, ScanResult};
use crate::storage::{Baseline, RecentFolder};

pub const RULE: &str = "─────────────────────────────────────";

/// Rows shown for plain path lists outside the scan listing
pub const LIST_LIMIT: usize = 10;

/// Run a writer against a fresh buffer. Writing into a `String` only fails
/// if a `Display` impl does, which yields an empty rendering.
fn render<F>(write: F) -> String
where
    F: FnOnce(&mut String) -> fmt::Result,
{
    let mut out = String::new();
    write(&mut out).map(|()| out).unwrap_or_default()
}

fn write_heading(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out, "\n{title}")?;
    writeln!(out, "{RULE}")
}

fn write_capped<S: AsRef<str>>(out: &mut String, items: &[S], limit: usize) -> fmt::Result {
    for item in items.iter().take(limit) {
        writeln!(out, "  • {}", item.as_ref())?;
    }
    if items.len() > limit {
        writeln!(out, "  ... and {} more", items.len() - limit)?;
    }
    Ok(())
}

/// Bulleted list capped at `limit` rows, then `... and N more`
pub fn format_capped<S: AsRef<str>>(items: &[S], limit: usize) -> String {
    render(|out| write_capped(out, items, limit))
}

fn write_client_info(out: &mut String, info: &ClientInfo) -> fmt::Result {
    writeln!(out, "✓ Status: CONNECTED")?;
    write_heading(out, "Connection Details:")?;
    writeln!(out, "  User:            {}", info.user_name)?;
    writeln!(out, "  Workspace:       {}", info.client_name)?;
    writeln!(out, "  Host:            {}", info.client_host)?;
    writeln!(out, "  Root:            {}", info.client_root)?;
    writeln!(out, "  Server:          {}", info.server_address)?;
    if let Some(uptime) = &info.server_uptime {
        writeln!(out, "  Server Uptime:   {uptime}")?;
    }
    writeln!(out, "  Current Dir:     {}", info.current_dir.display())?;
    write!(out, "{RULE}")
}

pub fn format_client_info(info: &ClientInfo) -> String {
    render(|out| write_client_info(out, info))
}

fn write_bucket(out: &mut String, title: &str, files: &[ModifiedFile], limit: usize) -> fmt::Result {
    if files.is_empty() {
        return Ok(());
    }
    writeln!(out, "\n{title} ({}):", files.len())?;
    for file in files.iter().take(limit) {
        writeln!(
            out,
            "  [{}] [{}] {}",
            file.status_label(),
            file.action.label(),
            file.path
        )?;
    }
    if files.len() > limit {
        writeln!(out, "  ... and {} more", files.len() - limit)?;
    }
    Ok(())
}

fn write_scan_result(out: &mut String, result: &ScanResult, limit: usize) -> fmt::Result {
    write_heading(out, "Scan Results")?;
    writeln!(out, "  Total files:                {}", result.total)?;
    writeln!(
        out,
        "  Opened with changes:        {}",
        result.opened_with_changes.len()
    )?;
    writeln!(
        out,
        "  Opened without changes:     {}",
        result.opened_without_changes.len()
    )?;
    writeln!(
        out,
        "  Modified but not opened:    {}",
        result.not_opened_but_modified.len()
    )?;
    writeln!(
        out,
        "  Scan time:                  {:.1}s",
        result.duration.as_secs_f64()
    )?;
    writeln!(out, "{RULE}")?;

    if result.is_empty() {
        return writeln!(out, "\n✓ All clean! No modified files found.");
    }

    write_bucket(
        out,
        "✓ Opened with changes",
        &result.opened_with_changes,
        limit,
    )?;
    write_bucket(
        out,
        "⚠ Opened without changes (hijacked)",
        &result.opened_without_changes,
        limit,
    )?;
    write_bucket(
        out,
        "⚠ Modified but not opened",
        &result.not_opened_but_modified,
        limit,
    )
}

pub fn format_scan_result(result: &ScanResult, limit: usize) -> String {
    render(|out| write_scan_result(out, result, limit))
}

/// Numbered listing used for selection prompts
pub fn format_numbered(files: &[ModifiedFile]) -> String {
    render(|out| {
        for (i, file) in files.iter().enumerate() {
            writeln!(out, "  {}. [{}] {}", i + 1, file.action.label(), file.path)?;
        }
        Ok(())
    })
}

fn write_action_report(out: &mut String, report: &ActionReport) -> fmt::Result {
    for target in &report.outcomes {
        writeln!(out, "  {}", target.target)?;
        match &target.outcome {
            Outcome::Succeeded { output } => {
                if !output.is_empty() {
                    writeln!(out, "    ✓ {output}")?;
                }
                if report.kind == ActionKind::Reconcile {
                    if let Some(summary) = reconcile_summary(output) {
                        writeln!(out, "    {summary}")?;
                    }
                }
            }
            Outcome::Failed { error, output } => {
                writeln!(out, "    Error: {error}")?;
                if !output.is_empty() {
                    writeln!(out, "    {output}")?;
                }
            }
        }
    }
    write!(
        out,
        "{}: {} succeeded, {} failed",
        report.kind,
        report.succeeded(),
        report.failed()
    )
}

pub fn format_action_report(report: &ActionReport) -> String {
    render(|out| write_action_report(out, report))
}

fn write_hijacked_report(out: &mut String, report: &HijackedReport) -> fmt::Result {
    write_heading(out, "Hijacked Files Analysis")?;
    writeln!(out, "Total opened files:     {}", report.total())?;
    writeln!(
        out,
        "  Real changes:         {} ({:.0}%)",
        report.real_changes.len(),
        report.real_percent()
    )?;
    writeln!(
        out,
        "  Hijacked (unchanged): {} ({:.0}%)",
        report.hijacked.len(),
        report.hijacked_percent()
    )?;
    writeln!(out, "{RULE}")?;

    if !report.real_changes.is_empty() {
        writeln!(out, "\n✓ Real Changes:")?;
        write_capped(out, &report.real_changes, LIST_LIMIT)?;
    }
    if !report.hijacked.is_empty() {
        writeln!(out, "\n⚠ Hijacked Files (unchanged):")?;
        write_capped(out, &report.hijacked, LIST_LIMIT)?;
    }
    Ok(())
}

pub fn format_hijacked_report(report: &HijackedReport) -> String {
    render(|out| write_hijacked_report(out, report))
}

fn write_changelists(out: &mut String, groups: &[Changelist]) -> fmt::Result {
    write_heading(out, "Pending Changes")?;
    if groups.is_empty() {
        return writeln!(out, "  ✓ No opened files");
    }
    for group in groups {
        if group.is_default() {
            writeln!(out, "\nDefault changelist ({} file(s)):", group.files.len())?;
        } else {
            writeln!(
                out,
                "\nChangelist {} ({} file(s)):",
                group.name,
                group.files.len()
            )?;
        }
        for file in &group.files {
            writeln!(out, "  • {file}")?;
        }
    }
    Ok(())
}

pub fn format_changelists(groups: &[Changelist]) -> String {
    render(|out| write_changelists(out, groups))
}

pub fn format_baseline(baseline: &Baseline) -> String {
    render(|out| {
        writeln!(
            out,
            "Baseline from {} ({} file(s))",
            baseline.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            baseline.files.len()
        )?;
        write_capped(out, &baseline.files, LIST_LIMIT)
    })
}

/// The first `limit` recent folders, numbered
pub fn format_recent_folders(folders: &[RecentFolder], limit: usize) -> String {
    render(|out| {
        for (i, folder) in folders.iter().take(limit).enumerate() {
            writeln!(
                out,
                "  {}. {} (used {} times)",
                i + 1,
                folder.path,
                folder.use_count
            )?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::TargetOutcome;
    use crate::classify::FileAction;
    use std::time::Duration;

    #[test]
    fn test_empty_scan_is_all_clean() {
        let text = format_scan_result(&ScanResult::default(), 15);
        assert!(text.contains("All clean!"));
        assert!(text.contains("Total files:                0"));
    }

    #[test]
    fn test_bucket_listing_is_capped() {
        let files: Vec<_> = (1..=4)
            .map(|i| ModifiedFile::opened(format!("/ws/f{i}.txt"), true))
            .collect();
        let result = ScanResult::new(files, vec![], vec![], Duration::from_secs(2));

        let text = format_scan_result(&result, 3);
        assert!(text.contains("[OPENED] [EDIT] /ws/f3.txt"));
        assert!(!text.contains("/ws/f4.txt"));
        assert!(text.contains("... and 1 more"));
        assert!(!text.contains("All clean!"));
    }

    #[test]
    fn test_numbered_listing() {
        let files = vec![
            ModifiedFile::unopened("/ws/a.txt", FileAction::Add),
            ModifiedFile::unopened("/ws/b.txt", FileAction::Delete),
        ];
        assert_eq!(
            format_numbered(&files),
            "  1. [ADD] /ws/a.txt\n  2. [DELETE] /ws/b.txt\n"
        );
    }

    #[test]
    fn test_action_report_lists_failures_inline() {
        let report = ActionReport {
            kind: ActionKind::Checkout,
            outcomes: vec![
                TargetOutcome {
                    target: "/ws/a.txt".to_string(),
                    outcome: Outcome::Succeeded {
                        output: "//depot/a.txt#1 - opened for edit".to_string(),
                    },
                },
                TargetOutcome {
                    target: "/ws/b.txt".to_string(),
                    outcome: Outcome::Failed {
                        error: "exit code 1".to_string(),
                        output: "locked".to_string(),
                    },
                },
            ],
        };
        let text = format_action_report(&report);
        assert!(text.contains("Error: exit code 1"));
        assert!(text.ends_with("Checkout: 1 succeeded, 1 failed"));
    }

    #[test]
    fn test_hijacked_report_with_no_files() {
        let text = format_hijacked_report(&HijackedReport::default());
        assert!(text.contains("Real changes:         0 (0%)"));
    }

    #[test]
    fn test_changelists_rendering() {
        let groups = vec![
            Changelist {
                name: "default".to_string(),
                files: vec!["//depot/a.txt".to_string()],
            },
            Changelist {
                name: "42".to_string(),
                files: vec!["//depot/b.txt".to_string()],
            },
        ];
        let text = format_changelists(&groups);
        let default_pos = text.find("Default changelist").unwrap();
        let numbered_pos = text.find("Changelist 42").unwrap();
        assert!(default_pos < numbered_pos);
    }

    #[test]
    fn test_format_capped() {
        let items: Vec<String> = (0..12).map(|i| i.to_string()).collect();
        let text = format_capped(&items, 10);
        assert_eq!(text.lines().count(), 11);
        assert!(text.ends_with("  ... and 2 more\n"));
    }

    #[test]
    fn test_client_info_with_uptime() {
        let info = ClientInfo {
            user_name: "alice".to_string(),
            client_name: "alice-ws".to_string(),
            server_uptime: Some("12:00:01".to_string()),
            ..Default::default()
        };
        let text = format_client_info(&info);
        assert!(text.starts_with("✓ Status: CONNECTED\n"));
        assert!(text.contains("  Workspace:       alice-ws\n"));
        assert!(text.contains("  Server Uptime:   12:00:01\n"));
        assert!(text.ends_with(RULE));
    }

    #[test]
    fn test_recent_folders_are_numbered_and_limited() {
        let folders: Vec<RecentFolder> = ["/ws/A", "/ws/B", "/ws/C"]
            .iter()
            .map(|p| RecentFolder {
                path: p.to_string(),
                last_used: chrono::Utc::now(),
                use_count: 2,
            })
            .collect();
        assert_eq!(
            format_recent_folders(&folders, 2),
            "  1. /ws/A (used 2 times)\n  2. /ws/B (used 2 times)\n"
        );
    }
}
