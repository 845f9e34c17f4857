//! Renderers for batch summaries, single-torrent changes and status views.

use chrono::{DateTime, Local};
use tlever_reconcile::{BatchReport, StatusSnapshot};

use crate::client::{CliError, CliResult};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Summary line plus one line per failed torrent.
pub(crate) fn batch_lines<T>(
    operation: &str,
    report: &BatchReport<T>,
    kind: impl Fn(&T) -> &'static str,
) -> Vec<String> {
    let mut counts: Vec<(&'static str, usize)> = Vec::new();
    for (_, outcome) in &report.outcomes {
        let label = kind(outcome);
        match counts.iter_mut().find(|(seen, _)| *seen == label) {
            Some((_, count)) => *count += 1,
            None => counts.push((label, 1)),
        }
    }

    let total = report.outcomes.len() + report.failures.len();
    let mut summary = format!("{operation}: {total} torrents");
    for (label, count) in &counts {
        summary.push_str(&format!(", {count} {label}"));
    }
    summary.push_str(&format!(", {} failed", report.failures.len()));

    let mut lines = vec![summary];
    for failure in &report.failures {
        lines.push(format!(
            "  failed {} ({}): {}",
            failure.hash,
            failure.name,
            failure.error.detail()
        ));
    }
    lines
}

/// Print a batch summary and turn per-torrent failures into exit code 3.
pub(crate) fn render_batch<T>(
    operation: &str,
    report: &BatchReport<T>,
    kind: impl Fn(&T) -> &'static str,
) -> CliResult<()> {
    for line in batch_lines(operation, report, kind) {
        println!("{line}");
    }
    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::failure(anyhow::anyhow!(
            "{operation} finished with {} failed torrent(s)",
            report.failures.len()
        )))
    }
}

/// Aligned key/value block for a status snapshot.
pub(crate) fn status_lines(status: &StatusSnapshot, refreshed: DateTime<Local>) -> Vec<String> {
    let rows = status.rows();
    let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut lines: Vec<String> = rows
        .into_iter()
        .map(|(key, value)| format!("{key:<width$}  {value}"))
        .collect();
    lines.push(String::new());
    lines.push(format!(
        "updated {} - press q then enter to quit",
        refreshed.format("%H:%M:%S")
    ));
    lines
}

/// Clear the terminal and draw `lines`.
pub(crate) fn redraw(lines: &[String]) {
    print!("{CLEAR_SCREEN}");
    for line in lines {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlever_reconcile::{LabelCodec, TorrentFailure, project_status};
    use tlever_test_support::fixtures;

    #[test]
    fn summary_counts_outcomes_and_lists_failures() {
        let report = BatchReport {
            outcomes: vec![
                ("a".to_string(), true),
                ("b".to_string(), false),
                ("c".to_string(), true),
            ],
            failures: vec![TorrentFailure {
                hash: "d".into(),
                name: "debian".into(),
                error: tlever_reconcile::ReconcileError::InvalidLabel {
                    label: String::new(),
                    reason: "labels must not be blank",
                },
            }],
        };

        let lines = batch_lines("tag sweep", &report, |moved| {
            if *moved { "moved" } else { "in place" }
        });

        assert_eq!(lines[0], "tag sweep: 4 torrents, 2 moved, 1 in place, 1 failed");
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("  failed d (debian): invalid label"));
        assert_eq!(render_batch("x", &report, |_| "ok").map_err(|e| e.exit_code()), Err(3));
    }

    #[test]
    fn status_rows_are_aligned() {
        let torrent = fixtures::labelled("h", 0.5, &["%tier-0"]);
        let status = project_status(&torrent, &fixtures::session(), &LabelCodec::new('%', '@', '#'));
        let lines = status_lines(&status, Local::now());
        assert!(lines[0].starts_with("Name      "));
        assert!(lines.iter().any(|line| line == "Tier      0"));
    }
}
