//! List command - List sessions in a scope (non-interactive).

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use trawl_format::SessionQuickMetadata;
use trawl_scan::{discover_sessions, DiscoverQuery};

use super::clip;

const PROJECT_WIDTH: usize = 20;
const PREVIEW_WIDTH: usize = 40;

#[derive(Serialize)]
struct ListOutput<'a> {
    sessions: &'a [SessionQuickMetadata],
    count: usize,
}

pub fn run(projects_dir: &Path, query: &DiscoverQuery, json: bool) -> Result<()> {
    let sessions = discover_sessions(projects_dir, query);

    if json {
        let output = ListOutput {
            sessions: &sessions,
            count: sessions.len(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", format_table(&sessions));
        println!("\nFound {} session(s)", sessions.len());
    }

    Ok(())
}

fn format_table(sessions: &[SessionQuickMetadata]) -> String {
    if sessions.is_empty() {
        return "No sessions found.".to_string();
    }

    let mut lines = vec![
        "| # | Date | Project | Preview | Duration |".to_string(),
        "|---|------|---------|---------|----------|".to_string(),
    ];
    for (i, s) in sessions.iter().enumerate() {
        lines.push(format!(
            "| {} | {} | {} | {} | {} |",
            i + 1,
            s.date_formatted,
            clip(&s.project_short, PROJECT_WIDTH),
            clip(&s.preview, PREVIEW_WIDTH),
            s.duration_formatted,
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session(project: &str, preview: &str) -> SessionQuickMetadata {
        SessionQuickMetadata {
            path: "/tmp/s.jsonl".to_string(),
            date: "2024-01-05T15:07:00+00:00".to_string(),
            date_formatted: "Jan 05, 2024, 3:07 PM".to_string(),
            duration_seconds: 420.0,
            duration_formatted: "7m".to_string(),
            preview: preview.to_string(),
            message_count: 4,
            project_cwd: format!("/work/{project}"),
            project_short: project.to_string(),
            started_at: chrono::DateTime::parse_from_rfc3339("2024-01-05T15:07:00Z").unwrap(),
        }
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(format_table(&[]), "No sessions found.");
    }

    #[test]
    fn test_table_rows_are_truncated() {
        let table = format_table(&[
            session("proj", "Fix the login bug"),
            session(
                "a-very-long-project-name",
                "Please refactor the whole authentication module today",
            ),
        ]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(
            lines,
            vec![
                "| # | Date | Project | Preview | Duration |",
                "|---|------|---------|---------|----------|",
                "| 1 | Jan 05, 2024, 3:07 PM | proj | Fix the login bug | 7m |",
                "| 2 | Jan 05, 2024, 3:07 PM | a-very-long-proje... | Please refactor the whole authenticat... | 7m |",
            ]
        );
    }
}
