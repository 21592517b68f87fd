//! Search command - Search session content for a literal string (non-interactive).

use anyhow::Result;
use serde::Serialize;
use std::path::Path;
use trawl_format::SearchResult;
use trawl_scan::text::truncate_text;
use trawl_scan::{search_sessions, SearchQuery};

const CONTEXT_CHARS: usize = 100;

#[derive(Serialize)]
struct SearchOutput<'a> {
    query: &'a str,
    results: &'a [SearchResult],
    count: usize,
}

pub fn run(projects_dir: &Path, query: &SearchQuery, json: bool) -> Result<()> {
    let results = search_sessions(projects_dir, query)?;

    if json {
        let output = SearchOutput {
            query: &query.text,
            results: &results,
            count: results.len(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", format_results(&results, &query.text));
    }

    Ok(())
}

fn format_results(results: &[SearchResult], query: &str) -> String {
    if results.is_empty() {
        return format!("No sessions found matching '{query}'");
    }

    let mut lines = vec![format!(
        "Found {} session(s) matching '{query}':\n",
        results.len()
    )];
    for (i, result) in results.iter().enumerate() {
        let session = &result.session;
        lines.push(format!(
            "{}. {} - {}",
            i + 1,
            session.date_formatted,
            session.project_short
        ));
        lines.push(format!("   Preview: {}", session.preview));
        lines.push(format!("   Matches: {}", result.match_count));
        if let Some(first) = result.matches.first() {
            lines.push(format!(
                "   Context: \"{}\"",
                truncate_text(&first.context, CONTEXT_CHARS)
            ));
        }
        lines.push(String::new());
    }
    lines.join("\n")
}
