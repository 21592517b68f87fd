//! Parse command - Show one session's turns and statistics.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use trawl_format::{ParsedSession, SessionMetadata, SessionStats, Turn};
use trawl_scan::load_session;
use trawl_scan::text::truncate_text;

use super::thousands;

const TURN_TEXT_CHARS: usize = 200;

#[derive(Serialize)]
struct StatsOutput<'a> {
    metadata: &'a SessionMetadata,
    stats: &'a SessionStats,
}

pub fn run(path: &Path, json: bool, stats_only: bool) -> Result<()> {
    let session = load_session(path)
        .with_context(|| format!("Could not parse session at {}", path.display()))?;

    match (json, stats_only) {
        (true, true) => {
            let output = StatsOutput {
                metadata: &session.metadata,
                stats: &session.stats,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        (true, false) => println!("{}", serde_json::to_string_pretty(&session)?),
        (false, true) => println!("{}", format_stats(&session.stats, &session.metadata)),
        (false, false) => println!("{}", format_session(&session)),
    }

    Ok(())
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "Unknown"
    } else {
        value
    }
}

fn format_stats(stats: &SessionStats, metadata: &SessionMetadata) -> String {
    let mut lines = vec![
        format!("Session: {}", or_unknown(&metadata.date_formatted)),
        format!("Project: {}", or_unknown(&metadata.cwd)),
        format!("Duration: {}", or_unknown(&metadata.duration_formatted)),
        format!("Version: {}", or_unknown(&metadata.version)),
        String::new(),
        format!("Conversation turns: {}", stats.turn_count),
        format!("Total tool calls: {}", stats.total_tool_calls),
        String::new(),
    ];

    if !stats.tool_counts.is_empty() {
        lines.push("Tool usage:".to_string());
        for (tool, count) in stats.tools_by_usage() {
            lines.push(format!("  {tool}: {count}"));
        }
        lines.push(String::new());
    }

    lines.push(format!("Files read: {}", stats.unique_files_read));
    lines.push(format!("Files edited: {}", stats.unique_files_edited));
    lines.push(format!("Files created: {}", stats.unique_files_created));
    lines.push(format!("Commands run: {}", stats.commands_count));
    lines.push(String::new());

    lines.push("Token usage:".to_string());
    lines.push(format!("  Input: {}", thousands(stats.tokens.input)));
    lines.push(format!("  Output: {}", thousands(stats.tokens.output)));
    lines.push(format!("  Cache read: {}", thousands(stats.tokens.cache_read)));

    lines.join("\n")
}

fn format_turn(index: usize, turn: &Turn) -> String {
    [
        format!("Turn {index}:"),
        format!("User: {}", truncate_text(&turn.user_message, TURN_TEXT_CHARS)),
        format!(
            "Assistant: {}",
            truncate_text(&turn.assistant_response, TURN_TEXT_CHARS)
        ),
        format!("Tool calls: {}", turn.tool_calls.len()),
        String::new(),
    ]
    .join("\n")
}

fn format_session(session: &ParsedSession) -> String {
    let mut out = format_stats(&session.stats, &session.metadata);
    out.push_str(&format!("\n\n{}\n\n", "=".repeat(60)));
    for (i, turn) in session.turns.iter().enumerate() {
        out.push_str(&format_turn(i + 1, turn));
        out.push('\n');
    }
    // println! adds the final newline
    if out.ends_with('\n') {
        out.pop();
    }
    out
}
