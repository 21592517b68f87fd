//! Full session parsing: turns, tool calls with their results, and stats.
//!
//! Tool results come back on a later `user` record than the `assistant`
//! record that issued the call, so results are folded into an id → text
//! table before turns are built. The table lives only for one parse.

use crate::time::{format_duration, format_timestamp, parse_timestamp, seconds_between};
use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use trawl_format::{
    read_records, LogRecord, ParsedSession, RecordBody, SessionMetadata, SessionStats, ToolCall,
    ToolUse, TrawlError, TrawlResult, Turn,
};

/// Parse a session log, or `None` if it is missing or has no records.
pub fn parse_session(path: &Path) -> Option<ParsedSession> {
    match load_session(path) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "session not parsed");
            None
        }
    }
}

/// Parse a session log, reporting why it could not be parsed.
pub fn load_session(path: &Path) -> TrawlResult<ParsedSession> {
    if !path.exists() {
        return Err(TrawlError::SessionNotFound(path.to_path_buf()));
    }
    let records = read_records(path)?;
    parse_records(&records).ok_or_else(|| TrawlError::EmptySession(path.to_path_buf()))
}

/// Build the transcript from decoded records. `None` when there are none.
pub fn parse_records(records: &[LogRecord]) -> Option<ParsedSession> {
    if records.is_empty() {
        return None;
    }

    let results = collect_tool_results(records);
    let mut metadata = harvest_metadata(records);

    let mut builder = TurnBuilder::new(&results);
    for record in records {
        builder.observe(record);
    }
    let (turns, stats, span) = builder.finish();

    let duration_seconds = match span {
        Some((first, last)) => seconds_between(&first, &last),
        None => 0.0,
    };
    let first = span.map(|(first, _)| first);
    metadata.date = first.map(|ts| ts.to_rfc3339());
    metadata.date_formatted = first
        .map(|ts| format_timestamp(&ts))
        .unwrap_or_else(|| "Unknown".to_string());
    metadata.duration_seconds = duration_seconds;
    metadata.duration_formatted = format_duration(duration_seconds);

    Some(ParsedSession {
        metadata,
        turns,
        stats,
    })
}

/// Every tool result on a user record, by `tool_use_id`. Results sharing an
/// id are concatenated in file order.
fn collect_tool_results(records: &[LogRecord]) -> HashMap<&str, String> {
    let mut results: HashMap<&str, String> = HashMap::new();
    for record in records.iter().filter(|r| r.is_user()) {
        let Some(content) = record.content() else {
            continue;
        };
        for (id, text) in content.tool_results() {
            results.entry(id).or_default().push_str(&text);
        }
    }
    results
}

/// First non-empty session id, cwd, version and branch among user records.
fn harvest_metadata(records: &[LogRecord]) -> SessionMetadata {
    let mut metadata = SessionMetadata::default();
    let fill = |slot: &mut String, value: Option<&str>| {
        if slot.is_empty() {
            if let Some(value) = value {
                *slot = value.to_string();
            }
        }
    };

    for record in records.iter().filter(|r| r.is_user()) {
        fill(&mut metadata.session_id, record.session_id());
        fill(&mut metadata.cwd, record.cwd());
        fill(&mut metadata.version, record.version());
        fill(&mut metadata.git_branch, record.git_branch());

        if !metadata.session_id.is_empty()
            && !metadata.cwd.is_empty()
            && !metadata.version.is_empty()
            && !metadata.git_branch.is_empty()
        {
            break;
        }
    }
    metadata
}

struct TurnBuilder<'a> {
    results: &'a HashMap<&'a str, String>,
    turns: Vec<Turn>,
    current: Option<Turn>,
    stats: SessionStats,
    first_ts: Option<DateTime<FixedOffset>>,
    last_ts: Option<DateTime<FixedOffset>>,
}

impl<'a> TurnBuilder<'a> {
    fn new(results: &'a HashMap<&'a str, String>) -> Self {
        Self {
            results,
            turns: Vec::new(),
            current: None,
            stats: SessionStats::default(),
            first_ts: None,
            last_ts: None,
        }
    }

    fn observe(&mut self, record: &LogRecord) {
        if let Some(ts) = record.timestamp().and_then(parse_timestamp) {
            self.first_ts.get_or_insert(ts);
            self.last_ts = Some(ts);
        }

        match &record.body {
            RecordBody::User(_) => self.observe_user(record),
            RecordBody::Assistant(_) => self.observe_assistant(record),
            RecordBody::Other => {}
        }
    }

    fn observe_user(&mut self, record: &LogRecord) {
        let text = record
            .content()
            .map(|c| c.joined_text())
            .unwrap_or_default();

        // Records that only carry tool results continue the open turn
        if text.trim().is_empty() {
            return;
        }

        if let Some(turn) = self.current.take() {
            self.turns.push(turn);
        }
        self.current = Some(Turn {
            user_message: text,
            timestamp: record.timestamp.clone(),
            ..Turn::default()
        });
    }

    fn observe_assistant(&mut self, record: &LogRecord) {
        if let Some(usage) = record.usage() {
            self.stats.tokens.add(usage);
        }

        let Some(turn) = self.current.as_mut() else {
            return;
        };

        // The latest assistant record owns the response, even when it is
        // tool calls only
        turn.assistant_response = record
            .content()
            .map(|c| c.joined_text())
            .unwrap_or_default();

        let Some(content) = record.content() else {
            return;
        };
        for tool in content.tool_uses() {
            track_tool(&mut self.stats, &tool);
            turn.tool_calls.push(ToolCall {
                id: tool.id.to_string(),
                name: tool.name.to_string(),
                input: tool.input.clone(),
                result: self.results.get(tool.id).cloned().unwrap_or_default(),
            });
        }
    }

    #[allow(clippy::type_complexity)]
    fn finish(
        mut self,
    ) -> (
        Vec<Turn>,
        SessionStats,
        Option<(DateTime<FixedOffset>, DateTime<FixedOffset>)>,
    ) {
        if let Some(turn) = self.current.take() {
            self.turns.push(turn);
        }

        let starts: Vec<Option<DateTime<FixedOffset>>> = self
            .turns
            .iter()
            .map(|t| t.timestamp.as_deref().and_then(parse_timestamp))
            .collect();
        for (i, turn) in self.turns.iter_mut().enumerate() {
            if let (Some(Some(this)), Some(Some(next))) = (starts.get(i), starts.get(i + 1)) {
                turn.duration_seconds = seconds_between(this, next);
            }
        }

        self.stats.finalize(self.turns.len());
        let span = self.first_ts.zip(self.last_ts);
        (self.turns, self.stats, span)
    }
}

/// Update per-tool counters and the file/command trackers.
fn track_tool(stats: &mut SessionStats, tool: &ToolUse<'_>) {
    *stats.tool_counts.entry(tool.name.to_string()).or_insert(0) += 1;

    match tool.name {
        "Read" => {
            if let Some(path) = string_input(tool.input, "file_path") {
                stats.files_read.insert(path.to_string());
            }
        }
        "Edit" => {
            if let Some(path) = string_input(tool.input, "file_path") {
                stats.files_edited.insert(path.to_string());
            }
        }
        "Write" => {
            if let Some(path) = string_input(tool.input, "file_path") {
                stats.files_created.insert(path.to_string());
            }
        }
        "Bash" => {
            if let Some(command) = string_input(tool.input, "command") {
                stats.commands_run.push(command.to_string());
            }
        }
        _ => {}
    }
}

fn string_input<'v>(input: &'v Value, key: &str) -> Option<&'v str> {
    input
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}
