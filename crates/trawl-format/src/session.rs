//! Derived session views.
//!
//! These are built fresh for every query and handed to the caller for
//! rendering; nothing here is persisted.

use chrono::{DateTime, FixedOffset};
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Lightweight listing metadata produced by a single pass over a log.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SessionQuickMetadata {
    /// Path to the session log
    pub path: String,
    /// First observed timestamp, RFC 3339
    pub date: String,
    /// First observed timestamp for display (e.g. `Jan 01, 2024, 9:05 AM`)
    pub date_formatted: String,
    /// Last timestamp minus first timestamp
    pub duration_seconds: f64,
    pub duration_formatted: String,
    /// First substantive user message, truncated to 80 characters
    pub preview: String,
    /// Number of user and assistant records
    pub message_count: usize,
    /// Working directory of the first user record that has one
    pub project_cwd: String,
    /// Last path segment of `project_cwd`
    pub project_short: String,
    /// Parsed form of `date`, used for filtering and ordering
    #[serde(skip)]
    #[schemars(skip)]
    pub started_at: DateTime<FixedOffset>,
}

/// A fully parsed session transcript.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ParsedSession {
    pub metadata: SessionMetadata,
    pub turns: Vec<Turn>,
    pub stats: SessionStats,
}

/// Session-level metadata harvested from the first user records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct SessionMetadata {
    pub session_id: String,
    pub cwd: String,
    /// Version of the assistant tool that wrote the log
    pub version: String,
    pub git_branch: String,
    pub date: Option<String>,
    pub date_formatted: String,
    pub duration_seconds: f64,
    pub duration_formatted: String,
}

/// One user message and the assistant's response to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct Turn {
    pub user_message: String,
    pub assistant_response: String,
    pub tool_calls: Vec<ToolCall>,
    /// Raw timestamp of the user record that opened the turn
    pub timestamp: Option<String>,
    /// Seconds until the next turn started; 0 for the last turn
    pub duration_seconds: f64,
}

/// A tool invocation with its correlated result.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: serde_json::Value,
    /// Result text, empty if no result was ever recorded
    pub result: String,
}

/// Aggregates over the whole session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, JsonSchema)]
pub struct SessionStats {
    pub turn_count: usize,
    pub tool_counts: BTreeMap<String, usize>,
    pub total_tool_calls: usize,
    pub tokens: TokenTotals,
    pub files_read: BTreeSet<String>,
    pub files_edited: BTreeSet<String>,
    pub files_created: BTreeSet<String>,
    /// Every shell command in execution order, duplicates included
    pub commands_run: Vec<String>,
    pub unique_files_read: usize,
    pub unique_files_edited: usize,
    pub unique_files_created: usize,
    pub commands_count: usize,
}

/// Token counters summed across every assistant record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct TokenTotals {
    pub input: u64,
    pub output: u64,
    pub cache_read: u64,
    pub cache_create: u64,
}

impl SessionStats {
    /// Fill in the derived counters once accumulation is done.
    pub fn finalize(&mut self, turn_count: usize) {
        self.turn_count = turn_count;
        self.total_tool_calls = self.tool_counts.values().sum();
        self.unique_files_read = self.files_read.len();
        self.unique_files_edited = self.files_edited.len();
        self.unique_files_created = self.files_created.len();
        self.commands_count = self.commands_run.len();
    }

    /// Tool names by descending usage, ties broken by name.
    pub fn tools_by_usage(&self) -> Vec<(&str, usize)> {
        let mut tools: Vec<(&str, usize)> = self
            .tool_counts
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        tools.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        tools
    }
}

impl TokenTotals {
    pub fn add(&mut self, usage: &crate::Usage) {
        self.input += usage.input();
        self.output += usage.output();
        self.cache_read += usage.cache_read();
        self.cache_create += usage.cache_create();
    }
}

/// One matching record within a session.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SearchMatch {
    /// `user` or `assistant`
    #[serde(rename = "type")]
    pub role: String,
    /// Window around the first match in the record
    pub context: String,
    pub timestamp: Option<String>,
}

/// All matches for one session.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SearchResult {
    pub session: SessionQuickMetadata,
    /// At most [`SearchResult::MAX_RETAINED_MATCHES`] matches
    pub matches: Vec<SearchMatch>,
    /// Total number of matching records, uncapped
    pub match_count: usize,
}

impl SearchResult {
    pub const MAX_RETAINED_MATCHES: usize = 5;

    /// Build a result, keeping only the first few matches but the full count.
    pub fn new(session: SessionQuickMetadata, mut matches: Vec<SearchMatch>) -> Self {
        let match_count = matches.len();
        matches.truncate(Self::MAX_RETAINED_MATCHES);
        Self {
            session,
            matches,
            match_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn metadata() -> SessionQuickMetadata {
        SessionQuickMetadata {
            path: "/tmp/s.jsonl".to_string(),
            date: "2024-01-01T00:00:00+00:00".to_string(),
            date_formatted: "Jan 01, 2024, 12:00 AM".to_string(),
            duration_seconds: 0.0,
            duration_formatted: "0s".to_string(),
            preview: "hello".to_string(),
            message_count: 1,
            project_cwd: String::new(),
            project_short: "unknown".to_string(),
            started_at: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap(),
        }
    }

    #[test]
    fn test_search_result_caps_matches_but_keeps_count() {
        let matches: Vec<SearchMatch> = (0..8)
            .map(|i| SearchMatch {
                role: "user".to_string(),
                context: format!("match {i}"),
                timestamp: None,
            })
            .collect();
        let result = SearchResult::new(metadata(), matches);
        assert_eq!(result.matches.len(), 5);
        assert_eq!(result.match_count, 8);
        assert_eq!(result.matches[4].context, "match 4");
    }

    #[test]
    fn test_quick_metadata_serialization_skips_parsed_date() {
        let value = serde_json::to_value(metadata()).unwrap();
        assert!(value.get("started_at").is_none());
        assert_eq!(value["preview"], "hello");
        assert_eq!(value["project_short"], "unknown");
    }

    #[test]
    fn test_stats_finalize_and_ordering() {
        let mut stats = SessionStats::default();
        stats.tool_counts.insert("Read".to_string(), 3);
        stats.tool_counts.insert("Bash".to_string(), 5);
        stats.tool_counts.insert("Edit".to_string(), 3);
        stats.files_read.insert("/a.rs".to_string());
        stats.commands_run = vec!["ls".to_string(), "ls".to_string()];
        stats.finalize(2);

        assert_eq!(stats.turn_count, 2);
        assert_eq!(stats.total_tool_calls, 11);
        assert_eq!(stats.unique_files_read, 1);
        assert_eq!(stats.commands_count, 2);
        assert_eq!(
            stats.tools_by_usage(),
            vec![("Bash", 5), ("Edit", 3), ("Read", 3)]
        );
    }

    #[test]
    fn test_search_match_serializes_role_as_type() {
        let m = SearchMatch {
            role: "assistant".to_string(),
            context: "...fix it".to_string(),
            timestamp: Some("2024-01-01T00:00:00Z".to_string()),
        };
        let value = serde_json::to_value(m).unwrap();
        assert_eq!(value["type"], "assistant");
    }
}
