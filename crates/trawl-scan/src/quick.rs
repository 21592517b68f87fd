//! Quick metadata: one streaming pass, no transcript.

use crate::text::{project_short, truncate_text};
use crate::time::{format_duration, format_timestamp, parse_timestamp, seconds_between};
use chrono::{DateTime, Datelike, FixedOffset};
use std::path::Path;
use trawl_format::{LogRecord, RecordReader, SessionQuickMetadata};

/// Longest preview kept, in characters.
pub const PREVIEW_CHARS: usize = 80;

/// Preview used when no substantive user message exists.
pub const NO_PREVIEW: &str = "(no preview)";

/// Sessions whose first timestamp is older than this are treated as corrupt.
pub const MIN_PLAUSIBLE_YEAR: i32 = 2020;

/// Accumulator for a single forward pass over a session log.
#[derive(Debug, Default)]
pub struct QuickScan {
    first_ts: Option<DateTime<FixedOffset>>,
    last_ts: Option<DateTime<FixedOffset>>,
    preview: Option<String>,
    cwd: Option<String>,
    message_count: usize,
}

impl QuickScan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, record: &LogRecord) {
        if let Some(ts) = record.timestamp().and_then(parse_timestamp) {
            self.first_ts.get_or_insert(ts);
            self.last_ts = Some(ts);
        }

        if record.is_user() {
            if self.cwd.is_none() {
                self.cwd = record.cwd().map(str::to_string);
            }
            if self.preview.is_none() {
                self.preview = substantive_text(record).map(str::to_string);
            }
        }

        if record.role().is_some() {
            self.message_count += 1;
        }
    }

    /// Build the metadata, or `None` when the log has no plausible timestamp.
    pub fn finish(self, path: &Path) -> Option<SessionQuickMetadata> {
        let first = self.first_ts?;
        if first.year() < MIN_PLAUSIBLE_YEAR {
            tracing::debug!(path = %path.display(), year = first.year(), "implausible session timestamp");
            return None;
        }
        let last = self.last_ts.unwrap_or(first);
        let duration_seconds = seconds_between(&first, &last);
        let project_cwd = self.cwd.unwrap_or_default();

        Some(SessionQuickMetadata {
            path: path.to_string_lossy().into_owned(),
            date: first.to_rfc3339(),
            date_formatted: format_timestamp(&first),
            duration_seconds,
            duration_formatted: format_duration(duration_seconds),
            preview: truncate_text(self.preview.as_deref().unwrap_or(NO_PREVIEW), PREVIEW_CHARS),
            message_count: self.message_count,
            project_short: project_short(&project_cwd),
            project_cwd,
            started_at: first,
        })
    }
}

/// The trimmed first text of a user record, unless it is empty or looks like
/// a system tag (`<...`) or slash command (`/...`).
fn substantive_text(record: &LogRecord) -> Option<&str> {
    let text = record.content()?.first_text()?.trim();
    if text.is_empty() || text.starts_with('<') || text.starts_with('/') {
        return None;
    }
    Some(text)
}

/// Scan a session log for listing metadata.
///
/// Returns `None` when the file cannot be opened, holds no timestamp, or
/// starts before [`MIN_PLAUSIBLE_YEAR`].
pub fn quick_metadata(path: &Path) -> Option<SessionQuickMetadata> {
    let reader = match RecordReader::open(path) {
        Ok(reader) => reader,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "cannot open session");
            return None;
        }
    };

    let mut scan = QuickScan::new();
    for record in reader {
        scan.observe(&record);
    }
    scan.finish(path)
}
